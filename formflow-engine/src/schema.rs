use crate::group::ConditionGroupRaw;
use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug)]
pub enum SchemaError {
    Parse(serde_yaml::Error),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::Parse(err) => write!(f, "Schema parse error: {}", err),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Parse(err) => Some(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    #[default]
    String,
    Select,
    SelectMultiple,
    Integer,
    Decimal,
    Date,
    File,
    List,
    Checkbox,
    Radio,
}

impl InputKind {
    pub fn is_select(&self) -> bool {
        matches!(self, InputKind::Select | InputKind::SelectMultiple)
    }
}

/// Links a select to a lookup table: `map_key` is this field's column in
/// table `map_name`, `connected_fields` are repopulated when it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoicesMap {
    #[serde(alias = "mapName")]
    pub map_name: String,
    #[serde(alias = "mapKey")]
    pub map_key: String,
    #[serde(default, alias = "connectedFields")]
    pub connected_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FieldConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub input: InputKind,
    #[serde(default)]
    pub choices: Vec<FieldValue>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<FieldValue>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub helptext: Option<String>,
    #[serde(default, alias = "choicesMap")]
    pub choices_map: Option<ChoicesMap>,
    #[serde(default, alias = "toDisplayConditions")]
    pub to_display_conditions: Option<Vec<ConditionGroupRaw>>,
    #[serde(default, alias = "toValidateConditions")]
    pub to_validate_conditions: Option<Vec<ConditionGroupRaw>>,
}

impl FieldConfig {
    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormSection {
    #[serde(default)]
    pub json_template: IndexMap<String, FieldConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormConfig {
    #[serde(default, alias = "formId")]
    pub form_id: String,
    #[serde(default)]
    pub sections: Vec<FormSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemaIssue {
    MissingLabel(String),
    MissingChoices(String),
    DuplicateKey(String),
    UnknownTarget { field: String, target: String },
    ConnectedWithoutMap { field: String, connected: String },
}

impl Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaIssue::MissingLabel(key) => write!(f, "{} has no \"label\"", key),
            SchemaIssue::MissingChoices(key) => {
                write!(f, "{} has no \"choices\" or \"choices_map\"", key)
            }
            SchemaIssue::DuplicateKey(key) => write!(f, "{} is defined in more than one section", key),
            SchemaIssue::UnknownTarget { field, target } => {
                write!(f, "{} references unknown field {}", field, target)
            }
            SchemaIssue::ConnectedWithoutMap { field, connected } => write!(
                f,
                "{} connects to {} which has no \"choices_map\"",
                field, connected
            ),
        }
    }
}

impl FormConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(source).map_err(SchemaError::Parse)
    }

    /// Every field across sections keyed by field key, in declaration order.
    /// A key repeated in a later section replaces the earlier definition;
    /// `lint` reports the repeat.
    pub fn field_table(&self) -> IndexMap<String, FieldConfig> {
        let mut fields = IndexMap::new();

        for section in &self.sections {
            for (key, config) in &section.json_template {
                let mut config = config.clone();
                config.key = key.clone();
                fields.insert(key.clone(), config);
            }
        }

        fields
    }

    pub fn lint(&self) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        let mut seen: Vec<&String> = Vec::new();

        for section in &self.sections {
            for key in section.json_template.keys() {
                if seen.contains(&key) {
                    issues.push(SchemaIssue::DuplicateKey(key.clone()));
                } else {
                    seen.push(key);
                }
            }
        }

        let fields = self.field_table();

        for (key, config) in &fields {
            if config.label.trim().is_empty() {
                issues.push(SchemaIssue::MissingLabel(key.clone()));
            }

            if config.input.is_select() && config.choices.is_empty() && config.choices_map.is_none()
            {
                issues.push(SchemaIssue::MissingChoices(key.clone()));
            }

            let groups = config
                .to_display_conditions
                .iter()
                .chain(config.to_validate_conditions.iter())
                .flatten();

            for group in groups {
                if !fields.contains_key(&group.field) {
                    issues.push(SchemaIssue::UnknownTarget {
                        field: key.clone(),
                        target: group.field.clone(),
                    });
                }
            }

            if let Some(choices_map) = &config.choices_map {
                for connected in &choices_map.connected_fields {
                    match fields.get(connected) {
                        Some(target) if target.choices_map.is_some() => {}
                        Some(_) => issues.push(SchemaIssue::ConnectedWithoutMap {
                            field: key.clone(),
                            connected: connected.clone(),
                        }),
                        None => issues.push(SchemaIssue::UnknownTarget {
                            field: key.clone(),
                            target: connected.clone(),
                        }),
                    }
                }
            }
        }

        issues
    }

    /// Lookup tables referenced by any field, first use first.
    pub fn map_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        for config in self.field_table().values() {
            if let Some(choices_map) = &config.choices_map {
                if !names.contains(&choices_map.map_name) {
                    names.push(choices_map.map_name.clone());
                }
            }
        }

        names
    }
}
