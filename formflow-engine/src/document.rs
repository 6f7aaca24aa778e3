use crate::control::{ChoiceOption, Control};
use crate::schema::{FieldConfig, FormConfig, InputKind};
use crate::value::FieldValue;
use serde::Serialize;
use std::fmt::Display;

pub const CONTAINER_SUFFIX: &str = "_container";
pub const DYNAMIC_FIELD_CLASS: &str = "dynamic-field";
pub const TEXTAREA_MIN_LENGTH: u32 = 200;

pub fn container_id(field_key: &str) -> String {
    format!("{}{}", field_key, CONTAINER_SUFFIX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    MissingContainer(String),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::MissingContainer(id) => write!(f, "Container not found: {}", id),
        }
    }
}

impl std::error::Error for DocumentError {}

/// The element wrapping one field: its primary control plus the inline
/// error list rendered under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container {
    pub id: String,
    pub field_key: String,
    pub label: String,
    pub control: Option<Control>,
    pub classes: Vec<String>,
    pub visible: bool,
    pub errors: Vec<String>,
}

impl Container {
    pub fn new(field_key: &str, label: &str, control: Option<Control>) -> Self {
        Self {
            id: container_id(field_key),
            field_key: field_key.to_string(),
            label: label.to_string(),
            control,
            classes: Vec::new(),
            visible: true,
            errors: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|current| current == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }
}

/// Current value of the container's primary control.
pub fn extract_value(container: &Container) -> FieldValue {
    match &container.control {
        Some(control) => control.read(),
        None => {
            log::error!(
                "Container {} does not contain a valid input element",
                container.id
            );
            FieldValue::Null
        }
    }
}

/// Ordered field containers of one rendered form.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Document {
    form_id: String,
    containers: Vec<Container>,
}

impl Document {
    pub fn new(form_id: &str) -> Self {
        Self {
            form_id: form_id.to_string(),
            containers: Vec::new(),
        }
    }

    /// One container per configured field, controls derived from `input`.
    pub fn render(config: &FormConfig) -> Self {
        let mut document = Self::new(&config.form_id);

        for field in config.field_table().values() {
            document.push(Container::new(&field.key, field.label(), control_for(field)));
        }

        document
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn push(&mut self, container: Container) {
        self.containers.push(container);
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.containers.iter().position(|container| container.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn count(&self, id: &str) -> usize {
        self.containers
            .iter()
            .filter(|container| container.id == id)
            .count()
    }

    pub fn get(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|container| container.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.containers
            .iter_mut()
            .find(|container| container.id == id)
    }

    pub fn field(&self, field_key: &str) -> Option<&Container> {
        self.get(&container_id(field_key))
    }

    pub fn field_mut(&mut self, field_key: &str) -> Option<&mut Container> {
        self.get_mut(&container_id(field_key))
    }

    pub fn remove(&mut self, id: &str) -> Option<Container> {
        let position = self.position(id)?;
        Some(self.containers.remove(position))
    }

    pub fn insert_after(&mut self, anchor_id: &str, container: Container) -> Result<(), DocumentError> {
        let position = self
            .position(anchor_id)
            .ok_or_else(|| DocumentError::MissingContainer(anchor_id.to_string()))?;

        self.containers.insert(position + 1, container);
        Ok(())
    }

    pub fn clear_errors(&mut self) {
        for container in self.containers.iter_mut() {
            container.errors.clear();
        }
    }
}

fn choice_options(field: &FieldConfig) -> Vec<ChoiceOption> {
    let defaults: Vec<String> = match &field.default {
        Some(FieldValue::List(items)) => items.iter().map(FieldValue::to_text).collect(),
        Some(FieldValue::Null) | None => Vec::new(),
        Some(other) => vec![other.to_text()],
    };

    field
        .choices
        .iter()
        .map(|choice| {
            let mut option = ChoiceOption::new(&choice.to_text());
            option.selected = defaults.contains(&option.value);
            option
        })
        .collect()
}

fn control_for(field: &FieldConfig) -> Option<Control> {
    let default_text = match &field.default {
        Some(FieldValue::Null) | None => String::new(),
        Some(other) => other.to_text(),
    };

    match field.input {
        InputKind::String if field.length.unwrap_or(0) >= TEXTAREA_MIN_LENGTH => {
            Some(Control::textarea(&default_text))
        }
        InputKind::String
        | InputKind::Integer
        | InputKind::Decimal
        | InputKind::Date
        | InputKind::File => Some(Control::text(&default_text)),
        InputKind::Select => Some(Control::SingleSelect {
            options: choice_options(field),
        }),
        InputKind::SelectMultiple => Some(Control::MultiSelect {
            options: choice_options(field),
        }),
        InputKind::Radio => Some(Control::RadioGroup {
            options: choice_options(field),
        }),
        InputKind::Checkbox => Some(Control::Checkbox {
            checked: matches!(field.default, Some(FieldValue::Bool(true))),
        }),
        // nested formsets carry no primary control
        InputKind::List => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn document() -> Document {
        let config = FormConfig::from_yaml_str(
            r#"
form_id: profile
sections:
  - json_template:
      name: {label: Name, input: string, length: 50}
      bio: {label: Bio, input: string, length: 500}
      status: {label: Status, input: select, choices: [single, married], default: married}
      tags: {label: Tags, input: select_multiple, choices: [a, b]}
      active: {label: Active, input: checkbox, default: true}
      children: {label: Children, input: list}
"#,
        )
        .unwrap();

        Document::render(&config)
    }

    #[test]
    fn test_render_controls_from_input_kind() {
        let document = document();

        assert_eq!(document.form_id(), "profile");
        assert_eq!(document.containers().len(), 6);
        assert_eq!(document.field("name").unwrap().control.as_ref().unwrap().kind(), "text");
        assert_eq!(document.field("bio").unwrap().control.as_ref().unwrap().kind(), "textarea");
        assert_eq!(extract_value(document.field("status").unwrap()), FieldValue::from("married"));
        assert_eq!(extract_value(document.field("tags").unwrap()), FieldValue::List(vec![]));
        assert_eq!(extract_value(document.field("active").unwrap()), FieldValue::Bool(true));
    }

    #[test]
    fn test_container_without_control_reads_null() {
        let document = document();

        assert_eq!(extract_value(document.field("children").unwrap()), FieldValue::Null);
    }

    #[test]
    fn test_insert_after_and_remove() {
        let mut document = document();
        let removed = document.remove("bio_container").unwrap();

        assert!(!document.contains("bio_container"));

        document.insert_after("status_container", removed).unwrap();

        assert_eq!(document.position("bio_container"), Some(2));
        assert_eq!(
            document.insert_after("ghost_container", Container::new("x", "X", None)),
            Err(DocumentError::MissingContainer("ghost_container".to_string()))
        );
    }
}
