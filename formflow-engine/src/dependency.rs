use crate::control::{ChoiceOption, Control, ControlError};
use crate::document::{container_id, extract_value, Container, Document, DYNAMIC_FIELD_CLASS};
use crate::group::ConditionGroup;
use crate::lookup::LookupCache;
use crate::schema::FieldConfig;
use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use valu3::prelude::*;

/// Detached copy of a governed field's container, taken at registration so
/// the field can be shown again after it was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingField {
    snapshot: Container,
    group: ConditionGroup,
}

impl PendingField {
    pub fn new(snapshot: Container, group: ConditionGroup) -> Self {
        Self { snapshot, group }
    }

    pub fn group(&self) -> &ConditionGroup {
        &self.group
    }

    /// A fresh, visible copy of the snapshot.
    pub fn instantiate(&self) -> Container {
        let mut container = self.snapshot.clone();
        container.add_class(DYNAMIC_FIELD_CLASS);
        container.visible = true;
        container
    }
}

pub type PendingFields = HashMap<String, PendingField>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl ToValueBehavior for Visibility {
    fn to_value(&self) -> Value {
        match self {
            Visibility::Shown => "shown".to_value(),
            Visibility::Hidden => "hidden".to_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityChange {
    pub field: String,
    pub visibility: Visibility,
}

/// Stores a snapshot for every dependent whose container is in the document.
pub fn capture_pending(document: &Document, groups: &[ConditionGroup], pending: &mut PendingFields) {
    for group in groups {
        match document.field(&group.field) {
            Some(container) => {
                pending.insert(
                    group.field.clone(),
                    PendingField::new(container.clone(), group.clone()),
                );
            }
            None => log::debug!("No container to snapshot for {}", group.field),
        }
    }
}

/// Inserts the dependent right after its governing field unless it is
/// already present.
pub fn show_field(
    document: &mut Document,
    pending: &PendingFields,
    governing_key: &str,
    field_key: &str,
) -> bool {
    let cached = match pending.get(field_key) {
        Some(cached) => cached,
        None => {
            log::warn!("Unregistered conditional field: {}", field_key);
            return false;
        }
    };

    if document.contains(&container_id(field_key)) {
        return false;
    }

    match document.insert_after(&container_id(governing_key), cached.instantiate()) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("Cannot show {}: {}", field_key, err);
            false
        }
    }
}

pub fn hide_field(document: &mut Document, field_key: &str) -> bool {
    document.remove(&container_id(field_key)).is_some()
}

/// Re-evaluates every display group of a governing field against its current
/// value.
pub fn update_visibility(
    document: &mut Document,
    pending: &PendingFields,
    governing_key: &str,
    groups: &[ConditionGroup],
) -> Vec<VisibilityChange> {
    let value = match document.field(governing_key) {
        Some(container) => extract_value(container),
        None => {
            log::debug!("Governing field {} is not displayed", governing_key);
            return Vec::new();
        }
    };

    groups
        .iter()
        .map(|group| {
            if group.evaluate(&value) {
                log::debug!("Condition valid for: {}", group.field);
                show_field(document, pending, governing_key, &group.field);

                VisibilityChange {
                    field: group.field.clone(),
                    visibility: Visibility::Shown,
                }
            } else {
                log::debug!("Condition invalid for: {}", group.field);
                hide_field(document, &group.field);

                VisibilityChange {
                    field: group.field.clone(),
                    visibility: Visibility::Hidden,
                }
            }
        })
        .collect()
}

/// Replaces a select's options, adding a placeholder when there is more
/// than one choice.
pub fn populate_options(control: &mut Control, values: &[FieldValue]) -> Result<(), ControlError> {
    let mut options = Vec::with_capacity(values.len() + 1);

    if values.len() > 1 {
        options.push(ChoiceOption::placeholder());
    }

    options.extend(values.iter().map(|value| ChoiceOption::new(&value.to_text())));

    control.write_options(options)
}

/// Repopulates every field connected to `governing_key` from the lookup
/// cache. Returns the keys of the fields whose options were rewritten.
pub fn update_linked_options(
    document: &mut Document,
    lookup: &LookupCache,
    fields: &IndexMap<String, FieldConfig>,
    governing_key: &str,
) -> Vec<String> {
    let choices_map = match fields
        .get(governing_key)
        .and_then(|config| config.choices_map.as_ref())
    {
        Some(choices_map) => choices_map,
        None => return Vec::new(),
    };

    let value = match document.field(governing_key) {
        Some(container) => extract_value(container),
        None => return Vec::new(),
    };

    let mut updated = Vec::new();

    for connected in &choices_map.connected_fields {
        let target_key = match fields
            .get(connected)
            .and_then(|config| config.choices_map.as_ref())
        {
            Some(target_map) => &target_map.map_key,
            None => {
                log::warn!("No choices map for connected field: {}", connected);
                continue;
            }
        };

        let filters = IndexMap::from([(choices_map.map_key.clone(), value.clone())]);
        let options = lookup.query(&choices_map.map_name, &filters, target_key);

        let control = match document
            .field_mut(connected)
            .and_then(|container| container.control.as_mut())
        {
            Some(control) => control,
            None => {
                log::error!("No input element found in container {}", container_id(connected));
                continue;
            }
        };

        match populate_options(control, &options) {
            Ok(()) => updated.push(connected.clone()),
            Err(err) => log::error!("Cannot update options of {}: {}", connected, err),
        }
    }

    updated
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::control::PLACEHOLDER_LABEL;
    use crate::group::ConditionGroupRaw;
    use crate::lookup::Record;
    use crate::schema::FormConfig;

    const SCHEMA: &str = r#"
form_id: case_form
sections:
  - json_template:
      employment_status:
        label: Employment Status
        input: select
        choices: [unemployed, employed]
      employer:
        label: Employer
        input: string
        length: 100
      country:
        label: Country
        input: select
        choices: [US, CA, FR]
        choices_map: {map_name: dict_country_city, map_key: country, connected_fields: [city]}
      city:
        label: City
        input: select
        choices_map: {map_name: dict_country_city, map_key: city}
"#;

    fn employer_group() -> ConditionGroup {
        let raw: ConditionGroupRaw = serde_yaml::from_str(
            r#"{field: employer, conditions: [{type: Comparison, comparison_operator: "==", compare_value: employed}]}"#,
        )
        .unwrap();
        ConditionGroup::from(&raw)
    }

    fn setup() -> (Document, PendingFields, Vec<ConditionGroup>) {
        let document = Document::render(&FormConfig::from_yaml_str(SCHEMA).unwrap());
        let groups = vec![employer_group()];
        let mut pending = PendingFields::new();
        capture_pending(&document, &groups, &mut pending);
        (document, pending, groups)
    }

    fn select(document: &mut Document, field: &str, value: &str) {
        document
            .field_mut(field)
            .unwrap()
            .control
            .as_mut()
            .unwrap()
            .set_value(&value.into())
            .unwrap();
    }

    #[test]
    fn test_visibility_round_trip() {
        let (mut document, pending, groups) = setup();

        let changes = update_visibility(&mut document, &pending, "employment_status", &groups);
        assert_eq!(changes[0].visibility, Visibility::Hidden);
        assert!(!document.contains("employer_container"));

        for _ in 0..3 {
            select(&mut document, "employment_status", "employed");
            update_visibility(&mut document, &pending, "employment_status", &groups);
            assert_eq!(document.count("employer_container"), 1);
            assert_eq!(
                document.position("employer_container"),
                Some(document.position("employment_status_container").unwrap() + 1)
            );

            select(&mut document, "employment_status", "unemployed");
            update_visibility(&mut document, &pending, "employment_status", &groups);
            assert_eq!(document.count("employer_container"), 0);
        }
    }

    #[test]
    fn test_shown_field_is_fresh_copy() {
        let (mut document, pending, groups) = setup();

        select(&mut document, "employment_status", "employed");
        update_visibility(&mut document, &pending, "employment_status", &groups);

        let employer = document.field_mut("employer").unwrap();
        employer.errors.push("stale".to_string());
        employer.control.as_mut().unwrap().set_value(&"ACME".into()).unwrap();

        select(&mut document, "employment_status", "unemployed");
        update_visibility(&mut document, &pending, "employment_status", &groups);
        select(&mut document, "employment_status", "employed");
        update_visibility(&mut document, &pending, "employment_status", &groups);

        let employer = document.field("employer").unwrap();
        assert!(employer.errors.is_empty());
        assert!(employer.has_class(DYNAMIC_FIELD_CLASS));
        assert_eq!(extract_value(employer), FieldValue::from(""));
    }

    #[test]
    fn test_show_unregistered_field_is_noop() {
        let (mut document, pending, _) = setup();

        assert!(!show_field(&mut document, &pending, "country", "ghost"));
    }

    fn cache() -> LookupCache {
        let rows = [("US", "Boston"), ("US", "Austin"), ("CA", "Toronto"), ("US", "Boston")];
        let table = rows
            .iter()
            .map(|(country, city)| {
                Record::from([
                    ("country".to_string(), FieldValue::from(*country)),
                    ("city".to_string(), FieldValue::from(*city)),
                ])
            })
            .collect();

        let mut cache = LookupCache::new();
        cache.insert("dict_country_city", table);
        cache
    }

    #[test]
    fn test_linked_options_with_placeholder() {
        let (mut document, _, _) = setup();
        let fields = FormConfig::from_yaml_str(SCHEMA).unwrap().field_table();

        select(&mut document, "country", "US");
        let updated = update_linked_options(&mut document, &cache(), &fields, "country");

        assert_eq!(updated, vec!["city".to_string()]);

        let options = document.field("city").unwrap().control.as_ref().unwrap().options().unwrap().clone();
        let labels: Vec<&str> = options.iter().map(|option| option.label.as_str()).collect();

        assert_eq!(labels, vec![PLACEHOLDER_LABEL, "Boston", "Austin"]);
        assert_eq!(options[0].value, "");
    }

    #[test]
    fn test_linked_options_single_result_has_no_placeholder() {
        let (mut document, _, _) = setup();
        let fields = FormConfig::from_yaml_str(SCHEMA).unwrap().field_table();

        select(&mut document, "country", "CA");
        update_linked_options(&mut document, &cache(), &fields, "country");

        let city = document.field("city").unwrap();
        assert_eq!(extract_value(city), FieldValue::from("Toronto"));
        assert_eq!(city.control.as_ref().unwrap().options().unwrap().len(), 1);
    }

    #[test]
    fn test_linked_options_without_results_clears_select() {
        let (mut document, _, _) = setup();
        let fields = FormConfig::from_yaml_str(SCHEMA).unwrap().field_table();

        select(&mut document, "country", "FR");
        update_linked_options(&mut document, &cache(), &fields, "country");

        let city = document.field("city").unwrap();
        assert!(city.control.as_ref().unwrap().options().unwrap().is_empty());
        assert_eq!(extract_value(city), FieldValue::Null);
    }
}
