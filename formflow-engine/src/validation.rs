use crate::document::{container_id, extract_value, Document};
use crate::group::ConditionGroup;
use crate::schema::FieldConfig;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use valu3::prelude::*;

/// Validation groups per governing field key, field table order.
pub type ValidationRules = IndexMap<String, Vec<ConditionGroup>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field_key: String,
    pub message: String,
}

impl ToValueBehavior for ValidationError {
    fn to_value(&self) -> Value {
        let mut map = HashMap::new();
        map.insert("field".to_string(), self.field_key.to_value());
        map.insert("message".to_string(), self.message.to_value());
        map.to_value()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn label_of<'a>(fields: &'a IndexMap<String, FieldConfig>, key: &'a str) -> &'a str {
    fields.get(key).map(FieldConfig::label).unwrap_or(key)
}

/// Runs every validation group against the current document. Errors of the
/// previous pass are cleared first; new ones are appended to the target
/// containers.
pub fn validate_form(
    document: &mut Document,
    fields: &IndexMap<String, FieldConfig>,
    rules: &ValidationRules,
) -> ValidationReport {
    document.clear_errors();

    let mut report = ValidationReport::default();

    for (parent_key, groups) in rules {
        let parent_value = match document.field(parent_key) {
            Some(container) => extract_value(container),
            None => {
                log::debug!("Skipping validation of {}: not displayed", parent_key);
                continue;
            }
        };

        for group in groups {
            if !group.evaluate(&parent_value) {
                continue;
            }

            let target = match document.field_mut(&group.field) {
                Some(target) => target,
                None => {
                    log::warn!("Validation target {} not found", container_id(&group.field));
                    continue;
                }
            };

            let target_value = extract_value(target);

            for rule in &group.rules {
                if rule.check(&target_value) {
                    continue;
                }

                let message = rule.message(
                    label_of(fields, &group.field),
                    label_of(fields, parent_key),
                    &parent_value,
                );

                target.errors.push(message.clone());
                report.errors.push(ValidationError {
                    field_key: group.field.clone(),
                    message,
                });
            }
        }
    }

    report
}
