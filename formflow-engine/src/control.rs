use crate::value::FieldValue;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl ChoiceOption {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
            selected: false,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            value: String::new(),
            label: PLACEHOLDER_LABEL.to_string(),
            selected: false,
        }
    }
}

pub const PLACEHOLDER_LABEL: &str = "--Select--";

/// The primary input of a field container, resolved once when the
/// container is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Control {
    Text { value: String, multiline: bool },
    Checkbox { checked: bool },
    RadioGroup { options: Vec<ChoiceOption> },
    SingleSelect { options: Vec<ChoiceOption> },
    MultiSelect { options: Vec<ChoiceOption> },
    Unsupported { tag: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    NotASelect(String),
    UnknownOption(String),
    InvalidValue(String),
}

impl std::fmt::Display for ControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlError::NotASelect(kind) => write!(f, "Not a select control: {}", kind),
            ControlError::UnknownOption(value) => write!(f, "Unknown option: {}", value),
            ControlError::InvalidValue(value) => write!(f, "Invalid value: {}", value),
        }
    }
}

impl std::error::Error for ControlError {}

impl Control {
    pub fn text(value: &str) -> Self {
        Control::Text {
            value: value.to_string(),
            multiline: false,
        }
    }

    pub fn textarea(value: &str) -> Self {
        Control::Text {
            value: value.to_string(),
            multiline: true,
        }
    }

    pub fn select(values: &[&str]) -> Self {
        Control::SingleSelect {
            options: values.iter().map(|value| ChoiceOption::new(value)).collect(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Control::Text {
                multiline: false, ..
            } => "text",
            Control::Text {
                multiline: true, ..
            } => "textarea",
            Control::Checkbox { .. } => "checkbox",
            Control::RadioGroup { .. } => "radio",
            Control::SingleSelect { .. } => "select",
            Control::MultiSelect { .. } => "select-multiple",
            Control::Unsupported { tag } => tag.as_str(),
        }
    }

    pub fn read(&self) -> FieldValue {
        match self {
            Control::Text { value, .. } => FieldValue::Text(value.clone()),
            Control::Checkbox { checked } => FieldValue::Bool(*checked),
            Control::RadioGroup { options } => options
                .iter()
                .find(|option| option.selected)
                .map(|option| FieldValue::Text(option.value.clone()))
                .unwrap_or(FieldValue::Null),
            // a single select with nothing flagged shows its first option
            Control::SingleSelect { options } => options
                .iter()
                .find(|option| option.selected)
                .or_else(|| options.first())
                .map(|option| FieldValue::Text(option.value.clone()))
                .unwrap_or(FieldValue::Null),
            Control::MultiSelect { options } => FieldValue::List(
                options
                    .iter()
                    .filter(|option| option.selected)
                    .map(|option| FieldValue::Text(option.value.clone()))
                    .collect(),
            ),
            Control::Unsupported { tag } => {
                log::error!("Does not support this type of input element type: {}", tag);
                FieldValue::Null
            }
        }
    }

    pub fn options(&self) -> Option<&Vec<ChoiceOption>> {
        match self {
            Control::RadioGroup { options }
            | Control::SingleSelect { options }
            | Control::MultiSelect { options } => Some(options),
            _ => None,
        }
    }

    /// Replaces the options of a select control.
    pub fn write_options(&mut self, new_options: Vec<ChoiceOption>) -> Result<(), ControlError> {
        match self {
            Control::SingleSelect { options } | Control::MultiSelect { options } => {
                *options = new_options;
                Ok(())
            }
            other => Err(ControlError::NotASelect(other.kind().to_string())),
        }
    }

    /// Applies user input to the control.
    pub fn set_value(&mut self, value: &FieldValue) -> Result<(), ControlError> {
        match self {
            Control::Text { value: current, .. } => {
                *current = match value {
                    FieldValue::Null => String::new(),
                    other => other.to_text(),
                };
                Ok(())
            }
            Control::Checkbox { checked } => match value {
                FieldValue::Bool(flag) => {
                    *checked = *flag;
                    Ok(())
                }
                other => Err(ControlError::InvalidValue(other.to_text())),
            },
            Control::RadioGroup { options } | Control::SingleSelect { options } => {
                let target = match value {
                    FieldValue::Null => None,
                    other => Some(other.to_text()),
                };

                if let Some(target) = &target {
                    if !options.iter().any(|option| &option.value == target) {
                        return Err(ControlError::UnknownOption(target.clone()));
                    }
                }

                for option in options.iter_mut() {
                    option.selected = Some(&option.value) == target.as_ref();
                }

                Ok(())
            }
            Control::MultiSelect { options } => {
                let targets: Vec<String> = match value {
                    FieldValue::List(items) => items.iter().map(FieldValue::to_text).collect(),
                    FieldValue::Null => Vec::new(),
                    other => vec![other.to_text()],
                };

                if let Some(unknown) = targets
                    .iter()
                    .find(|target| !options.iter().any(|option| &option.value == *target))
                {
                    return Err(ControlError::UnknownOption(unknown.clone()));
                }

                for option in options.iter_mut() {
                    option.selected = targets.contains(&option.value);
                }

                Ok(())
            }
            Control::Unsupported { tag } => Err(ControlError::InvalidValue(tag.clone())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_checkbox_and_text() {
        assert_eq!(
            Control::Checkbox { checked: true }.read(),
            FieldValue::Bool(true)
        );
        assert_eq!(Control::textarea("notes").read(), FieldValue::from("notes"));
    }

    #[test]
    fn test_read_radio_without_checked_member() {
        let radio = Control::RadioGroup {
            options: vec![ChoiceOption::new("yes"), ChoiceOption::new("no")],
        };

        assert_eq!(radio.read(), FieldValue::Null);
    }

    #[test]
    fn test_read_single_select_defaults_to_first_option() {
        let mut select = Control::select(&["employed", "unemployed"]);
        assert_eq!(select.read(), FieldValue::from("employed"));

        select.set_value(&"unemployed".into()).unwrap();
        assert_eq!(select.read(), FieldValue::from("unemployed"));
    }

    #[test]
    fn test_read_multi_select_keeps_option_order() {
        let mut select = Control::MultiSelect {
            options: vec![
                ChoiceOption::new("a"),
                ChoiceOption::new("b"),
                ChoiceOption::new("c"),
            ],
        };

        select.set_value(&vec!["c", "a"].into()).unwrap();

        assert_eq!(select.read(), FieldValue::from(vec!["a", "c"]));
    }

    #[test]
    fn test_unsupported_reads_null() {
        let control = Control::Unsupported {
            tag: "canvas".to_string(),
        };

        assert_eq!(control.read(), FieldValue::Null);
    }

    #[test]
    fn test_set_unknown_option_fails() {
        let mut select = Control::select(&["a"]);

        assert_eq!(
            select.set_value(&"z".into()),
            Err(ControlError::UnknownOption("z".to_string()))
        );
    }

    #[test]
    fn test_write_options_on_text_fails() {
        let mut text = Control::text("");

        assert!(text.write_options(vec![ChoiceOption::new("a")]).is_err());
    }
}
