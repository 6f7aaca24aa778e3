use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum RuleError {
    UnknownType(String),
    InvalidValue(String),
}

impl Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleError::UnknownType(err) => write!(f, "Unknown rule type: {}", err),
            RuleError::InvalidValue(err) => write!(f, "Invalid rule value: {}", err),
        }
    }
}

impl std::error::Error for RuleError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRaw {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: serde_yaml::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Rule {
    /// Inclusive numeric bounds.
    Range { min: f64, max: f64 },
}

fn bound(value: &serde_yaml::Value, name: &str) -> Result<f64, RuleError> {
    match value.get(name) {
        Some(serde_yaml::Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| RuleError::InvalidValue(format!("{} is not a number", name))),
        Some(serde_yaml::Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| RuleError::InvalidValue(format!("{} is not a number: {}", name, text))),
        Some(_) => Err(RuleError::InvalidValue(format!("{} is not a number", name))),
        None => Err(RuleError::InvalidValue(format!("{} does not exist", name))),
    }
}

impl TryFrom<&RuleRaw> for Rule {
    type Error = RuleError;

    fn try_from(raw: &RuleRaw) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "range" => Ok(Rule::Range {
                min: bound(&raw.value, "min")?,
                max: bound(&raw.value, "max")?,
            }),
            other => Err(RuleError::UnknownType(other.to_string())),
        }
    }
}

impl Rule {
    /// `true` when the value passes. Values that do not coerce to a number
    /// are never out of range.
    pub fn check(&self, value: &FieldValue) -> bool {
        match self {
            Rule::Range { min, max } => {
                let number = value.to_number();
                !(number < *min || number > *max)
            }
        }
    }

    pub fn message(
        &self,
        target_label: &str,
        parent_label: &str,
        parent_value: &FieldValue,
    ) -> String {
        match self {
            Rule::Range { min, max } => format!(
                "{} value must between {} and {} when {} is {}",
                target_label,
                FieldValue::Number(*min),
                FieldValue::Number(*max),
                parent_label,
                parent_value
            ),
        }
    }
}
