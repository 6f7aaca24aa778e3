use serde::{Deserialize, Serialize};
use std::fmt::Display;
use valu3::prelude::*;

/// Dynamic value read from a control or configured as a comparison target.
///
/// The coercions below follow the loose typing form rules were written
/// against: numbers and numeric text compare freely, booleans count as 1/0
/// and lists stringify by joining their elements with `,`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_list(&self) -> Option<&Vec<FieldValue>> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric coercion. Text that is not a number yields NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            FieldValue::Null => 0.0,
            FieldValue::Bool(true) => 1.0,
            FieldValue::Bool(false) => 0.0,
            FieldValue::Number(number) => *number,
            FieldValue::Text(text) => parse_number(text),
            FieldValue::List(_) => parse_number(&self.to_text()),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(value) => value.to_string(),
            FieldValue::Number(number) => format_number(*number),
            FieldValue::Text(text) => text.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(|item| match item {
                    FieldValue::Null => String::new(),
                    other => other.to_text(),
                })
                .collect::<Vec<String>>()
                .join(","),
        }
    }

    /// Loose equality on raw operands.
    pub fn loose_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Null, _) | (_, FieldValue::Null) => false,
            // distinct lists are distinct objects
            (FieldValue::List(_), FieldValue::List(_)) => false,
            (FieldValue::Bool(_), _) => FieldValue::Number(self.to_number()).loose_eq(other),
            (_, FieldValue::Bool(_)) => self.loose_eq(&FieldValue::Number(other.to_number())),
            (FieldValue::List(_), _) => FieldValue::Text(self.to_text()).loose_eq(other),
            (_, FieldValue::List(_)) => self.loose_eq(&FieldValue::Text(other.to_text())),
            (FieldValue::Text(left), FieldValue::Text(right)) => left == right,
            (FieldValue::Number(left), FieldValue::Number(right)) => left == right,
            (FieldValue::Number(left), FieldValue::Text(_)) => *left == other.to_number(),
            (FieldValue::Text(_), FieldValue::Number(right)) => self.to_number() == *right,
        }
    }

    /// Same-kind equality: `Text("1")` is not `Number(1.0)`.
    pub fn strict_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(left), FieldValue::Bool(right)) => left == right,
            (FieldValue::Number(left), FieldValue::Number(right)) => left == right,
            (FieldValue::Text(left), FieldValue::Text(right)) => left == right,
            _ => false,
        }
    }

    /// Null, empty text and the literal `"null"` all count as "no value" in
    /// lookup tables.
    pub fn is_blank_cell(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(text) => text.is_empty() || text == "null",
            _ => false,
        }
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|number| number as f64)
            .unwrap_or(f64::NAN);
    }

    // rust accepts "inf" and "nan" spellings that are not numbers here
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        "NaN".to_string()
    } else if number.is_infinite() {
        if number > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if number == 0.0 {
        "0".to_string()
    } else if number.fract() == 0.0 && number.abs() < 1e21 {
        format!("{:.0}", number)
    } else {
        format!("{}", number)
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Boolean(value) => FieldValue::Bool(*value),
            Value::Number(number) => number
                .to_f64()
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Null),
            Value::String(text) => FieldValue::Text(text.as_string()),
            Value::Array(array) => {
                FieldValue::List(array.values.iter().map(FieldValue::from).collect())
            }
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl ToValueBehavior for FieldValue {
    fn to_value(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(value) => value.to_value(),
            FieldValue::Number(number) => number.to_value(),
            FieldValue::Text(text) => text.to_value(),
            FieldValue::List(items) => items
                .iter()
                .map(|item| item.to_value())
                .collect::<Vec<Value>>()
                .to_value(),
        }
    }
}
