use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionError {
    InvalidType(String),
    InvalidOperator(String),
    CompareValueInvalid(String),
}

impl Display for ConditionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionError::InvalidType(err) => write!(f, "Invalid condition type: {}", err),
            ConditionError::InvalidOperator(err) => write!(f, "Invalid operator: {}", err),
            ConditionError::CompareValueInvalid(err) => write!(f, "Compare value invalid: {}", err),
        }
    }
}

impl std::error::Error for ConditionError {}

/// Condition as written in a field schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRaw {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "comparisonOperator")]
    pub comparison_operator: String,
    #[serde(default, alias = "compareValue")]
    pub compare_value: FieldValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
}

impl TryFrom<&str> for ComparisonOperator {
    type Error = ConditionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "==" => Ok(ComparisonOperator::Equal),
            "!=" => Ok(ComparisonOperator::NotEqual),
            ">" => Ok(ComparisonOperator::GreaterThan),
            ">=" => Ok(ComparisonOperator::GreaterThanOrEqual),
            "<" => Ok(ComparisonOperator::LessThan),
            "<=" => Ok(ComparisonOperator::LessThanOrEqual),
            "in" => Ok(ComparisonOperator::In),
            _ => Err(ConditionError::InvalidOperator(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StringOperator {
    Includes,
    StartsWith,
    EndsWith,
    Equals,
    NotEquals,
}

impl TryFrom<&str> for StringOperator {
    type Error = ConditionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "includes" => Ok(StringOperator::Includes),
            "startsWith" => Ok(StringOperator::StartsWith),
            "endsWith" => Ok(StringOperator::EndsWith),
            "equals" => Ok(StringOperator::Equals),
            "notEquals" => Ok(StringOperator::NotEquals),
            _ => Err(ConditionError::InvalidOperator(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArrayOperator {
    Includes,
    Excludes,
    Any,
    All,
    Equal,
}

impl TryFrom<&str> for ArrayOperator {
    type Error = ConditionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "includes" => Ok(ArrayOperator::Includes),
            "excludes" => Ok(ArrayOperator::Excludes),
            "any" => Ok(ArrayOperator::Any),
            "all" => Ok(ArrayOperator::All),
            "equal" => Ok(ArrayOperator::Equal),
            _ => Err(ConditionError::InvalidOperator(value.to_string())),
        }
    }
}

/// Marks an array operator whose operands are read the other way round.
pub const REVERSED_PREFIX: char = '-';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operator {
    Comparison(ComparisonOperator),
    String(StringOperator),
    Array {
        operator: ArrayOperator,
        reversed: bool,
    },
    /// Placeholder for a condition whose family or operator was not
    /// recognised. Never matches.
    Invalid(String),
}

impl Operator {
    pub fn try_build(kind: &str, operator: &str) -> Result<Self, ConditionError> {
        match kind {
            "Comparison Operators" | "Comparison" | "comparison" => {
                Ok(Operator::Comparison(ComparisonOperator::try_from(operator)?))
            }
            "String Operators" | "String" | "string" => {
                Ok(Operator::String(StringOperator::try_from(operator)?))
            }
            "Array Operators" | "Array" | "array" => match operator.strip_prefix(REVERSED_PREFIX) {
                Some(operator) => Ok(Operator::Array {
                    operator: ArrayOperator::try_from(operator)?,
                    reversed: true,
                }),
                None => Ok(Operator::Array {
                    operator: ArrayOperator::try_from(operator)?,
                    reversed: false,
                }),
            },
            _ => Err(ConditionError::InvalidType(kind.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub operator: Operator,
    pub compare_value: FieldValue,
}

impl TryFrom<&ConditionRaw> for Condition {
    type Error = ConditionError;

    fn try_from(raw: &ConditionRaw) -> Result<Self, Self::Error> {
        Ok(Self {
            operator: Operator::try_build(&raw.kind, &raw.comparison_operator)?,
            compare_value: raw.compare_value.clone(),
        })
    }
}

impl Condition {
    pub fn new(operator: Operator, compare_value: FieldValue) -> Self {
        Self {
            operator,
            compare_value,
        }
    }

    /// Builds the condition, or logs the error and keeps an `Operator::Invalid`
    /// entry in its place so the rest of the group still decides.
    pub fn from_raw_or_invalid(raw: &ConditionRaw) -> Self {
        match Self::try_from(raw) {
            Ok(condition) => condition,
            Err(err) => {
                log::error!("Condition ignored: {}", err);
                Self::new(Operator::Invalid(err.to_string()), raw.compare_value.clone())
            }
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.operator, Operator::Invalid(_))
    }

    /// Never fails: an evaluation error is logged and reads as `false`.
    pub fn evaluate(&self, value: &FieldValue) -> bool {
        log::debug!(
            "Evaluating {:?} on {} against {}",
            self.operator,
            value,
            self.compare_value
        );

        match self.try_evaluate(value) {
            Ok(result) => result,
            Err(err) => {
                log::error!("Condition evaluation error: {}", err);
                false
            }
        }
    }

    fn try_evaluate(&self, value: &FieldValue) -> Result<bool, ConditionError> {
        match &self.operator {
            Operator::Comparison(operator) => compare(value, *operator, &self.compare_value),
            Operator::String(operator) => {
                Ok(string_operation(value, *operator, &self.compare_value))
            }
            Operator::Array {
                operator,
                reversed: true,
            } => Ok(array_operation(value, *operator, &self.compare_value)),
            Operator::Array {
                operator,
                reversed: false,
            } => Ok(array_operation(&self.compare_value, *operator, value)),
            Operator::Invalid(_) => Ok(false),
        }
    }
}

pub fn evaluate(value: &FieldValue, condition: &Condition) -> bool {
    condition.evaluate(value)
}

fn compare(
    actual: &FieldValue,
    operator: ComparisonOperator,
    expected: &FieldValue,
) -> Result<bool, ConditionError> {
    let left = actual.to_number();
    let right = expected.to_number();

    let result = match operator {
        ComparisonOperator::Equal => actual.loose_eq(expected),
        ComparisonOperator::NotEqual => !actual.loose_eq(expected),
        ComparisonOperator::GreaterThan => left > right,
        ComparisonOperator::GreaterThanOrEqual => left >= right,
        ComparisonOperator::LessThan => left < right,
        ComparisonOperator::LessThanOrEqual => left <= right,
        ComparisonOperator::In => match expected {
            FieldValue::List(items) => items.iter().any(|item| item.strict_eq(actual)),
            FieldValue::Text(text) => text.contains(&actual.to_text()),
            other => {
                return Err(ConditionError::CompareValueInvalid(format!(
                    "'in' expects a list, got {}",
                    other
                )))
            }
        },
    };

    Ok(result)
}

fn string_operation(value: &FieldValue, operator: StringOperator, expected: &FieldValue) -> bool {
    let value = value.to_text().to_lowercase();
    let expected = expected.to_text().to_lowercase();

    match operator {
        StringOperator::Includes => value.contains(&expected),
        StringOperator::StartsWith => value.starts_with(&expected),
        StringOperator::EndsWith => value.ends_with(&expected),
        StringOperator::Equals => value == expected,
        StringOperator::NotEquals => value != expected,
    }
}

enum Probe<'a> {
    List(&'a [FieldValue]),
    Text(String),
}

impl Probe<'_> {
    fn every_in(&self, list: &[String]) -> bool {
        match self {
            Probe::List(items) => items.iter().all(|item| is_member(item, list)),
            Probe::Text(text) => list.contains(text),
        }
    }

    fn contains(&self, needle: &str) -> bool {
        match self {
            Probe::List(items) => items
                .iter()
                .any(|item| matches!(item, FieldValue::Text(text) if text == needle)),
            Probe::Text(text) => text.contains(needle),
        }
    }
}

// list elements are compared without coercion
fn is_member(item: &FieldValue, list: &[String]) -> bool {
    match item {
        FieldValue::Text(text) => list.contains(text),
        _ => false,
    }
}

/// Set/array operators. `expected` must be a list; the probe is either a
/// list (elements used as-is) or any scalar (lower-cased text).
pub fn array_operation(value: &FieldValue, operator: ArrayOperator, expected: &FieldValue) -> bool {
    let expected: Vec<String> = match expected {
        FieldValue::List(items) => items
            .iter()
            .map(|item| item.to_text().to_lowercase())
            .collect(),
        other => {
            log::warn!("Compare value should be array, got: {}", other);
            return false;
        }
    };

    let probe = match value {
        FieldValue::List(items) => Probe::List(items),
        other => Probe::Text(other.to_text().to_lowercase()),
    };

    match operator {
        ArrayOperator::Includes => probe.every_in(&expected),
        ArrayOperator::Excludes => !probe.every_in(&expected),
        ArrayOperator::Any => expected.iter().any(|item| probe.contains(item)),
        ArrayOperator::All => expected.iter().all(|item| probe.contains(item)),
        ArrayOperator::Equal => match &probe {
            Probe::List(items) => {
                expected.iter().all(|item| probe.contains(item))
                    && items.iter().all(|item| is_member(item, &expected))
            }
            Probe::Text(_) => false,
        },
    }
}
