use crate::condition::{Condition, ConditionRaw};
use crate::rule::{Rule, RuleRaw};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// Only the exact `AND` requires every condition; any other written operator
/// needs just one.
impl From<&str> for LogicalOperator {
    fn from(value: &str) -> Self {
        match value {
            "AND" => LogicalOperator::And,
            _ => LogicalOperator::Or,
        }
    }
}

/// Condition group as written in a field schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroupRaw {
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionRaw>,
    pub field: String,
    #[serde(default)]
    pub rules: Vec<RuleRaw>,
}

/// Atomic conditions combined with AND/OR, governing one target field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionGroup {
    pub operator: LogicalOperator,
    pub conditions: Vec<Condition>,
    pub field: String,
    pub rules: Vec<Rule>,
}

impl ConditionGroup {
    /// A group that never matches, standing in for one whose governing field
    /// has no config.
    pub fn disabled(field: &str) -> Self {
        Self {
            operator: LogicalOperator::And,
            conditions: Vec::new(),
            field: field.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn evaluate(&self, value: &FieldValue) -> bool {
        if self.conditions.is_empty() {
            return false;
        }

        let results: Vec<bool> = self
            .conditions
            .iter()
            .map(|condition| condition.evaluate(value))
            .collect();

        match self.operator {
            LogicalOperator::And => results.iter().all(|result| *result),
            LogicalOperator::Or => results.iter().any(|result| *result),
        }
    }
}

pub fn evaluate_group(value: &FieldValue, group: &ConditionGroup) -> bool {
    group.evaluate(value)
}

impl From<&ConditionGroupRaw> for ConditionGroup {
    fn from(raw: &ConditionGroupRaw) -> Self {
        let operator = match &raw.operator {
            Some(operator) => LogicalOperator::from(operator.as_str()),
            None => LogicalOperator::default(),
        };

        let conditions = raw
            .conditions
            .iter()
            .map(Condition::from_raw_or_invalid)
            .collect();

        let rules = raw
            .rules
            .iter()
            .filter_map(|rule| match Rule::try_from(rule) {
                Ok(rule) => Some(rule),
                Err(err) => {
                    log::warn!("Rule for {} ignored: {}", raw.field, err);
                    None
                }
            })
            .collect();

        Self {
            operator,
            conditions,
            field: raw.field.clone(),
            rules,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn group(yaml: &str) -> ConditionGroup {
        let raw: ConditionGroupRaw = serde_yaml::from_str(yaml).unwrap();
        ConditionGroup::from(&raw)
    }

    #[test]
    fn test_empty_group_is_false() {
        let and = group("{field: city, conditions: []}");
        let or = group("{field: city, operator: OR, conditions: []}");

        assert!(!evaluate_group(&"x".into(), &and));
        assert!(!evaluate_group(&"x".into(), &or));
    }

    #[test]
    fn test_and_requires_every_condition() {
        let group = group(
            r#"
field: bonus
conditions:
  - {type: Comparison, comparison_operator: ">=", compare_value: 18}
  - {type: Comparison, comparison_operator: "<", compare_value: 65}
"#,
        );

        assert!(evaluate_group(&"30".into(), &group));
        assert!(!evaluate_group(&"70".into(), &group));
    }

    #[test]
    fn test_or_requires_any_condition() {
        let group = group(
            r#"
field: reason
operator: OR
conditions:
  - {type: String, comparison_operator: equals, compare_value: other}
  - {type: String, comparison_operator: startsWith, compare_value: "un"}
"#,
        );

        assert!(evaluate_group(&"Other".into(), &group));
        assert!(evaluate_group(&"unknown".into(), &group));
        assert!(!evaluate_group(&"employed".into(), &group));
    }

    #[test]
    fn test_camel_case_condition_keys() {
        let group = group(
            r#"
field: spouse
conditions:
  - {type: Comparison, comparisonOperator: "==", compareValue: married}
"#,
        );

        assert!(evaluate_group(&"married".into(), &group));
    }

    #[test]
    fn test_disabled_group_is_false() {
        let group = ConditionGroup::disabled("city");

        assert!(group.is_disabled());
        assert!(!group.evaluate(&FieldValue::Number(1.0)));
    }

    #[test]
    fn test_unrecognised_condition_leaves_or_group_live() {
        let group = group(
            r#"
field: detail
operator: OR
conditions:
  - {type: Comparison, comparison_operator: "===", compare_value: a}
  - {type: Comparison, comparison_operator: "==", compare_value: a}
"#,
        );

        assert!(!group.is_disabled());
        assert!(group.conditions[0].is_invalid());
        assert!(evaluate_group(&"a".into(), &group));
        assert!(!evaluate_group(&"b".into(), &group));
    }

    #[test]
    fn test_unrecognised_condition_fails_and_group() {
        let group = group(
            r#"
field: detail
conditions:
  - {type: Ranges, comparison_operator: between, compare_value: a}
  - {type: Comparison, comparison_operator: "==", compare_value: a}
"#,
        );

        assert!(!evaluate_group(&"a".into(), &group));
    }

    #[test]
    fn test_only_exact_and_requires_every_condition() {
        assert_eq!(LogicalOperator::from("AND"), LogicalOperator::And);
        assert_eq!(LogicalOperator::from("OR"), LogicalOperator::Or);
        assert_eq!(LogicalOperator::from("and"), LogicalOperator::Or);
        assert_eq!(LogicalOperator::from("XOR"), LogicalOperator::Or);

        let group = group(
            r#"
field: detail
operator: and
conditions:
  - {type: Comparison, comparison_operator: "==", compare_value: a}
  - {type: Comparison, comparison_operator: "==", compare_value: b}
"#,
        );

        assert!(evaluate_group(&"a".into(), &group));
    }

    #[test]
    fn test_unknown_rule_is_dropped() {
        let group = group(
            r#"
field: age
conditions:
  - {type: Comparison, comparison_operator: "==", compare_value: employed}
rules:
  - {type: range, value: {min: 18, max: 65}}
  - {type: regex, value: "^\\d+$"}
"#,
        );

        assert_eq!(group.rules, vec![Rule::Range { min: 18.0, max: 65.0 }]);
    }
}
