use formflow_engine::session::{FormSession, Notice};
use formflow_engine::FieldValue;
use serde::Deserialize;
use std::collections::HashMap;
use valu3::prelude::*;

/// One scripted user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScenarioEvent {
    Change {
        change: String,
        #[serde(default)]
        value: FieldValue,
    },
    Submit {
        submit: bool,
    },
}

pub fn parse_events(source: &str) -> Result<Vec<ScenarioEvent>, serde_yaml::Error> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let events: Option<Vec<ScenarioEvent>> = serde_yaml::from_str(source)?;
    Ok(events.unwrap_or_default())
}

fn error_line(field: &str, message: &str) -> Value {
    let mut map = HashMap::new();
    map.insert("change".to_string(), field.to_value());
    map.insert("error".to_string(), message.to_value());
    map.to_value()
}

fn notice_line(notice: &Notice) -> Value {
    let mut map = HashMap::new();
    map.insert("notice".to_string(), notice.to_value());
    map.to_value()
}

/// Replays `events` on the session, one report line per event. Notices
/// raised along the way are reported as their own lines.
pub fn run_events(session: &mut FormSession, events: &[ScenarioEvent]) -> Vec<Value> {
    let mut lines: Vec<Value> = session.take_notices().iter().map(notice_line).collect();

    for event in events {
        match event {
            ScenarioEvent::Change { change, value } => match session.change(change, value) {
                Ok(outcome) => lines.push(outcome.to_value()),
                Err(err) => {
                    log::warn!("Change of {} rejected: {}", change, err);
                    lines.push(error_line(change, &err.to_string()));
                }
            },
            ScenarioEvent::Submit { submit: true } => match session.submit() {
                Ok(outcome) => lines.push(outcome.to_value()),
                Err(err) => lines.push(error_line("submit", &err.to_string())),
            },
            ScenarioEvent::Submit { submit: false } => {
                log::debug!("Skipping disabled submit event");
            }
        }

        lines.extend(session.take_notices().iter().map(notice_line));
    }

    lines
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_events() {
        let events = parse_events(
            r#"
- {change: country, value: US}
- {change: tags, value: [a, b]}
- {change: note}
- {submit: true}
"#,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                ScenarioEvent::Change {
                    change: "country".to_string(),
                    value: "US".into()
                },
                ScenarioEvent::Change {
                    change: "tags".to_string(),
                    value: vec!["a", "b"].into()
                },
                ScenarioEvent::Change {
                    change: "note".to_string(),
                    value: FieldValue::Null
                },
                ScenarioEvent::Submit { submit: true },
            ]
        );
    }

    #[test]
    fn test_empty_scenario() {
        assert!(parse_events("").unwrap().is_empty());
    }
}
