use formflow_runtime::{FileLookupSource, FormflowRuntime, LookupTarget, RuntimeError, Settings};
use std::time::Duration;
use valu3::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn settings(lookup: LookupTarget) -> Settings {
    Settings {
        schema_path: fixture("case_form.yaml"),
        events_path: Some(fixture("case_events.yaml")),
        lookup,
        lookup_timeout: Duration::from_secs(1),
        print_document: false,
    }
}

#[tokio::test]
async fn scenario_reports_veto_then_proceed() {
    let report = FormflowRuntime::run_settings(&settings(LookupTarget::File(fixture(
        "lookup_tables.yaml",
    ))))
    .await
    .unwrap();

    assert_eq!(report.lines.len(), 6);

    let vetoed = &report.lines[2];
    assert_eq!(vetoed.get("submit"), Some(&Value::from("vetoed")));
    assert!(vetoed.get("errors").is_some());

    assert_eq!(report.lines[5].get("submit"), Some(&Value::from("proceed")));

    let city = report.document.field("city").unwrap();
    let labels: Vec<String> = city
        .control
        .as_ref()
        .unwrap()
        .options()
        .unwrap()
        .iter()
        .map(|option| option.label.clone())
        .collect();

    assert_eq!(labels, vec!["--Select--", "Boston", "Austin"]);
    assert!(report.document.contains("employer_container"));
}

#[tokio::test]
async fn unreachable_lookup_raises_notice() {
    let report = FormflowRuntime::run_settings(&settings(LookupTarget::Http(
        "http://127.0.0.1:9/dictionary".to_string(),
    )))
    .await
    .unwrap();

    assert!(report.lines[0].get("notice").is_some());
    assert_eq!(report.lines.len(), 7);
}

#[tokio::test]
async fn missing_schema_file_fails() {
    let mut settings = settings(LookupTarget::None);
    settings.schema_path = fixture("missing.yaml");

    assert!(matches!(
        FormflowRuntime::run_settings(&settings).await,
        Err(RuntimeError::ReadFile(_, _))
    ));
}

#[tokio::test]
async fn runtime_from_strings() {
    let source = FileLookupSource::parse("{}").unwrap();
    let mut runtime = FormflowRuntime::new();

    runtime
        .set_schema_str(
            r#"
form_id: mini
sections:
  - json_template:
      accept:
        label: Accept
        input: checkbox
"#,
        )
        .unwrap()
        .set_events_str("[{change: accept, value: true}, {change: ghost, value: 1}]")
        .unwrap();

    let report = runtime.run(&source).await.unwrap();

    assert_eq!(report.lines[0].get("value"), Some(&true.to_value()));
    assert!(report.lines[1].get("error").is_some());
    assert!(report.document_yaml().unwrap().contains("accept_container"));
}
