use crate::file_source::{FileLookupSource, NoLookupSource};
use crate::lookup_http::HttpLookupSource;
use crate::scenario::{parse_events, run_events, ScenarioEvent};
use crate::settings::{LookupTarget, Settings};
use formflow_engine::lookup::{LookupError, LookupSource};
use formflow_engine::schema::SchemaError;
use formflow_engine::{Document, FormConfig, FormSession};
use std::fmt::{Display, Formatter};
use valu3::prelude::*;

#[derive(Debug)]
pub enum RuntimeError {
    ReadFile(String, std::io::Error),
    Schema(SchemaError),
    Scenario(serde_yaml::Error),
    Lookup(LookupError),
    HttpClient(reqwest::Error),
    Render(serde_yaml::Error),
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::ReadFile(path, err) => write!(f, "Cannot read {}: {}", path, err),
            RuntimeError::Schema(err) => write!(f, "{}", err),
            RuntimeError::Scenario(err) => write!(f, "Scenario parse error: {}", err),
            RuntimeError::Lookup(err) => write!(f, "Lookup source error: {}", err),
            RuntimeError::HttpClient(err) => write!(f, "HTTP client error: {}", err),
            RuntimeError::Render(err) => write!(f, "Document render error: {}", err),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<SchemaError> for RuntimeError {
    fn from(err: SchemaError) -> Self {
        RuntimeError::Schema(err)
    }
}

impl From<LookupError> for RuntimeError {
    fn from(err: LookupError) -> Self {
        RuntimeError::Lookup(err)
    }
}

/// Output of one scenario run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub lines: Vec<Value>,
    pub document: Document,
}

impl RunReport {
    pub fn json_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.to_json(JsonMode::Inline))
            .collect()
    }

    pub fn document_yaml(&self) -> Result<String, RuntimeError> {
        serde_yaml::to_string(&self.document).map_err(RuntimeError::Render)
    }
}

async fn read_file(path: &str) -> Result<String, RuntimeError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| RuntimeError::ReadFile(path.to_string(), err))
}

/// Loads a schema and a scenario, mounts a session and replays the events.
#[derive(Debug, Default)]
pub struct FormflowRuntime {
    config: Option<FormConfig>,
    events: Vec<ScenarioEvent>,
}

impl FormflowRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_schema_str(&mut self, schema: &str) -> Result<&mut Self, RuntimeError> {
        self.config = Some(FormConfig::from_yaml_str(schema)?);
        Ok(self)
    }

    pub fn set_events_str(&mut self, events: &str) -> Result<&mut Self, RuntimeError> {
        self.events = parse_events(events).map_err(RuntimeError::Scenario)?;
        Ok(self)
    }

    pub fn set_events(&mut self, events: Vec<ScenarioEvent>) -> &mut Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> Option<&FormConfig> {
        self.config.as_ref()
    }

    /// Registers the form against `source` and replays the events.
    pub async fn run(&self, source: &dyn LookupSource) -> Result<RunReport, RuntimeError> {
        let config = self.config.clone().unwrap_or_default();

        let mut session = FormSession::register(&config, Document::render(&config), source).await;
        let lines = run_events(&mut session, &self.events);

        Ok(RunReport {
            lines,
            document: session.document().clone(),
        })
    }

    /// Runs the files and lookup target named by `settings`.
    pub async fn run_settings(settings: &Settings) -> Result<RunReport, RuntimeError> {
        let mut runtime = Self::new();
        runtime.set_schema_str(&read_file(&settings.schema_path).await?)?;

        if let Some(events_path) = &settings.events_path {
            runtime.set_events_str(&read_file(events_path).await?)?;
        }

        match &settings.lookup {
            LookupTarget::Http(url) => {
                let source = HttpLookupSource::new(url, settings.lookup_timeout)
                    .map_err(RuntimeError::HttpClient)?;
                runtime.run(&source).await
            }
            LookupTarget::File(path) => {
                let source = FileLookupSource::load(path).await?;
                runtime.run(&source).await
            }
            LookupTarget::None => runtime.run(&NoLookupSource).await,
        }
    }
}
