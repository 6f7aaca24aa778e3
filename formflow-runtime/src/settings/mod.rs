use cli::Cli;
use envs::Envs;
use std::fmt::Display;
use std::time::Duration;

pub mod cli;
pub mod envs;

#[derive(Debug)]
pub enum SettingsError {
    Args(clap::Error),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Args(err) => write!(f, "Invalid arguments: {}", err),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Where the session's lookup tables are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    Http(String),
    File(String),
    None,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub schema_path: String,
    pub events_path: Option<String>,
    pub lookup: LookupTarget,
    pub lookup_timeout: Duration,
    pub print_document: bool,
}

impl Settings {
    pub fn try_load() -> Result<Self, SettingsError> {
        let cli = Cli::load().map_err(SettingsError::Args)?;
        let envs = Envs::load();

        Ok(Self::from_parts(cli, envs))
    }

    /// Command line values win over the environment.
    pub fn from_parts(cli: Cli, envs: Envs) -> Self {
        let lookup = match (cli.lookup_file, cli.lookup_url.or(envs.lookup_url)) {
            (Some(path), _) => LookupTarget::File(path),
            (None, Some(url)) => LookupTarget::Http(url),
            (None, None) => LookupTarget::None,
        };

        Self {
            schema_path: cli.schema_path,
            events_path: cli.events_path,
            lookup,
            lookup_timeout: Duration::from_secs(cli.timeout.unwrap_or(envs.lookup_timeout)),
            print_document: cli.print_document,
        }
    }
}
