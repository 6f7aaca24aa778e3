pub mod file_source;
pub mod log;
pub mod lookup_http;
pub mod runtime;
pub mod scenario;
pub mod settings;

pub use file_source::{FileLookupSource, NoLookupSource};
pub use lookup_http::HttpLookupSource;
pub use runtime::{FormflowRuntime, RunReport, RuntimeError};
pub use scenario::ScenarioEvent;
pub use settings::{LookupTarget, Settings};
