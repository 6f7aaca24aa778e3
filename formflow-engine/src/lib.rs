//! # formflow - A Configuration-Driven Dynamic Form Engine
//!
//! `formflow-engine` drives a form from a declarative field schema. Each field may
//! declare **display conditions** for other fields, **validation rules** checked at
//! submit time and a **choices map** linking its value to the options of other selects.
//!
//! ## Features
//! - **Conditional visibility** of dependent fields with comparison, string and array operators
//! - **Linked select options** filtered from a shared lookup table
//! - **Cross-field validation** that vetoes submission and renders inline errors
//! - **Headless document model** so forms can be driven and tested without a browser
//!
//! ## Example: Showing the employer field
//!
//! ```rust
//! use async_trait::async_trait;
//! use formflow_engine::lookup::{LookupError, LookupSource, LookupTable};
//! use formflow_engine::{Document, FieldValue, FormConfig, FormSession};
//!
//! struct NoTables;
//!
//! #[async_trait]
//! impl LookupSource for NoTables {
//!     async fn fetch(&self, map_name: &str) -> Result<LookupTable, LookupError> {
//!         Err(LookupError::NotFound(map_name.to_string()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = FormConfig::from_yaml_str(
//!         r#"
//! form_id: case_form
//! sections:
//!   - json_template:
//!       employment_status:
//!         label: Employment Status
//!         input: select
//!         choices: [unemployed, employed]
//!         to_display_conditions:
//!           - field: employer
//!             conditions:
//!               - {type: Comparison, comparison_operator: "==", compare_value: employed}
//!       employer:
//!         label: Employer
//!         input: string
//! "#,
//!     )
//!     .unwrap();
//!
//!     let mut session =
//!         FormSession::register(&config, Document::render(&config), &NoTables).await;
//!     assert!(session.value_of("employer").is_none());
//!
//!     session
//!         .change("employment_status", &FieldValue::from("employed"))
//!         .unwrap();
//!     assert_eq!(session.value_of("employer"), Some(FieldValue::from("")));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`value`] - Dynamic field values and their loose-typed coercions.
//! - [`control`] - Primary input controls and value extraction.
//! - [`document`] - Field containers of a rendered form.
//! - [`condition`] - Atomic conditions and their operators.
//! - [`group`] - Condition groups combined with AND/OR.
//! - [`rule`] - Validation rules attached to condition groups.
//! - [`lookup`] - Per-session lookup table cache and its fetch seam.
//! - [`dependency`] - Visibility and linked options of dependent fields.
//! - [`validation`] - Submit-time validation pass.
//! - [`schema`] - Field schema model and schema lint.
//! - [`session`] - Form registration and event handling.
pub mod condition;
pub mod control;
pub mod dependency;
pub mod document;
pub mod group;
pub mod lookup;
pub mod rule;
pub mod schema;
pub mod session;
pub mod validation;
pub mod value;

pub use document::Document;
pub use lookup::{LookupCache, LookupSource};
pub use schema::FormConfig;
pub use session::{FormSession, SubmitOutcome, TeardownHandle};
pub use value::FieldValue;
