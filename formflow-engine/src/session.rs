use crate::control::ControlError;
use crate::dependency::{
    capture_pending, update_linked_options, update_visibility, PendingFields, VisibilityChange,
};
use crate::document::{container_id, extract_value, Document};
use crate::group::ConditionGroup;
use crate::lookup::{LookupCache, LookupError, LookupSource};
use crate::schema::{FieldConfig, FormConfig};
use crate::validation::{validate_form, ValidationError, ValidationReport, ValidationRules};
use crate::value::FieldValue;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::watch;
use valu3::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    UnknownField(String),
    MissingContainer(String),
    Control(ControlError),
    TornDown,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownField(key) => write!(f, "Unknown field: {}", key),
            SessionError::MissingContainer(id) => write!(f, "Container not displayed: {}", id),
            SessionError::Control(err) => write!(f, "Control error: {}", err),
            SessionError::TornDown => write!(f, "Form session was torn down"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ControlError> for SessionError {
    fn from(err: ControlError) -> Self {
        SessionError::Control(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Dismissible message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: String) -> Self {
        Self {
            level: NoticeLevel::Error,
            message,
        }
    }
}

impl ToValueBehavior for Notice {
    fn to_value(&self) -> Value {
        let level = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };

        let mut map = HashMap::new();
        map.insert("level".to_string(), level.to_value());
        map.insert("message".to_string(), self.message.to_value());
        map.to_value()
    }
}

/// Cloneable switch that unmounts a session, cancelling any lookup fetch
/// still in flight.
#[derive(Debug, Clone)]
pub struct TeardownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl TeardownHandle {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);

        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn teardown(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_torn_down(&self) -> bool {
        *self.sender.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for TeardownHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ChangeOutcome {
    pub field: String,
    pub value: FieldValue,
    pub visibility: Vec<VisibilityChange>,
    pub options_updated: Vec<String>,
}

impl ToValueBehavior for ChangeOutcome {
    fn to_value(&self) -> Value {
        let visibility: HashMap<String, Value> = self
            .visibility
            .iter()
            .map(|change| (change.field.clone(), change.visibility.to_value()))
            .collect();

        let options_updated: Vec<Value> = self
            .options_updated
            .iter()
            .map(|field| field.to_value())
            .collect();

        let mut map = HashMap::new();
        map.insert("change".to_string(), self.field.to_value());
        map.insert("value".to_string(), self.value.to_value());
        map.insert("visibility".to_string(), visibility.to_value());
        map.insert("options_updated".to_string(), options_updated.to_value());
        map.to_value()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SubmitOutcome {
    Proceed,
    Vetoed(Vec<ValidationError>),
}

impl SubmitOutcome {
    pub fn is_proceed(&self) -> bool {
        matches!(self, SubmitOutcome::Proceed)
    }
}

impl ToValueBehavior for SubmitOutcome {
    fn to_value(&self) -> Value {
        let mut map = HashMap::new();

        match self {
            SubmitOutcome::Proceed => {
                map.insert("submit".to_string(), "proceed".to_value());
            }
            SubmitOutcome::Vetoed(errors) => {
                map.insert("submit".to_string(), "vetoed".to_value());
                map.insert(
                    "errors".to_string(),
                    errors
                        .iter()
                        .map(|error| error.to_value())
                        .collect::<Vec<Value>>()
                        .to_value(),
                );
            }
        }

        map.to_value()
    }
}

/// One mounted form: field table, parsed condition groups, lookup cache and
/// the document it drives.
#[derive(Debug)]
pub struct FormSession {
    form_id: String,
    fields: IndexMap<String, FieldConfig>,
    display_rules: IndexMap<String, Vec<ConditionGroup>>,
    validation_rules: ValidationRules,
    pending: PendingFields,
    lookup: LookupCache,
    document: Document,
    notices: Vec<Notice>,
    teardown: TeardownHandle,
}

fn parse_groups(
    owner: &str,
    raw_groups: &[crate::group::ConditionGroupRaw],
    fields: &IndexMap<String, FieldConfig>,
) -> Vec<ConditionGroup> {
    raw_groups
        .iter()
        .map(|raw| {
            if fields.contains_key(&raw.field) {
                ConditionGroup::from(raw)
            } else {
                log::warn!("No config for: {} (referenced by {})", raw.field, owner);
                ConditionGroup::disabled(&raw.field)
            }
        })
        .collect()
}

impl FormSession {
    pub async fn register(
        config: &FormConfig,
        document: Document,
        source: &dyn LookupSource,
    ) -> Self {
        Self::register_with(config, document, source, TeardownHandle::new()).await
    }

    /// Registers a form whose teardown is controlled by `teardown`, so it can
    /// be cancelled while lookup tables are still loading.
    pub async fn register_with(
        config: &FormConfig,
        document: Document,
        source: &dyn LookupSource,
        teardown: TeardownHandle,
    ) -> Self {
        for issue in config.lint() {
            log::warn!("Schema issue in {}: {}", config.form_id, issue);
        }

        let fields = config.field_table();
        let mut display_rules = IndexMap::new();
        let mut validation_rules = ValidationRules::new();

        for (key, field) in &fields {
            if let Some(raw_groups) = &field.to_display_conditions {
                display_rules.insert(key.clone(), parse_groups(key, raw_groups, &fields));
            }

            if let Some(raw_groups) = &field.to_validate_conditions {
                validation_rules.insert(key.clone(), parse_groups(key, raw_groups, &fields));
            }
        }

        let mut session = Self {
            form_id: config.form_id.clone(),
            fields,
            display_rules,
            validation_rules,
            pending: PendingFields::new(),
            lookup: LookupCache::new(),
            document,
            notices: Vec::new(),
            teardown,
        };

        session.load_lookup_tables(config, source).await;

        for groups in session.display_rules.values() {
            capture_pending(&session.document, groups, &mut session.pending);
        }

        for (key, groups) in &session.display_rules {
            update_visibility(&mut session.document, &session.pending, key, groups);
        }

        log::debug!("Form {} registered with {} fields", session.form_id, session.fields.len());

        session
    }

    async fn load_lookup_tables(&mut self, config: &FormConfig, source: &dyn LookupSource) {
        let mut receiver = self.teardown.subscribe();

        for map_name in config.map_names() {
            match self
                .lookup
                .ensure_loaded(&map_name, source, &mut receiver)
                .await
            {
                Ok(()) => {}
                Err(LookupError::Cancelled(name)) => {
                    log::debug!("Loading of {} cancelled by teardown", name);
                    return;
                }
                Err(err) => {
                    log::error!("Failed to load lookup table {}: {}", map_name, err);
                    self.notices.push(Notice::error(format!(
                        "Failed to load options for {}: {}",
                        map_name, err
                    )));
                }
            }
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn fields(&self) -> &IndexMap<String, FieldConfig> {
        &self.fields
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn lookup(&self) -> &LookupCache {
        &self.lookup
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    pub fn teardown(&self) {
        self.teardown.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_torn_down()
    }

    /// Current value of a displayed field.
    pub fn value_of(&self, field_key: &str) -> Option<FieldValue> {
        self.document.field(field_key).map(extract_value)
    }

    /// Applies user input to a field, then runs its change handling.
    pub fn change(&mut self, field_key: &str, value: &FieldValue) -> Result<ChangeOutcome, SessionError> {
        if self.is_torn_down() {
            return Err(SessionError::TornDown);
        }

        if !self.fields.contains_key(field_key) {
            return Err(SessionError::UnknownField(field_key.to_string()));
        }

        let control = self
            .document
            .field_mut(field_key)
            .and_then(|container| container.control.as_mut())
            .ok_or_else(|| SessionError::MissingContainer(container_id(field_key)))?;

        control.set_value(value)?;

        self.dispatch_change(field_key)
    }

    /// Change handling for one governing field: visibility first, then
    /// linked options.
    pub fn dispatch_change(&mut self, field_key: &str) -> Result<ChangeOutcome, SessionError> {
        if self.is_torn_down() {
            return Err(SessionError::TornDown);
        }

        let value = self
            .value_of(field_key)
            .ok_or_else(|| SessionError::MissingContainer(container_id(field_key)))?;

        let visibility = match self.display_rules.get(field_key) {
            Some(groups) => update_visibility(&mut self.document, &self.pending, field_key, groups),
            None => Vec::new(),
        };

        let options_updated =
            update_linked_options(&mut self.document, &self.lookup, &self.fields, field_key);

        Ok(ChangeOutcome {
            field: field_key.to_string(),
            value,
            visibility,
            options_updated,
        })
    }

    pub fn validate(&mut self) -> ValidationReport {
        validate_form(&mut self.document, &self.fields, &self.validation_rules)
    }

    /// Validation pass run before submission; any error vetoes it.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        if self.is_torn_down() {
            return Err(SessionError::TornDown);
        }

        let report = self.validate();

        if report.is_valid() {
            Ok(SubmitOutcome::Proceed)
        } else {
            log::debug!("Submission of {} vetoed: {} errors", self.form_id, report.errors.len());
            Ok(SubmitOutcome::Vetoed(report.errors))
        }
    }
}
