use crate::value::FieldValue;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt::Display;
use tokio::sync::watch;

pub type Record = IndexMap<String, FieldValue>;
pub type LookupTable = Vec<Record>;

#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    Request(String),
    Status { status: u16, message: String },
    Decode(String),
    NotFound(String),
    Cancelled(String),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Request(err) => write!(f, "Request error: {}", err),
            LookupError::Status { status, message } => write!(f, "{} ({})", message, status),
            LookupError::Decode(err) => write!(f, "Decode error: {}", err),
            LookupError::NotFound(name) => write!(f, "Lookup table not found: {}", name),
            LookupError::Cancelled(name) => write!(f, "Lookup of {} cancelled", name),
        }
    }
}

impl std::error::Error for LookupError {}

/// Where lookup tables come from.
#[async_trait]
pub trait LookupSource: Send + Sync {
    async fn fetch(&self, map_name: &str) -> Result<LookupTable, LookupError>;
}

/// Fetched lookup tables of one form session, at most one entry per name.
#[derive(Debug, Default, Clone)]
pub struct LookupCache {
    tables: HashMap<String, LookupTable>,
}

async fn torn_down(signal: &mut watch::Receiver<bool>) {
    // a dropped sender can no longer tear anything down
    if signal.wait_for(|closed| *closed).await.is_err() {
        std::future::pending::<()>().await;
    }
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, map_name: &str) -> bool {
        self.tables.contains_key(map_name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn insert(&mut self, map_name: &str, table: LookupTable) {
        self.tables.insert(map_name.to_string(), table);
    }

    /// Fetches `map_name` unless it is already cached. A failed fetch leaves
    /// the entry absent.
    pub async fn ensure_loaded(
        &mut self,
        map_name: &str,
        source: &dyn LookupSource,
        teardown: &mut watch::Receiver<bool>,
    ) -> Result<(), LookupError> {
        if self.is_loaded(map_name) {
            return Ok(());
        }

        if *teardown.borrow() {
            return Err(LookupError::Cancelled(map_name.to_string()));
        }

        log::debug!("Fetching lookup table {}", map_name);

        let table = tokio::select! {
            result = source.fetch(map_name) => result?,
            _ = torn_down(teardown) => {
                return Err(LookupError::Cancelled(map_name.to_string()));
            }
        };

        log::debug!("Lookup table {} loaded with {} records", map_name, table.len());
        self.tables.insert(map_name.to_string(), table);

        Ok(())
    }

    /// Distinct values of `target_column` over the records matching every
    /// filter, first-seen order. Records without a target value are skipped.
    pub fn query(
        &self,
        map_name: &str,
        filters: &IndexMap<String, FieldValue>,
        target_column: &str,
    ) -> Vec<FieldValue> {
        let table = match self.tables.get(map_name) {
            Some(table) => table,
            None => return Vec::new(),
        };

        let mut result: Vec<FieldValue> = Vec::new();

        for record in table {
            let target = match record.get(target_column) {
                Some(target) if !target.is_blank_cell() => target,
                _ => continue,
            };

            let matches = filters.iter().all(|(column, value)| {
                record
                    .get(column)
                    .map(|cell| cell.strict_eq(value))
                    .unwrap_or(false)
            });

            if matches && !result.iter().any(|seen| seen.strict_eq(target)) {
                result.push(target.clone());
            }
        }

        result
    }
}
