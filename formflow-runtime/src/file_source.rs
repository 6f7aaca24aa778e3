use async_trait::async_trait;
use formflow_engine::lookup::{LookupError, LookupSource, LookupTable};
use indexmap::IndexMap;

/// Lookup tables read from a local `{<map_name>: [records...]}` file.
#[derive(Debug, Clone, Default)]
pub struct FileLookupSource {
    tables: IndexMap<String, LookupTable>,
}

impl FileLookupSource {
    pub fn parse(source: &str) -> Result<Self, LookupError> {
        let tables: IndexMap<String, LookupTable> =
            serde_yaml::from_str(source).map_err(|err| LookupError::Decode(err.to_string()))?;

        Ok(Self { tables })
    }

    pub async fn load(path: &str) -> Result<Self, LookupError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| LookupError::Request(format!("{}: {}", path, err)))?;

        Self::parse(&content)
    }

    pub fn names(&self) -> Vec<&String> {
        self.tables.keys().collect()
    }
}

#[async_trait]
impl LookupSource for FileLookupSource {
    async fn fetch(&self, map_name: &str) -> Result<LookupTable, LookupError> {
        self.tables
            .get(map_name)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(map_name.to_string()))
    }
}

/// Source used when no lookup target is configured; every fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookupSource;

#[async_trait]
impl LookupSource for NoLookupSource {
    async fn fetch(&self, map_name: &str) -> Result<LookupTable, LookupError> {
        Err(LookupError::NotFound(map_name.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use formflow_engine::FieldValue;

    const TABLES: &str = r#"
dict_country_city:
  - {country: US, city: Boston}
  - {country: CA, city: Toronto, code: 2}
"#;

    #[tokio::test]
    async fn test_fetch_known_table() {
        let source = FileLookupSource::parse(TABLES).unwrap();
        let table = source.fetch("dict_country_city").await.unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[1].get("code"), Some(&FieldValue::Number(2.0)));
    }

    #[tokio::test]
    async fn test_fetch_unknown_table() {
        let source = FileLookupSource::parse(TABLES).unwrap();

        assert_eq!(
            source.fetch("dict_missing").await,
            Err(LookupError::NotFound("dict_missing".to_string()))
        );
        assert!(NoLookupSource.fetch("dict_country_city").await.is_err());
    }
}
