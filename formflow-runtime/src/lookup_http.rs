use async_trait::async_trait;
use formflow_engine::lookup::{LookupError, LookupSource, LookupTable, Record};
use formflow_engine::FieldValue;
use reqwest::Client;
use std::time::Duration;
use valu3::prelude::*;

/// Fetches lookup tables from the dictionary endpoint,
/// `GET <base>/map/0/<map_name>/1-filter`.
#[derive(Debug, Clone)]
pub struct HttpLookupSource {
    client: Client,
    base_url: String,
}

impl HttpLookupSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn map_url(&self, map_name: &str) -> String {
        format!("{}/map/0/{}/1-filter", self.base_url, map_name)
    }
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.as_string()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

/// Reads `{data: [...]}`, or turns `{message, status}` into an error.
pub fn parse_lookup_response(body: &str) -> Result<LookupTable, LookupError> {
    let value =
        Value::json_to_value(body).map_err(|err| LookupError::Decode(format!("{:?}", err)))?;

    let data = match value.get("data") {
        Some(data) => data,
        None => {
            let status = match value.get("status") {
                Some(Value::Number(number)) => number
                    .to_i64()
                    .and_then(|status| u16::try_from(status).ok())
                    .unwrap_or(0),
                _ => 0,
            };

            return Err(LookupError::Status {
                status,
                message: text_of(value.get("message"))
                    .unwrap_or_else(|| "Response without data".to_string()),
            });
        }
    };

    let rows = match data {
        Value::Array(rows) => rows,
        Value::Null => return Ok(Vec::new()),
        _ => return Err(LookupError::Decode("\"data\" is not a list".to_string())),
    };

    let mut table = Vec::with_capacity(rows.values.len());

    for row in rows.values.iter() {
        match row {
            Value::Object(object) => {
                let mut record = Record::new();

                for (column, cell) in object.iter() {
                    record.insert(column.to_string(), FieldValue::from(cell));
                }

                table.push(record);
            }
            other => log::warn!("Skipping lookup row that is not an object: {}", other),
        }
    }

    Ok(table)
}

#[async_trait]
impl LookupSource for HttpLookupSource {
    async fn fetch(&self, map_name: &str) -> Result<LookupTable, LookupError> {
        let url = self.map_url(map_name);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| LookupError::Request(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| LookupError::Request(err.to_string()))?;

        if !status.is_success() {
            return match parse_lookup_response(&body) {
                Err(LookupError::Status { message, .. }) => Err(LookupError::Status {
                    status: status.as_u16(),
                    message,
                }),
                _ => Err(LookupError::Status {
                    status: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string(),
                }),
            };
        }

        parse_lookup_response(&body)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_data_rows() {
        let table = parse_lookup_response(
            r#"{"data": [{"country": "US", "city": "Boston"}, {"country": "CA", "city": null}]}"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].get("city"), Some(&FieldValue::from("Boston")));
        assert_eq!(table[1].get("city"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_parse_error_payload() {
        let result = parse_lookup_response(r#"{"message": "Map not found", "status": 404}"#);

        assert_eq!(
            result,
            Err(LookupError::Status {
                status: 404,
                message: "Map not found".to_string()
            })
        );
    }

    #[test]
    fn test_parse_out_of_range_status() {
        let result = parse_lookup_response(r#"{"message": "Broken", "status": 70000}"#);

        assert_eq!(
            result,
            Err(LookupError::Status {
                status: 0,
                message: "Broken".to_string()
            })
        );
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_lookup_response("<html>"),
            Err(LookupError::Decode(_))
        ));
    }

    #[test]
    fn test_map_url() {
        let source =
            HttpLookupSource::new("http://localhost:8000/dictionary/", Duration::from_secs(1))
                .unwrap();

        assert_eq!(
            source.map_url("dict_country_city"),
            "http://localhost:8000/dictionary/map/0/dict_country_city/1-filter"
        );
    }
}
