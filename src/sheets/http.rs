use crate::config::StoreConfig;
use crate::errors::{Error, Result};
use crate::sheets::api::SheetsApi;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Production `SheetsApi` over the spreadsheet service's REST API.
///
/// The underlying HTTP client (connection pool included) is built once and
/// owned here for the life of the store context; acquiring it is not
/// something to repeat per call.
pub struct HttpSheets {
    client: Client,
    spreadsheet_id: String,
    api_token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

impl HttpSheets {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(Error::Config("spreadsheet id is empty".into()));
        }
        if config.api_token.trim().is_empty() {
            return Err(Error::Config("API token is empty".into()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            spreadsheet_id: config.spreadsheet_id.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}{}", API_BASE, self.spreadsheet_id, suffix)
    }

    /// Maps a non-success response to `Error::Remote`, carrying the status
    /// and the service's error text so the retry executor can classify it.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable error body>".into());
        Err(Error::Remote {
            status: Some(status.as_u16()),
            message,
        })
    }

    /// Unformatted values arrive as JSON scalars; normalize them into the
    /// string cells the rest of the crate works with.
    fn cell_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl SheetsApi for HttpSheets {
    #[instrument(skip(self))]
    async fn values_get(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.url(&format!("/values/{range}"));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("valueRenderOption", "UNFORMATTED_VALUE")])
            .send()
            .await?;
        let body: ValueRange = Self::check(response).await?.json().await?;
        let rows: Vec<Vec<String>> = body
            .values
            .iter()
            .map(|row| row.iter().map(Self::cell_to_string).collect())
            .collect();
        debug!("Fetched {} rows from {}", rows.len(), range);
        Ok(rows)
    }

    #[instrument(skip(self, rows))]
    async fn values_update(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let url = self.url(&format!("/values/{range}"));
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": rows }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, rows))]
    async fn values_append(&self, range: &str, rows: Vec<Vec<String>>) -> Result<()> {
        let url = self.url(&format!("/values/{range}:append"));
        let row_count = rows.len();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        Self::check(response).await?;
        debug!("Appended {} rows to {}", row_count, range);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn values_clear(&self, range: &str) -> Result<()> {
        let url = self.url(&format!("/values/{range}:clear"));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn sheet_titles(&self) -> Result<Vec<String>> {
        let url = self.url("");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(response).await?.json().await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    #[instrument(skip(self))]
    async fn add_sheet(&self, title: &str) -> Result<()> {
        let url = self.url(":batchUpdate");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&json!({
                "requests": [
                    { "addSheet": { "properties": { "title": title } } }
                ]
            }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unformatted_cells_normalize_to_strings() {
        assert_eq!(HttpSheets::cell_to_string(&json!("text")), "text");
        assert_eq!(HttpSheets::cell_to_string(&json!(42.5)), "42.5");
        assert_eq!(HttpSheets::cell_to_string(&json!(7)), "7");
        assert_eq!(HttpSheets::cell_to_string(&json!(true)), "1");
        assert_eq!(HttpSheets::cell_to_string(&Value::Null), "");
    }

    #[test]
    fn blank_credentials_are_config_errors() {
        let config = StoreConfig {
            spreadsheet_id: String::new(),
            api_token: "token".into(),
            tuning: Default::default(),
        };
        assert!(matches!(HttpSheets::new(&config), Err(Error::Config(_))));
    }
}
