//! Thin client for the Google Sheets v4 REST API.

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use nachbarn_core::config::GoogleConfig;

use crate::auth::TokenSource;

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// Quote a worksheet title and attach an A1 range, e.g. `'My sheet'!A1:G1`.
pub fn a1_range(worksheet: &str, range: &str) -> String {
    format!("'{}'!{}", worksheet.replace('\'', "''"), range)
}

/// A1 column letters for a 0-based column index: 0 is `A`, 26 is `AA`.
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct SheetsClient {
    http: reqwest::Client,
    tokens: TokenSource,
    api_base: Url,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(google: &GoogleConfig, spreadsheet_id: &str) -> Result<Self> {
        let http = reqwest::Client::new();
        let api_base = Url::parse(&google.api_base)
            .with_context(|| format!("Invalid Sheets API base URL: {}", google.api_base))?;

        Ok(SheetsClient {
            tokens: TokenSource::new(http.clone(), google),
            http,
            api_base,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    fn url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Sheets API base URL cannot have a path"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(tail);
        Ok(url)
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        self.url(&[self.spreadsheet_id.as_str(), "values", range])
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send(request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", what))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Sheets {} failed ({}): {}", what, status, error_text);
        }

        Ok(response)
    }

    /// Read a range as rows of text cells. Trailing empty rows and cells are omitted.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range)?;
        let request = self
            .request(Method::GET, url)
            .await?
            .query(&[("majorDimension", "ROWS")]);

        let body: ValueRange = Self::send(request, "values.get")
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse values of {}", range))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Overwrite a range with one row of raw (unparsed) values.
    pub async fn update_row(&self, range: &str, cells: &[String]) -> Result<()> {
        let url = self.values_url(range)?;
        let request = self
            .request(Method::PUT, url)
            .await?
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [cells],
            }));

        Self::send(request, "values.update").await?;
        Ok(())
    }

    /// Append one row after the table found in `range`.
    pub async fn append_row(&self, range: &str, cells: &[String]) -> Result<()> {
        let url = self.values_url(&format!("{}:append", range))?;
        let request = self
            .request(Method::POST, url)
            .await?
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({
                "majorDimension": "ROWS",
                "values": [cells],
            }));

        Self::send(request, "values.append").await?;
        Ok(())
    }

    /// Numeric id of the worksheet with the given title.
    pub async fn sheet_id(&self, title: &str) -> Result<i64> {
        let url = self.url(&[self.spreadsheet_id.as_str()])?;
        let request = self
            .request(Method::GET, url)
            .await?
            .query(&[("fields", "sheets.properties")]);

        let spreadsheet: Spreadsheet = Self::send(request, "spreadsheets.get")
            .await?
            .json()
            .await
            .context("Failed to parse spreadsheet metadata")?;

        spreadsheet
            .sheets
            .into_iter()
            .find(|s| s.properties.title == title)
            .map(|s| s.properties.sheet_id)
            .ok_or_else(|| anyhow::anyhow!("Worksheet not found: {}", title))
    }

    /// Delete one row (1-based) of a worksheet; rows below move up.
    pub async fn delete_row(&self, sheet_id: i64, row: u32) -> Result<()> {
        let start_index = row
            .checked_sub(1)
            .ok_or_else(|| anyhow::anyhow!("Row numbers start at 1"))?;

        let batch = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.url(&[batch.as_str()])?;
        let request = self.request(Method::POST, url).await?.json(&json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start_index,
                        "endIndex": row,
                    }
                }
            }]
        }));

        Self::send(request, "batchUpdate").await?;
        Ok(())
    }
}
