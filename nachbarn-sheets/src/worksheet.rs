//! One worksheet of a spreadsheet, used as the activity table.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::OnceCell;

use nachbarn_core::config::GoogleConfig;
use nachbarn_core::{NachbarnError, NachbarnResult, RowStore};

use crate::client::{SheetsClient, a1_range, column_letters};

const HEADER_RANGE: &str = "1:1";
const DATA_RANGE: &str = "A2:Z";

fn store_error(err: anyhow::Error) -> NachbarnError {
    NachbarnError::Store(format!("{:#}", err))
}

pub struct Worksheet {
    client: SheetsClient,
    title: String,
    sheet_id: OnceCell<i64>,
}

impl Worksheet {
    pub fn new(google: &GoogleConfig, spreadsheet_id: &str, title: &str) -> Result<Self> {
        Ok(Worksheet {
            client: SheetsClient::new(google, spreadsheet_id)?,
            title: title.to_string(),
            sheet_id: OnceCell::new(),
        })
    }

    fn range(&self, range: &str) -> String {
        a1_range(&self.title, range)
    }

    /// `A{row}` through the last of `width` columns.
    fn row_range(&self, table_row: u32, width: usize) -> String {
        let last = column_letters(width.saturating_sub(1));
        self.range(&format!("A{0}:{1}{0}", table_row, last))
    }

    async fn sheet_id(&self) -> Result<i64> {
        self.sheet_id
            .get_or_try_init(|| self.client.sheet_id(&self.title))
            .await
            .copied()
    }
}

#[async_trait]
impl RowStore for Worksheet {
    async fn header(&self) -> NachbarnResult<Vec<String>> {
        let rows = self
            .client
            .get_values(&self.range(HEADER_RANGE))
            .await
            .map_err(store_error)?;

        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn write_header(&self, cells: &[String]) -> NachbarnResult<()> {
        self.client
            .update_row(&self.row_range(1, cells.len()), cells)
            .await
            .map_err(store_error)
    }

    async fn rows(&self) -> NachbarnResult<Vec<Vec<String>>> {
        self.client
            .get_values(&self.range(DATA_RANGE))
            .await
            .map_err(store_error)
    }

    async fn update_row(&self, table_row: u32, cells: &[String]) -> NachbarnResult<()> {
        self.client
            .update_row(&self.row_range(table_row, cells.len()), cells)
            .await
            .map_err(store_error)
    }

    async fn append_row(&self, cells: &[String]) -> NachbarnResult<()> {
        let table = format!("A1:{}", column_letters(cells.len().saturating_sub(1)));
        self.client
            .append_row(&self.range(&table), cells)
            .await
            .map_err(store_error)
    }

    async fn delete_row(&self, table_row: u32) -> NachbarnResult<()> {
        let sheet_id = self.sheet_id().await.map_err(store_error)?;
        self.client
            .delete_row(sheet_id, table_row)
            .await
            .map_err(store_error)
    }
}
