//! Row-oriented access to the activity table.
//!
//! `RowStore` is the seam to whatever actually holds the rows (a Google
//! Sheets worksheet in production, memory in tests). `Table` layers the
//! fixed 7-column schema on top of it.

mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{NachbarnError, NachbarnResult};
use crate::record::{ActivityRow, COLUMNS, LoadedRecord, RowPosition};

/// A remote table addressed by 1-based table row numbers (row 1 is the header).
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Cells of table row 1. Empty if the table is empty.
    async fn header(&self) -> NachbarnResult<Vec<String>>;

    /// Overwrite table row 1.
    async fn write_header(&self, cells: &[String]) -> NachbarnResult<()>;

    /// All rows after the header, in table order. Short rows are not padded.
    async fn rows(&self) -> NachbarnResult<Vec<Vec<String>>>;

    /// Overwrite one table row from column A onwards.
    async fn update_row(&self, table_row: u32, cells: &[String]) -> NachbarnResult<()>;

    /// Add a row after the last one.
    async fn append_row(&self, cells: &[String]) -> NachbarnResult<()>;

    /// Remove one table row; later rows move up.
    async fn delete_row(&self, table_row: u32) -> NachbarnResult<()>;
}

/// Where each of the seven columns sits in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    indices: [usize; 7],
    width: usize,
}

impl ColumnLayout {
    fn canonical() -> Self {
        ColumnLayout {
            indices: [0, 1, 2, 3, 4, 5, 6],
            width: COLUMNS.len(),
        }
    }

    /// Layout of a header holding every canonical label, `None` otherwise.
    fn of(header: &[String]) -> Option<Self> {
        let mut indices = [0; 7];
        for (slot, column) in indices.iter_mut().zip(COLUMNS) {
            let wanted = normalize_label(column);
            *slot = header.iter().position(|h| normalize_label(h) == wanted)?;
        }

        let width = indices.iter().max().map_or(0, |last| last + 1);
        Some(ColumnLayout { indices, width })
    }

    fn read(&self, cells: &[String]) -> ActivityRow {
        let ordered: Vec<&str> = self
            .indices
            .iter()
            .map(|&i| cells.get(i).map(String::as_str).unwrap_or(""))
            .collect();
        ActivityRow::from_cells(&ordered)
    }

    /// Cells in table order. Unlabeled columns in between are left empty.
    fn place(&self, row: ActivityRow) -> Vec<String> {
        let mut cells = vec![String::new(); self.width];
        for (value, &i) in row.into_cells().into_iter().zip(&self.indices) {
            cells[i] = value;
        }
        cells
    }
}

/// The activity table with its canonical header.
#[derive(Clone)]
pub struct Table {
    store: Arc<dyn RowStore>,
}

impl Table {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Table { store }
    }

    /// Rewrite the header row unless it already holds the canonical labels.
    ///
    /// Labels are compared trimmed and case-insensitively, in any order.
    pub async fn ensure_headers(&self) -> NachbarnResult<()> {
        self.layout().await.map(|_| ())
    }

    /// Read the header once, repairing it if needed, and locate the columns.
    async fn layout(&self) -> NachbarnResult<ColumnLayout> {
        let header = self.store.header().await?;
        if header_matches(&header) {
            if let Some(layout) = ColumnLayout::of(&header) {
                return Ok(layout);
            }
        }

        info!(found = ?header, "Repairing table header");
        let canonical: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        self.store.write_header(&canonical).await?;
        Ok(ColumnLayout::canonical())
    }

    /// Load every record, sorted by start date then start time.
    ///
    /// The header is repaired first. Each record keeps the row position it
    /// was read from.
    pub async fn load_all(&self) -> NachbarnResult<Vec<LoadedRecord>> {
        let layout = self.layout().await?;
        let rows = self.store.rows().await?;

        let mut records = Vec::with_capacity(rows.len());
        for (index, cells) in rows.into_iter().enumerate() {
            let position = u32::try_from(index + 1)
                .ok()
                .and_then(RowPosition::new)
                .ok_or_else(|| NachbarnError::Store(format!("row index {} out of range", index)))?;

            records.push(LoadedRecord {
                position,
                row: layout.read(&cells),
            });
        }

        // Stable: equal keys keep table order.
        records.sort_by(|a, b| {
            (&a.row.start_date, &a.row.start_time).cmp(&(&b.row.start_date, &b.row.start_time))
        });

        debug!(count = records.len(), "Loaded activity records");
        Ok(records)
    }

    pub async fn update_row(&self, position: RowPosition, row: ActivityRow) -> NachbarnResult<()> {
        let layout = self.layout().await?;
        info!(table_row = position.table_row(), "Updating activity");
        self.store
            .update_row(position.table_row(), &layout.place(row))
            .await
    }

    /// Append a record; an empty table gets its header first.
    pub async fn append_row(&self, row: ActivityRow) -> NachbarnResult<()> {
        let layout = self.layout().await?;
        info!(activity = %row.activity, "Appending activity");
        self.store.append_row(&layout.place(row)).await
    }

    pub async fn delete_row(&self, position: RowPosition) -> NachbarnResult<()> {
        info!(table_row = position.table_row(), "Deleting activity");
        self.store.delete_row(position.table_row()).await
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

fn header_matches(header: &[String]) -> bool {
    let cleaned: Vec<String> = header
        .iter()
        .map(|h| normalize_label(h))
        .filter(|h| !h.is_empty())
        .collect();

    if cleaned.len() != COLUMNS.len() {
        return false;
    }

    let mut found = cleaned;
    found.sort();
    found.dedup();

    let mut expected: Vec<String> = COLUMNS.iter().map(|c| normalize_label(c)).collect();
    expected.sort();

    found == expected
}
