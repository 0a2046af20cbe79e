//! In-process row store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::RowStore;
use crate::error::{NachbarnError, NachbarnResult};

#[derive(Default)]
struct Sheet {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    header_reads: usize,
    header_writes: usize,
    mutations: usize,
}

/// Rows kept in memory. Backs `backend = "memory"` and the tests.
#[derive(Default)]
pub struct MemoryStore {
    sheet: Mutex<Sheet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        MemoryStore {
            sheet: Mutex::new(Sheet {
                header,
                rows,
                ..Sheet::default()
            }),
        }
    }

    fn sheet(&self) -> MutexGuard<'_, Sheet> {
        self.sheet.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn header_cells(&self) -> Vec<String> {
        self.sheet().header.clone()
    }

    pub fn data_rows(&self) -> Vec<Vec<String>> {
        self.sheet().rows.clone()
    }

    /// Number of times the header row was read.
    pub fn header_reads(&self) -> usize {
        self.sheet().header_reads
    }

    /// Number of times the header row was rewritten.
    pub fn header_writes(&self) -> usize {
        self.sheet().header_writes
    }

    /// Number of data-row writes (update, append, delete).
    pub fn mutations(&self) -> usize {
        self.sheet().mutations
    }

    fn data_index(sheet: &Sheet, table_row: u32) -> NachbarnResult<usize> {
        table_row
            .checked_sub(2)
            .map(|i| i as usize)
            .filter(|i| *i < sheet.rows.len())
            .ok_or_else(|| NachbarnError::Store(format!("table row {} does not exist", table_row)))
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn header(&self) -> NachbarnResult<Vec<String>> {
        let mut sheet = self.sheet();
        sheet.header_reads += 1;
        Ok(sheet.header.clone())
    }

    async fn write_header(&self, cells: &[String]) -> NachbarnResult<()> {
        let mut sheet = self.sheet();
        sheet.header = cells.to_vec();
        sheet.header_writes += 1;
        Ok(())
    }

    async fn rows(&self) -> NachbarnResult<Vec<Vec<String>>> {
        Ok(self.data_rows())
    }

    async fn update_row(&self, table_row: u32, cells: &[String]) -> NachbarnResult<()> {
        let mut sheet = self.sheet();
        let index = Self::data_index(&sheet, table_row)?;
        sheet.rows[index] = cells.to_vec();
        sheet.mutations += 1;
        Ok(())
    }

    async fn append_row(&self, cells: &[String]) -> NachbarnResult<()> {
        let mut sheet = self.sheet();
        sheet.rows.push(cells.to_vec());
        sheet.mutations += 1;
        Ok(())
    }

    async fn delete_row(&self, table_row: u32) -> NachbarnResult<()> {
        let mut sheet = self.sheet();
        let index = Self::data_index(&sheet, table_row)?;
        sheet.rows.remove(index);
        sheet.mutations += 1;
        Ok(())
    }
}
