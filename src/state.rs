use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::warn;

use nachbarn_core::config::{AppConfig, Backend};
use nachbarn_core::{MemoryStore, RowStore, Table};
use nachbarn_sheets::Worksheet;

use crate::session::Sessions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub table: Table,
    pub sessions: Sessions,
    password: Arc<str>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn RowStore> = match config.backend {
            Backend::Sheets => Arc::new(Worksheet::new(
                &config.google,
                &config.sheet_id,
                &config.worksheet_name,
            )?),
            Backend::Memory => {
                warn!("Using the in-memory backend, activities are lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let session_ttl = i64::try_from(config.session_ttl_hours)
            .ok()
            .and_then(Duration::try_hours)
            .context("session_ttl_hours is out of range")?;

        Ok(Self::with_store(store, &config.app_password, session_ttl))
    }

    pub fn with_store(store: Arc<dyn RowStore>, password: &str, session_ttl: Duration) -> Self {
        AppState {
            table: Table::new(store),
            sessions: Sessions::new(session_ttl),
            password: Arc::from(password),
        }
    }

    /// The shared secret, as configured.
    pub fn password(&self) -> &str {
        &self.password
    }
}
