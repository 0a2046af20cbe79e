//! Core types for the Nachbarn shared calendar.
//!
//! - `record` and `participants` map table rows to activities
//! - `store` reads and writes rows through the `RowStore` seam
//! - `projection` and `widget` feed the calendar widget
//! - `form` and `interaction` implement the user flows

pub mod config;
pub mod datetime;
pub mod error;
pub mod form;
pub mod interaction;
pub mod participants;
pub mod projection;
pub mod record;
pub mod store;
pub mod widget;

pub use error::{NachbarnError, NachbarnResult};
pub use record::{ActivityInput, ActivityRow, COLUMNS, LoadedRecord, RowPosition};
pub use store::{MemoryStore, RowStore, Table};
