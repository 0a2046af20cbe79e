//! Activity records: the raw 7-cell table row and its typed form.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::datetime::{format_date, format_time};
use crate::participants::{join_participants, normalize_selection, parse_participants};

/// Canonical header labels, in column order A..G.
pub const COLUMNS: [&str; 7] = [
    "Start date",
    "Start time",
    "End date",
    "End time",
    "Activity",
    "Notes",
    "Participants",
];

/// 1-based position of a record among the data rows of the table.
///
/// This is the record's only identity. The header occupies table row 1,
/// so position 1 lives in table row 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowPosition(u32);

impl RowPosition {
    pub fn new(position: u32) -> Option<Self> {
        (position >= 1).then_some(RowPosition(position))
    }

    /// Position of the record stored at a table row number (header excluded).
    pub fn from_table_row(table_row: u32) -> Option<Self> {
        table_row.checked_sub(1).and_then(Self::new)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn table_row(self) -> u32 {
        self.0 + 1
    }
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One table row exactly as stored: seven text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub activity: String,
    pub notes: String,
    pub participants: String,
}

impl ActivityRow {
    /// Build a row from cells in column order; missing cells become empty.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Self {
        let cell = |i: usize| {
            cells
                .get(i)
                .map(|c| c.as_ref().to_string())
                .unwrap_or_default()
        };

        ActivityRow {
            start_date: cell(0),
            start_time: cell(1),
            end_date: cell(2),
            end_time: cell(3),
            activity: cell(4),
            notes: cell(5),
            participants: cell(6),
        }
    }

    pub fn into_cells(self) -> [String; 7] {
        [
            self.start_date,
            self.start_time,
            self.end_date,
            self.end_time,
            self.activity,
            self.notes,
            self.participants,
        ]
    }

    pub fn participant_list(&self) -> Vec<String> {
        parse_participants(&self.participants)
    }
}

/// A record read from the table together with the row it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedRecord {
    pub position: RowPosition,
    #[serde(flatten)]
    pub row: ActivityRow,
}

/// Typed activity fields, as entered in a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInput {
    pub start_date: NaiveDate,
    #[serde(with = "crate::datetime::hhmm")]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[serde(with = "crate::datetime::hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl ActivityInput {
    /// Format for storage: ISO dates, `HH:MM` times, trimmed text, joined names.
    pub fn to_row(&self) -> ActivityRow {
        ActivityRow {
            start_date: format_date(self.start_date),
            start_time: format_time(self.start_time),
            end_date: format_date(self.end_date),
            end_time: format_time(self.end_time),
            activity: self.activity.trim().to_string(),
            notes: self.notes.trim().to_string(),
            participants: join_participants(&normalize_selection(&self.participants)),
        }
    }
}
