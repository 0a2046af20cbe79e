use serde::{Deserialize, Serialize};

use crate::datetime::{parse_stored_date, parse_stored_time};
use crate::error::NachbarnResult;
use crate::participants::{EVERYONE, parse_participants};
use crate::record::{ActivityInput, LoadedRecord, RowPosition};
use crate::store::Table;

/// The Edit form for one existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditForm {
    pub position: RowPosition,
    /// Table row number, the id the calendar knows the event by.
    pub event_id: String,
    pub fields: ActivityInput,
}

/// What the user chose to do with the open Edit form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditAction {
    Save(ActivityInput),
    Delete,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Saved,
    Deleted,
    Canceled,
}

impl EditOutcome {
    /// Whether the calendar has to be reloaded afterwards.
    pub fn needs_refresh(self) -> bool {
        !matches!(self, EditOutcome::Canceled)
    }
}

impl EditForm {
    /// Pre-fill from a stored record.
    ///
    /// Stored times must be exactly `HH:MM`; anything else is a parse error.
    pub fn open(record: &LoadedRecord) -> NachbarnResult<Self> {
        let row = &record.row;

        let mut participants = parse_participants(&row.participants);
        if participants.is_empty() {
            participants.push(EVERYONE.to_string());
        }

        let fields = ActivityInput {
            start_date: parse_stored_date(&row.start_date)?,
            start_time: parse_stored_time(&row.start_time)?,
            end_date: parse_stored_date(&row.end_date)?,
            end_time: parse_stored_time(&row.end_time)?,
            activity: row.activity.clone(),
            notes: row.notes.clone(),
            participants,
        };

        Ok(EditForm {
            position: record.position,
            event_id: record.position.table_row().to_string(),
            fields,
        })
    }

    /// Carry out one action against the table.
    ///
    /// Save overwrites all seven cells without validation.
    pub async fn apply(&self, action: EditAction, table: &Table) -> NachbarnResult<EditOutcome> {
        match action {
            EditAction::Save(fields) => {
                table.update_row(self.position, fields.to_row()).await?;
                Ok(EditOutcome::Saved)
            }
            EditAction::Delete => {
                table.delete_row(self.position).await?;
                Ok(EditOutcome::Deleted)
            }
            EditAction::Cancel => Ok(EditOutcome::Canceled),
        }
    }
}
