use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::NachbarnResult;
use crate::participants::EVERYONE;
use crate::record::ActivityInput;
use crate::store::Table;

pub const MISSING_ACTIVITY_WARNING: &str = "Please enter an activity name.";

/// Result of submitting the Add form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    Rejected { warning: String },
}

/// The Add form and the values it currently shows.
///
/// Submitted values are kept until an activity is actually added, so a
/// rejected submission comes back with everything the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForm {
    draft: ActivityInput,
}

impl AddForm {
    pub fn new(today: NaiveDate) -> Self {
        AddForm {
            draft: Self::defaults(today),
        }
    }

    /// Today 09:00–10:00, nothing typed, everyone taking part.
    pub fn defaults(today: NaiveDate) -> ActivityInput {
        ActivityInput {
            start_date: today,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            end_date: today,
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            activity: String::new(),
            notes: String::new(),
            participants: vec![EVERYONE.to_string()],
        }
    }

    pub fn draft(&self) -> &ActivityInput {
        &self.draft
    }

    pub fn reset(&mut self, today: NaiveDate) {
        self.draft = Self::defaults(today);
    }

    pub fn validate(input: &ActivityInput) -> Result<(), String> {
        if input.activity.trim().is_empty() {
            return Err(MISSING_ACTIVITY_WARNING.to_string());
        }
        Ok(())
    }

    /// Keep the submitted values, validate them and append a row on success.
    ///
    /// The form resets to the defaults for `today` only after the append
    /// went through.
    pub async fn submit(
        &mut self,
        submitted: ActivityInput,
        table: &Table,
        today: NaiveDate,
    ) -> NachbarnResult<AddOutcome> {
        self.draft = submitted;

        if let Err(warning) = Self::validate(&self.draft) {
            return Ok(AddOutcome::Rejected { warning });
        }

        table.append_row(self.draft.to_row()).await?;
        self.reset(today);

        Ok(AddOutcome::Added)
    }
}
