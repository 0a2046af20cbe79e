//! Turning loaded records into calendar widget events.

use serde::Serialize;
use tracing::debug;

use crate::datetime::{combine_cells, format_iso};
use crate::participants::pick_color;
use crate::record::LoadedRecord;

/// Shown when a record has neither an activity name nor participants.
const UNTITLED: &str = "Activity";

/// An event object as the calendar widget expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Table row number of the record.
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub text_color: &'static str,
    pub extended_props: ExtendedProps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedProps {
    pub notes: String,
    pub participants: Vec<String>,
}

pub fn event_title(activity: &str, participants: &[String]) -> String {
    if participants.is_empty() {
        if activity.is_empty() {
            UNTITLED.to_string()
        } else {
            activity.to_string()
        }
    } else {
        format!("{} • {}", activity, participants.join(" & "))
    }
}

/// Project one record; `None` if its start cannot be parsed.
pub fn project(record: &LoadedRecord) -> Option<CalendarEvent> {
    let row = &record.row;

    let Some(start) = combine_cells(&row.start_date, &row.start_time) else {
        debug!(
            table_row = record.position.table_row(),
            start_date = %row.start_date,
            start_time = %row.start_time,
            "Skipping record with unparsable start"
        );
        return None;
    };
    let end = combine_cells(&row.end_date, &row.end_time);

    let participants = row.participant_list();
    let colors = pick_color(&participants);

    Some(CalendarEvent {
        id: record.position.table_row().to_string(),
        title: event_title(&row.activity, &participants),
        start: format_iso(start),
        end: end.map(format_iso),
        background_color: colors.background,
        border_color: colors.border,
        text_color: colors.text,
        extended_props: ExtendedProps {
            notes: row.notes.clone(),
            participants,
        },
    })
}

/// Project records in the order given, skipping unparsable ones.
pub fn project_all(records: &[LoadedRecord]) -> Vec<CalendarEvent> {
    records.iter().filter_map(project).collect()
}
