//! Reacting to notifications emitted by the calendar widget.

use chrono::Duration;
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::datetime::{format_date, format_time, parse_instant};
use crate::error::{NachbarnError, NachbarnResult};
use crate::form::EditForm;
use crate::record::{ActivityRow, LoadedRecord, RowPosition};
use crate::store::Table;

/// The event part of a widget notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotifiedEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventPayload {
    pub event: NotifiedEvent,
}

/// Callback state posted by the widget after a user interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCallback {
    #[serde(default)]
    pub event_change: Option<EventPayload>,
    #[serde(default)]
    pub event_drop: Option<EventPayload>,
    #[serde(default)]
    pub event_resize: Option<EventPayload>,
    #[serde(default)]
    pub event_click: Option<EventPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// An event was dragged or resized to new times.
    Moved(NotifiedEvent),
    /// An event was clicked.
    Clicked(NotifiedEvent),
    None,
}

impl CalendarCallback {
    /// The interaction to handle. Time changes win over clicks.
    pub fn interaction(self) -> Interaction {
        let moved = self
            .event_change
            .or(self.event_drop)
            .or(self.event_resize);

        match (moved, self.event_click) {
            (Some(payload), _) => Interaction::Moved(payload.event),
            (None, Some(payload)) => Interaction::Clicked(payload.event),
            (None, None) => Interaction::None,
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Row position addressed by a calendar event id (a table row number).
pub fn position_from_event_id(id: &str) -> NachbarnResult<RowPosition> {
    id.trim()
        .parse::<u32>()
        .ok()
        .and_then(RowPosition::from_table_row)
        .ok_or_else(|| NachbarnError::Parse(format!("invalid event id '{}'", id)))
}

fn find_record(records: Vec<LoadedRecord>, position: RowPosition) -> NachbarnResult<LoadedRecord> {
    records
        .into_iter()
        .find(|r| r.position == position)
        .ok_or(NachbarnError::RowNotFound(position.table_row()))
}

/// Write the new times of a dragged or resized event.
///
/// Activity, notes and participants are copied unchanged from the stored
/// record. Without an end, the event lasts one hour.
pub async fn apply_time_change(table: &Table, event: &NotifiedEvent) -> NachbarnResult<RowPosition> {
    let position = position_from_event_id(&event.id)?;
    let start = parse_instant(&event.start)?;
    let end = match event.end.as_deref().map(str::trim) {
        Some(end) if !end.is_empty() => parse_instant(end)?,
        _ => start + Duration::hours(1),
    };

    let current = find_record(table.load_all().await?, position)?;

    let row = ActivityRow {
        start_date: format_date(start.date()),
        start_time: format_time(start.time()),
        end_date: format_date(end.date()),
        end_time: format_time(end.time()),
        ..current.row
    };

    info!(table_row = position.table_row(), start = %start, end = %end, "Event moved");
    table.update_row(position, row).await?;

    Ok(position)
}

/// Open the Edit form for a clicked event.
pub async fn open_edit(table: &Table, event: &NotifiedEvent) -> NachbarnResult<EditForm> {
    let position = position_from_event_id(&event.id)?;
    let record = find_record(table.load_all().await?, position)?;
    EditForm::open(&record)
}
