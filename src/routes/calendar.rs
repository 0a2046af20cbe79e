//! Calendar endpoints

use axum::{
    Extension, Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;

use nachbarn_core::form::EditForm;
use nachbarn_core::interaction::{CalendarCallback, Interaction, apply_time_change, open_edit};
use nachbarn_core::participants::ROSTER;
use nachbarn_core::projection::{CalendarEvent, project_all};
use nachbarn_core::widget::calendar_options;

use crate::routes::AppError;
use crate::routes::auth::CurrentSession;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/calendar/options", get(options))
        .route("/api/roster", get(roster))
        .route("/api/calendar/callback", post(callback))
}

/// What a widget notification led to
#[derive(Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CallbackResponse {
    Updated { event_id: String },
    EditOpened { edit: EditForm },
    Ignored,
}

/// GET /api/events - Reload and project every record
async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let records = state.table.load_all().await?;

    Ok(Json(project_all(&records)))
}

/// GET /api/calendar/options - Widget configuration
async fn options() -> Json<Value> {
    Json(calendar_options())
}

/// GET /api/roster - Names offered in the participant pickers
async fn roster() -> Json<&'static [&'static str]> {
    Json(ROSTER)
}

/// POST /api/calendar/callback - Drag, resize or click on an event
async fn callback(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(callback): Json<CalendarCallback>,
) -> Result<Json<CallbackResponse>, AppError> {
    let response = match callback.interaction() {
        Interaction::Moved(event) => {
            let position = apply_time_change(&state.table, &event).await?;
            CallbackResponse::Updated {
                event_id: position.table_row().to_string(),
            }
        }
        Interaction::Clicked(event) => {
            let edit = open_edit(&state.table, &event).await?;
            session.handle.lock().await.edit = Some(edit.clone());
            CallbackResponse::EditOpened { edit }
        }
        Interaction::None => CallbackResponse::Ignored,
    };

    Ok(Json(response))
}
