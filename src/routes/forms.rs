//! Add and Edit form endpoints

use axum::{
    Extension, Json, Router,
    extract::State,
    routing::get,
};
use serde::Serialize;
use tracing::info;

use nachbarn_core::form::{AddOutcome, EditAction, EditForm, EditOutcome};
use nachbarn_core::{ActivityInput, NachbarnError};

use crate::routes::AppError;
use crate::routes::auth::CurrentSession;
use crate::session::today;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/add", get(add_draft).post(submit_add))
        .route("/api/edit", get(current_edit).post(act_on_edit))
}

#[derive(Serialize)]
pub struct AddResponse {
    #[serde(flatten)]
    pub outcome: AddOutcome,
    /// Values the Add form shows next.
    pub form: ActivityInput,
}

#[derive(Serialize)]
pub struct EditResponse {
    pub outcome: EditOutcome,
    /// Whether the calendar has to reload its events.
    pub refresh: bool,
}

/// GET /api/add - Values the Add form currently shows
async fn add_draft(Extension(session): Extension<CurrentSession>) -> Json<ActivityInput> {
    Json(session.handle.lock().await.add_form.draft().clone())
}

/// POST /api/add - Submit the Add form
async fn submit_add(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(input): Json<ActivityInput>,
) -> Result<Json<AddResponse>, AppError> {
    let mut current = session.handle.lock().await;
    let outcome = current.add_form.submit(input, &state.table, today()).await?;

    if outcome == AddOutcome::Added {
        info!("Activity added");
    }

    Ok(Json(AddResponse {
        outcome,
        form: current.add_form.draft().clone(),
    }))
}

/// GET /api/edit - The open Edit form, or null
async fn current_edit(Extension(session): Extension<CurrentSession>) -> Json<Option<EditForm>> {
    Json(session.handle.lock().await.edit.clone())
}

/// POST /api/edit - Save, delete or cancel the open Edit form
///
/// The form stays open when the action fails.
async fn act_on_edit(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Json(action): Json<EditAction>,
) -> Result<Json<EditResponse>, AppError> {
    let mut current = session.handle.lock().await;
    let outcome = current
        .edit
        .as_ref()
        .ok_or(NachbarnError::NoEditOpen)?
        .apply(action, &state.table)
        .await?;

    current.edit = None;

    Ok(Json(EditResponse {
        outcome,
        refresh: outcome.needs_refresh(),
    }))
}
