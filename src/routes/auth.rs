//! Password gate and session endpoints

use axum::{
    Extension, Json, Router,
    extract::{Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::routes::AppError;
use crate::session::{SessionHandle, expired_session_cookie, session_cookie, session_token};
use crate::state::AppState;

const MISCONFIGURED: &str = "Server misconfigured: app_password is missing.";
const INCORRECT_PASSWORD: &str = "Incorrect password. Try again.";
const NOT_LOGGED_IN: &str = "Please log in first.";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/login", post(login))
}

/// Routes that need a session of their own.
pub fn session_router() -> Router<AppState> {
    Router::new().route("/api/logout", post(logout))
}

/// The session of the request, put in place by `require_session`.
#[derive(Clone)]
pub struct CurrentSession {
    pub token: String,
    pub handle: SessionHandle,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub authenticated: bool,
}

/// POST /api/login - Check the shared password and start a session
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let secret = state.password().trim();
    if secret.is_empty() {
        return Err(AppError::new(StatusCode::INTERNAL_SERVER_ERROR, MISCONFIGURED));
    }

    if req.password.trim() != secret {
        warn!("Login rejected");
        return Err(AppError::new(StatusCode::UNAUTHORIZED, INCORRECT_PASSWORD));
    }

    let token = state.sessions.create().await;
    info!("Session started");

    Ok((
        [(SET_COOKIE, session_cookie(&token))],
        Json(LoginResponse { authenticated: true }),
    ))
}

/// POST /api/logout - Drop the session and clear its cookie
async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> impl IntoResponse {
    state.sessions.remove(&session.token).await;
    info!("Session ended");

    (
        [(SET_COOKIE, expired_session_cookie())],
        Json(LoginResponse { authenticated: false }),
    )
}

/// Reject requests without a live session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let not_logged_in = || AppError::new(StatusCode::UNAUTHORIZED, NOT_LOGGED_IN);

    let token = session_token(request.headers()).ok_or_else(not_logged_in)?;
    let handle = state.sessions.get(&token).await.ok_or_else(not_logged_in)?;

    request
        .extensions_mut()
        .insert(CurrentSession { token, handle });

    Ok(next.run(request).await)
}
