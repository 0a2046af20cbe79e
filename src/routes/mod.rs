pub mod auth;
pub mod calendar;
pub mod forms;
pub mod page;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use nachbarn_core::NachbarnError;

use crate::state::AppState;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        AppError {
            status,
            error: anyhow::anyhow!(message.into()),
        }
    }
}

fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<NachbarnError>() {
        Some(NachbarnError::Parse(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(NachbarnError::RowNotFound(_)) => StatusCode::NOT_FOUND,
        Some(NachbarnError::NoEditOpen) => StatusCode::CONFLICT,
        Some(NachbarnError::Store(_)) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.error);

        if self.status.is_server_error() {
            error!(status = %self.status, "{}", message);
        } else {
            warn!(status = %self.status, "{}", message);
        }

        let body = Json(ErrorResponse { error: message });
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        AppError {
            status: status_for(&error),
            error,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(calendar::router())
        .merge(forms::router())
        .merge(auth::session_router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .merge(page::router())
        .merge(auth::router())
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use axum::http::{Method, Request};
    use chrono::Duration;
    use nachbarn_core::{COLUMNS, MemoryStore};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const PASSWORD: &str = "sawasdee";

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn test_app(rows: Vec<Vec<String>>) -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::with_rows(cells(&COLUMNS), rows));
        let state = AppState::with_store(store.clone(), PASSWORD, Duration::hours(1));
        (store, app(state))
    }

    fn seeded() -> (Arc<MemoryStore>, Router) {
        test_app(vec![
            cells(&["2024-05-02", "18:00", "2024-05-02", "20:00", "Dinner", "", ""]),
            cells(&["2024-05-01", "09:00", "2024-05-01", "10:00", "Beach", "towels", "Eve"]),
        ])
    }

    fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "password": format!(" {} ", PASSWORD) })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_page_is_public() {
        let (_, app) = seeded();

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/api/login"));
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie() {
        let (_, app) = seeded();

        let cookie = login(&app).await;

        assert!(cookie.starts_with("nachbarn_session="));
        let (status, _) = send(&app, request(Method::GET, "/api/roster", Some(&cookie), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let (_, app) = seeded();

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/login", None, Some(json!({ "password": "nope" }))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Incorrect password. Try again.");
    }

    #[tokio::test]
    async fn test_blank_secret_is_a_misconfiguration() {
        let store = Arc::new(MemoryStore::new());
        let app = app(AppState::with_store(store, "  ", Duration::hours(1)));

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/login", None, Some(json!({ "password": "" }))),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("Server misconfigured"));
    }

    #[tokio::test]
    async fn test_calendar_requires_login() {
        let (store, app) = seeded();

        let (status, _) = send(&app, request(Method::GET, "/api/events", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            request(Method::GET, "/api/events", Some("nachbarn_session=forged"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(store.mutations(), 0);
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let (_, app) = seeded();
        let cookie = login(&app).await;

        let (status, _) = send(&app, request(Method::POST, "/api/logout", Some(&cookie), None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, request(Method::GET, "/api/events", Some(&cookie), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_events_are_sorted_and_projected() {
        let (_, app) = seeded();
        let cookie = login(&app).await;

        let (status, body) = send(&app, request(Method::GET, "/api/events", Some(&cookie), None)).await;

        assert_eq!(status, StatusCode::OK);
        let events = body.as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["id"], "3");
        assert_eq!(events[0]["title"], "Beach • Eve");
        assert_eq!(events[0]["start"], "2024-05-01T09:00:00");
        assert_eq!(events[0]["extendedProps"]["notes"], "towels");
        assert_eq!(events[1]["id"], "2");
        assert_eq!(events[1]["title"], "Dinner");
    }

    #[tokio::test]
    async fn test_events_read_header_once() {
        let (store, app) = seeded();
        let cookie = login(&app).await;

        let (status, _) = send(&app, request(Method::GET, "/api/events", Some(&cookie), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.header_reads(), 1);
        assert_eq!(store.header_writes(), 0);
    }

    #[tokio::test]
    async fn test_events_repair_missing_header() {
        let store = Arc::new(MemoryStore::new());
        let app = app(AppState::with_store(store.clone(), PASSWORD, Duration::hours(1)));
        let cookie = login(&app).await;

        let (status, body) = send(&app, request(Method::GET, "/api/events", Some(&cookie), None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        assert_eq!(store.header_cells(), cells(&COLUMNS));
        assert_eq!(store.header_writes(), 1);
    }

    #[tokio::test]
    async fn test_add_warns_and_keeps_draft() {
        let (store, app) = seeded();
        let cookie = login(&app).await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/add",
                Some(&cookie),
                Some(json!({
                    "start_date": "2024-06-01",
                    "start_time": "14:00",
                    "end_date": "2024-06-01",
                    "end_time": "16:00",
                    "activity": "   ",
                    "notes": "bring snacks",
                    "participants": ["Maja"]
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "rejected");
        assert_eq!(body["warning"], "Please enter an activity name.");
        assert_eq!(body["form"]["notes"], "bring snacks");
        assert_eq!(store.data_rows().len(), 2);

        let (_, draft) = send(&app, request(Method::GET, "/api/add", Some(&cookie), None)).await;
        assert_eq!(draft["start_time"], "14:00");
        assert_eq!(draft["participants"], json!(["Maja"]));
    }

    #[tokio::test]
    async fn test_add_appends_row_and_resets_form() {
        let (store, app) = seeded();
        let cookie = login(&app).await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/add",
                Some(&cookie),
                Some(json!({
                    "start_date": "2024-06-01",
                    "start_time": "14:00",
                    "end_date": "2024-06-01",
                    "end_time": "16:00",
                    "activity": " Picnic ",
                    "participants": ["Eve", "Jari", "Eve"]
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "added");
        assert_eq!(body["form"]["activity"], "");
        assert_eq!(body["form"]["participants"], json!(["All"]));

        let rows = store.data_rows();
        assert_eq!(
            rows[2],
            cells(&["2024-06-01", "14:00", "2024-06-01", "16:00", "Picnic", "", "Eve, Jari"])
        );
    }

    #[tokio::test]
    async fn test_drag_updates_times_only() {
        let (store, app) = seeded();
        let cookie = login(&app).await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/calendar/callback",
                Some(&cookie),
                Some(json!({
                    "eventChange": {
                        "event": { "id": "3", "start": "2024-05-03T11:30:00+02:00", "end": null }
                    }
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "updated");
        assert_eq!(
            store.data_rows()[1],
            cells(&["2024-05-03", "11:30", "2024-05-03", "12:30", "Beach", "towels", "Eve"])
        );
    }

    #[tokio::test]
    async fn test_callback_for_unknown_row() {
        let (store, app) = seeded();
        let cookie = login(&app).await;

        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/calendar/callback",
                Some(&cookie),
                Some(json!({
                    "eventDrop": { "event": { "id": "9", "start": "2024-05-03T11:30:00" } }
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/calendar/callback",
                Some(&cookie),
                Some(json!({
                    "eventDrop": { "event": { "id": "3", "start": "next tuesday" } }
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.mutations(), 0);
    }

    #[tokio::test]
    async fn test_empty_callback_is_ignored() {
        let (_, app) = seeded();
        let cookie = login(&app).await;

        let (status, body) = send(
            &app,
            request(Method::POST, "/api/calendar/callback", Some(&cookie), Some(json!({}))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "ignored");
    }

    async fn click(app: &Router, cookie: &str, id: Value) -> Value {
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/api/calendar/callback",
                Some(cookie),
                Some(json!({ "eventClick": { "event": { "id": id, "start": "2024-05-01T09:00:00" } } })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_click_opens_edit_and_save_overwrites() {
        let (store, app) = seeded();
        let cookie = login(&app).await;

        let body = click(&app, &cookie, json!(3)).await;
        assert_eq!(body["result"], "edit_opened");
        assert_eq!(body["edit"]["fields"]["activity"], "Beach");

        let (_, edit) = send(&app, request(Method::GET, "/api/edit", Some(&cookie), None)).await;
        assert_eq!(edit["event_id"], "3");

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/edit",
                Some(&cookie),
                Some(json!({
                    "action": "save",
                    "start_date": "2024-05-01",
                    "start_time": "09:00",
                    "end_date": "2024-05-01",
                    "end_time": "11:00",
                    "activity": "Beach volleyball",
                    "notes": "",
                    "participants": ["Eve", "Stijn"]
                })),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "saved");
        assert_eq!(body["refresh"], true);
        assert_eq!(
            store.data_rows()[1],
            cells(&["2024-05-01", "09:00", "2024-05-01", "11:00", "Beach volleyball", "", "Eve, Stijn"])
        );

        let (_, edit) = send(&app, request(Method::GET, "/api/edit", Some(&cookie), None)).await;
        assert_eq!(edit, Value::Null);
    }

    #[tokio::test]
    async fn test_edit_delete_and_cancel() {
        let (store, app) = seeded();
        let cookie = login(&app).await;

        click(&app, &cookie, json!("2")).await;
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/edit", Some(&cookie), Some(json!({ "action": "cancel" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["refresh"], false);
        assert_eq!(store.mutations(), 0);

        click(&app, &cookie, json!("2")).await;
        let (status, body) = send(
            &app,
            request(Method::POST, "/api/edit", Some(&cookie), Some(json!({ "action": "delete" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "deleted");
        assert_eq!(store.data_rows().len(), 1);
        assert_eq!(store.data_rows()[0][4], "Beach");
    }

    #[tokio::test]
    async fn test_edit_action_without_open_form() {
        let (_, app) = seeded();
        let cookie = login(&app).await;

        let (status, _) = send(
            &app,
            request(Method::POST, "/api/edit", Some(&cookie), Some(json!({ "action": "delete" }))),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_status_mapping() {
        let status = |err: NachbarnError| AppError::from(err).status;

        assert_eq!(status(NachbarnError::Parse("bad".into())), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status(NachbarnError::RowNotFound(4)), StatusCode::NOT_FOUND);
        assert_eq!(status(NachbarnError::NoEditOpen), StatusCode::CONFLICT);
        assert_eq!(status(NachbarnError::Store("quota".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status(NachbarnError::Config("missing".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
