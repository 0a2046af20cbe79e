//! Server-side sessions behind the password gate.
//!
//! A session is created on a successful login and identified by a random
//! token in the `nachbarn_session` cookie. It holds the per-user form state.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use cookie::{Cookie, SameSite};
use tokio::sync::Mutex;
use uuid::Uuid;

use nachbarn_core::form::{AddForm, EditForm};

pub const SESSION_COOKIE: &str = "nachbarn_session";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Form state kept for one logged-in browser.
pub struct SessionState {
    pub add_form: AddForm,
    /// The Edit form, while one is open.
    pub edit: Option<EditForm>,
}

impl SessionState {
    fn new(today: NaiveDate) -> Self {
        SessionState {
            add_form: AddForm::new(today),
            edit: None,
        }
    }
}

pub type SessionHandle = Arc<Mutex<SessionState>>;

struct SessionEntry {
    expires_at: DateTime<Utc>,
    state: SessionHandle,
}

/// All live sessions, keyed by cookie token.
#[derive(Clone)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl Sessions {
    pub fn new(ttl: Duration) -> Self {
        Sessions {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Start a session and return its token.
    pub async fn create(&self) -> String {
        let token = Uuid::new_v4().to_string();
        let entry = SessionEntry {
            expires_at: Utc::now() + self.ttl,
            state: Arc::new(Mutex::new(SessionState::new(today()))),
        };

        let mut sessions = self.inner.lock().await;
        let now = Utc::now();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(token.clone(), entry);

        token
    }

    /// The live session for a token; an expired one is dropped.
    pub async fn get(&self, token: &str) -> Option<SessionHandle> {
        let mut sessions = self.inner.lock().await;
        let entry = sessions.get(token)?;

        if entry.expires_at <= Utc::now() {
            sessions.remove(token);
            return None;
        }

        Some(entry.state.clone())
    }

    pub async fn remove(&self, token: &str) {
        self.inner.lock().await.remove(token);
    }
}

/// Session token from the request's cookies, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

pub fn session_cookie(token: &str) -> String {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

pub fn expired_session_cookie() -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; nachbarn_session=abc-123; other=1"),
        );

        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc-123");
        assert!(cookie.starts_with("nachbarn_session=abc-123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn test_sessions_expire() {
        let live = Sessions::new(Duration::hours(1));
        let token = live.create().await;
        assert!(live.get(&token).await.is_some());
        assert!(live.get("unknown").await.is_none());

        let expired = Sessions::new(Duration::seconds(-1));
        let token = expired.create().await;
        assert!(expired.get(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_new_session_has_default_add_form() {
        let sessions = Sessions::new(Duration::hours(1));
        let token = sessions.create().await;

        let session = sessions.get(&token).await.unwrap();
        let state = session.lock().await;

        assert_eq!(state.add_form.draft(), &AddForm::defaults(today()));
        assert!(state.edit.is_none());
    }
}
