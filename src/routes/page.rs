//! The single page: login screen, calendar and forms

use axum::{Router, response::Html, routing::get};

use crate::state::AppState;

const INDEX: &str = include_str!("../../assets/index.html");

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET / - Serve the page
async fn index() -> Html<&'static str> {
    Html(INDEX)
}
