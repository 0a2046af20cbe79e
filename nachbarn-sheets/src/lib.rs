//! Google Sheets backend for the Nachbarn calendar.
//!
//! A `Worksheet` implements `nachbarn_core::RowStore` on top of the Sheets v4
//! REST API. Calls are authorized with an OAuth access token refreshed from
//! the configured refresh token.

mod auth;
pub mod client;
pub mod worksheet;

pub use client::SheetsClient;
pub use worksheet::Worksheet;
