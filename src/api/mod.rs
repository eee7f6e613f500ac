//! Axum HTTP layer consumed by the landing page.
pub mod handlers;
pub mod routes;

pub use routes::{router, AppState};
