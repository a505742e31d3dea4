//! Web layer for the arrivals server.
//!
//! Exposes each platform's published arrivals, plus the focused and
//! displayed selections, as a JSON API.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
