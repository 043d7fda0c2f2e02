//! OptiMedia API Library
//!
//! HTTP handlers, the session auth gate, middleware and application setup.

mod api_doc;
mod handlers;
mod middleware;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use setup::routes::build_router;
pub use state::AppState;
