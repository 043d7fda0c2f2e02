//! Session authentication
//!
//! The auth provider issues signed session tokens; this module verifies them
//! and exposes the caller as an [`models::AuthUser`].

pub mod jwks;
pub mod middleware;
pub mod models;
pub mod shared_secret;
pub mod verifier;

pub use models::{AuthUser, SessionClaims};
pub use verifier::{ClaimRules, SessionVerifier};
