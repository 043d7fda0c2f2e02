use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

/// Shared secret the test router verifies HS256 sessions with.
pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

pub const TEST_EMAIL: &str = "ana@example.com";
pub const OTHER_EMAIL: &str = "ben@example.com";

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn session_claims(email: &str) -> Value {
    json!({
        "sub": format!("user_{}", email.split('@').next().unwrap_or("x")),
        "sid": "sess_123",
        "email": email,
        "iat": now(),
        "exp": now() + 3600,
    })
}

pub fn sign_hs256(claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Valid session for `email`
pub fn session_token(email: &str) -> String {
    sign_hs256(&session_claims(email))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
