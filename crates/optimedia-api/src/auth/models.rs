use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use optimedia_core::constants::UNAUTHORIZED_MESSAGE;
use optimedia_core::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Claims of a session token issued by the auth provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Provider user id
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Authorized party (origin that requested the token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    /// Remaining claims; the email claim name is configurable
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

impl SessionClaims {
    pub fn string_claim(&self, name: &str) -> Option<&str> {
        self.extra
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Authenticated user, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    /// Primary email; owner key for stored videos
    pub email: String,
    pub session_id: Option<String>,
}

impl AuthUser {
    /// Build from verified claims, requiring the configured email claim
    pub fn from_claims(claims: &SessionClaims, email_claim: &str) -> Result<Self, AppError> {
        let email = claims.string_claim(email_claim).ok_or_else(|| {
            AppError::Unauthorized(format!("Session token has no '{}' claim", email_claim))
        })?;

        Ok(AuthUser {
            user_id: claims.sub.clone(),
            email: email.to_lowercase(),
            session_id: claims.sid.clone(),
        })
    }
}

// Extension cannot be combined with Multipart, so read directly from request parts
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: JsonValue) -> SessionClaims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_email_from_default_claim() {
        let c = claims(json!({
            "sub": "user_123",
            "exp": 4_000_000_000i64,
            "sid": "sess_1",
            "email": "Ana@Example.com"
        }));
        let user = AuthUser::from_claims(&c, "email").unwrap();
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.session_id.as_deref(), Some("sess_1"));
    }

    #[test]
    fn test_email_from_custom_claim() {
        let c = claims(json!({
            "sub": "user_123",
            "exp": 4_000_000_000i64,
            "primary_email": "bo@example.com"
        }));
        assert!(AuthUser::from_claims(&c, "email").is_err());
        assert_eq!(
            AuthUser::from_claims(&c, "primary_email").unwrap().email,
            "bo@example.com"
        );
    }

    #[test]
    fn test_blank_email_rejected() {
        let c = claims(json!({ "sub": "u", "exp": 1, "email": "  " }));
        assert!(AuthUser::from_claims(&c, "email").is_err());
    }
}
