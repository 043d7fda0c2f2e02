use crate::auth::models::AuthUser;
use crate::auth::verifier::SessionVerifier;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use optimedia_core::constants::{SESSION_COOKIE_NAME, UNAUTHORIZED_MESSAGE};
use optimedia_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn SessionVerifier>,
    /// Claim that carries the user's primary email
    pub email_claim: String,
}

/// Session token from `Authorization: Bearer`, falling back to the session cookie
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn unauthorized() -> Response {
    HttpAppError(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())).into_response()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_session_token(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Missing session token");
        return unauthorized();
    };

    let claims = match auth_state.verifier.verify(&token).await {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, path = %request.uri().path(), "Session verification failed");
            return unauthorized();
        }
    };

    let user = match AuthUser::from_claims(&claims, &auth_state.email_claim) {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, user_id = %claims.sub, "Session rejected");
            return unauthorized();
        }
    };

    tracing::debug!(user_id = %user.user_id, "Session authenticated");
    request.extensions_mut().insert(user);
    next.run(request).await
}
