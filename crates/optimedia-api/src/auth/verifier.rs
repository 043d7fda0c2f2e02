//! Session token verification
//!
//! Both verifiers share the same claim rules: `exp` and `nbf` are checked
//! with zero leeway, `iss` and `aud` only when configured, and `azp` against
//! an allowlist when one is configured.

use crate::auth::models::SessionClaims;
use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation};
use optimedia_core::{AppError, AuthConfig};

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Verify signature and claims, returning the decoded claims
    async fn verify(&self, token: &str) -> Result<SessionClaims, AppError>;
}

/// Claim checks applied after the signature is verified
#[derive(Debug, Clone, Default)]
pub struct ClaimRules {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub authorized_parties: Vec<String>,
}

impl ClaimRules {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            authorized_parties: config.authorized_parties.clone(),
        }
    }

    pub fn validation(&self, algorithms: &[Algorithm]) -> Validation {
        let mut validation = Validation::new(algorithms[0]);
        validation.algorithms = algorithms.to_vec();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        match self.audience.as_ref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = self.issuer.as_ref() {
            validation.set_issuer(&[issuer]);
        }
        validation
    }

    pub fn check_authorized_party(&self, claims: &SessionClaims) -> Result<(), AppError> {
        if self.authorized_parties.is_empty() {
            return Ok(());
        }
        match claims.azp.as_deref() {
            Some(azp) if self.authorized_parties.iter().any(|p| p == azp) => Ok(()),
            Some(azp) => Err(AppError::Unauthorized(format!(
                "Authorized party '{}' is not allowed",
                azp
            ))),
            None => Err(AppError::Unauthorized(
                "Token has no authorized party".to_string(),
            )),
        }
    }
}

pub fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AppError {
    tracing::debug!("JWT validation failed: {}", e);
    match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthorized("Token has expired".to_string()),
        ErrorKind::ImmatureSignature => {
            AppError::Unauthorized("Token is not yet valid (nbf)".to_string())
        }
        ErrorKind::InvalidIssuer => AppError::Unauthorized("Invalid token issuer".to_string()),
        ErrorKind::InvalidAudience => AppError::Unauthorized("Invalid token audience".to_string()),
        ErrorKind::InvalidSignature => {
            AppError::Unauthorized("Invalid token signature".to_string())
        }
        _ => AppError::Unauthorized(format!("Invalid or expired token: {}", e)),
    }
}
