//! HS256 session tokens signed with a shared secret (development and tests)

use crate::auth::models::SessionClaims;
use crate::auth::verifier::{map_jwt_error, ClaimRules, SessionVerifier};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey};
use optimedia_core::AppError;

pub struct SharedSecretVerifier {
    key: DecodingKey,
    rules: ClaimRules,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str, rules: ClaimRules) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            rules,
        }
    }
}

#[async_trait]
impl SessionVerifier for SharedSecretVerifier {
    async fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let validation = self.rules.validation(&[Algorithm::HS256]);
        let token_data =
            decode::<SessionClaims>(token, &self.key, &validation).map_err(map_jwt_error)?;

        self.rules.check_authorized_party(&token_data.claims)?;
        Ok(token_data.claims)
    }
}
