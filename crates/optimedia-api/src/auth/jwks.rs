//! RS256/ES256 session tokens verified against the auth provider's JWKS
//!
//! Keys are cached per `kid` for the configured TTL. An unknown `kid`
//! triggers a fresh fetch, which picks up rotated keys, but the key set is
//! fetched at most once per `MIN_REFETCH_INTERVAL_SECS`.

use crate::auth::models::SessionClaims;
use crate::auth::verifier::{map_jwt_error, ClaimRules, SessionVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey};
use optimedia_core::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const DEFAULT_KEY_ID: &str = "default";
const MIN_REFETCH_INTERVAL_SECS: i64 = 30;

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// JSON Web Key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "kid")]
    pub key_id: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    #[serde(rename = "alg")]
    pub algorithm: Option<String>,
    #[serde(rename = "n")]
    pub modulus: Option<String>, // For RSA
    #[serde(rename = "e")]
    pub exponent: Option<String>, // For RSA
    #[serde(rename = "x")]
    pub x_coordinate: Option<String>, // For EC
    #[serde(rename = "y")]
    pub y_coordinate: Option<String>, // For EC
    #[serde(rename = "crv")]
    pub curve: Option<String>, // For EC
}

#[derive(Clone)]
struct CachedKey {
    key: DecodingKey,
    expires_at: DateTime<Utc>,
}

pub struct JwksVerifier {
    http_client: reqwest::Client,
    jwks_url: String,
    cache: Arc<RwLock<HashMap<String, CachedKey>>>,
    cache_ttl_seconds: i64,
    last_fetch: Arc<RwLock<Option<DateTime<Utc>>>>,
    algorithms: Vec<Algorithm>,
    rules: ClaimRules,
}

impl JwksVerifier {
    pub fn new(jwks_url: String, cache_ttl_seconds: u64, rules: ClaimRules) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            jwks_url,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl_seconds: cache_ttl_seconds as i64,
            last_fetch: Arc::new(RwLock::new(None)),
            algorithms: vec![Algorithm::RS256, Algorithm::ES256],
            rules,
        }
    }

    async fn fetch_jwks(&self) -> Result<Jwks, AppError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(format!(
                "JWKS endpoint returned error: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Unauthorized(format!("Failed to parse JWKS: {}", e)))
    }

    fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AppError> {
        match jwk.key_type.as_str() {
            "RSA" => {
                let n = jwk
                    .modulus
                    .as_ref()
                    .ok_or_else(|| AppError::Unauthorized("RSA key missing modulus".to_string()))?;
                let e = jwk.exponent.as_ref().ok_or_else(|| {
                    AppError::Unauthorized("RSA key missing exponent".to_string())
                })?;

                DecodingKey::from_rsa_components(n, e)
                    .map_err(|e| AppError::Unauthorized(format!("Failed to create RSA key: {}", e)))
            }
            "EC" => {
                let x = jwk.x_coordinate.as_ref().ok_or_else(|| {
                    AppError::Unauthorized("EC key missing x coordinate".to_string())
                })?;
                let y = jwk.y_coordinate.as_ref().ok_or_else(|| {
                    AppError::Unauthorized("EC key missing y coordinate".to_string())
                })?;
                let curve = jwk
                    .curve
                    .as_ref()
                    .ok_or_else(|| AppError::Unauthorized("EC key missing curve".to_string()))?;

                if curve != "P-256" {
                    return Err(AppError::Unauthorized(format!(
                        "Unsupported EC curve: {} (only P-256 is supported)",
                        curve
                    )));
                }

                DecodingKey::from_ec_components(x, y)
                    .map_err(|e| AppError::Unauthorized(format!("Failed to create EC key: {}", e)))
            }
            _ => Err(AppError::Unauthorized(format!(
                "Unsupported key type: {}",
                jwk.key_type
            ))),
        }
    }

    /// Claim the next fetch slot; false while the last fetch is too recent
    async fn try_begin_fetch(&self) -> bool {
        let now = Utc::now();
        let mut last = self.last_fetch.write().await;
        if let Some(at) = *last {
            if now - at < chrono::Duration::seconds(MIN_REFETCH_INTERVAL_SECS) {
                return false;
            }
        }
        *last = Some(now);
        true
    }

    async fn get_decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, AppError> {
        let cache_key = kid.unwrap_or(DEFAULT_KEY_ID).to_string();

        let stale = {
            let cache = self.cache.read().await;
            match cache.get(&cache_key) {
                Some(cached) if cached.expires_at > Utc::now() => return Ok(cached.key.clone()),
                Some(cached) => Some(cached.key.clone()),
                None => None,
            }
        };

        if !self.try_begin_fetch().await {
            tracing::debug!(kid = %cache_key, "JWKS fetched recently, not refetching");
            return stale.ok_or_else(|| {
                AppError::Unauthorized(format!("Key ID {} not found in JWKS", cache_key))
            });
        }

        let jwks = self.fetch_jwks().await?;
        tracing::debug!(keys = jwks.keys.len(), "Fetched JWKS");

        let expires_at = Utc::now() + chrono::Duration::seconds(self.cache_ttl_seconds);
        let mut found = None;
        let mut first_usable = None;
        {
            let mut cache = self.cache.write().await;
            for jwk in &jwks.keys {
                // Signature keys only; skip entries we cannot use
                if jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
                    continue;
                }
                let Ok(key) = Self::jwk_to_decoding_key(jwk) else {
                    continue;
                };
                if first_usable.is_none() {
                    first_usable = Some(key.clone());
                }
                let Some(id) = jwk.key_id.as_deref() else {
                    continue;
                };
                if id == cache_key {
                    found = Some(key.clone());
                }
                cache.insert(
                    id.to_string(),
                    CachedKey {
                        key,
                        expires_at,
                    },
                );
            }

            // Tokens without a `kid` use the first usable key
            if kid.is_none() && found.is_none() {
                if let Some(key) = first_usable {
                    cache.insert(
                        DEFAULT_KEY_ID.to_string(),
                        CachedKey {
                            key: key.clone(),
                            expires_at,
                        },
                    );
                    found = Some(key);
                }
            }
        }

        match (found, kid) {
            (Some(key), _) => Ok(key),
            (None, Some(kid)) => Err(AppError::Unauthorized(format!(
                "Key ID {} not found in JWKS",
                kid
            ))),
            (None, None) => Err(AppError::Unauthorized(
                "No usable keys found in JWKS".to_string(),
            )),
        }
    }
}

#[async_trait]
impl SessionVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token header: {}", e)))?;

        if !self.algorithms.contains(&header.alg) {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Supported: {:?}",
                header.alg, self.algorithms
            )));
        }

        let decoding_key = self.get_decoding_key(header.kid.as_deref()).await?;

        let validation = self.rules.validation(&[header.alg]);
        let token_data =
            decode::<SessionClaims>(token, &decoding_key, &validation).map_err(map_jwt_error)?;

        self.rules.check_authorized_party(&token_data.claims)?;
        Ok(token_data.claims)
    }
}
