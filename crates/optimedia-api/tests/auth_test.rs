//! Session gate tests: JWKS-backed RS256 tokens and claim checks.

mod helpers;

use axum::http::StatusCode;
use helpers::auth::{bearer, now, session_claims, session_token, sign_hs256, TEST_EMAIL, TEST_SECRET};
use helpers::setup_test_app_with;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use optimedia_api::auth::jwks::JwksVerifier;
use optimedia_api::auth::shared_secret::SharedSecretVerifier;
use optimedia_api::auth::ClaimRules;
use optimedia_core::UploadLimits;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSA_PRIVATE_KEY: &str = include_str!("fixtures/rsa_test_key.pem");
const RSA_MODULUS: &str = include_str!("fixtures/rsa_test_key.n");
const KEY_ID: &str = "test-key";

fn jwks_body() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": KEY_ID,
            "use": "sig",
            "alg": "RS256",
            "n": RSA_MODULUS.trim(),
            "e": "AQAB"
        }]
    })
}

fn sign_rs256(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(String::from);
    let key = EncodingKey::from_rsa_pem(RSA_PRIVATE_KEY.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

async fn jwks_server(expected_fetches: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
        .expect(expected_fetches)
        .mount(&server)
        .await;
    server
}

fn jwks_app(server: &MockServer, rules: ClaimRules) -> helpers::TestApp {
    let verifier = JwksVerifier::new(
        format!("{}/.well-known/jwks.json", server.uri()),
        300,
        rules,
    );
    setup_test_app_with(UploadLimits::default(), Arc::new(verifier))
}

fn shared_secret_app(rules: ClaimRules) -> helpers::TestApp {
    setup_test_app_with(
        UploadLimits::default(),
        Arc::new(SharedSecretVerifier::new(TEST_SECRET, rules)),
    )
}

#[tokio::test]
async fn test_rs256_session_verified_via_jwks() {
    let server = jwks_server(1).await;
    let app = jwks_app(&server, ClaimRules::default());
    let token = sign_rs256(&session_claims(TEST_EMAIL), Some(KEY_ID));

    for _ in 0..2 {
        app.client()
            .get("/api/all-videos")
            .add_header("Authorization", bearer(&token))
            .await
            .assert_status_ok();
    }
    // Second request is served from the key cache; `expect(1)` is checked on drop
}

#[tokio::test]
async fn test_unknown_key_id_is_rejected() {
    let server = jwks_server(1).await;
    let app = jwks_app(&server, ClaimRules::default());
    let token = sign_rs256(&session_claims(TEST_EMAIL), Some("rotated-away"));

    for _ in 0..5 {
        app.client()
            .get("/api/all-videos")
            .add_header("Authorization", bearer(&token))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
    // Misses inside the refetch interval do not hit the provider again
}

#[tokio::test]
async fn test_token_without_key_id_uses_cached_first_key() {
    let server = jwks_server(1).await;
    let app = jwks_app(&server, ClaimRules::default());
    let token = sign_rs256(&session_claims(TEST_EMAIL), None);

    for _ in 0..5 {
        app.client()
            .get("/api/all-videos")
            .add_header("Authorization", bearer(&token))
            .await
            .assert_status_ok();
    }
}

#[tokio::test]
async fn test_jwks_outage_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let app = jwks_app(&server, ClaimRules::default());
    let token = sign_rs256(&session_claims(TEST_EMAIL), Some(KEY_ID));

    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hs256_token_rejected_by_jwks_verifier() {
    let server = jwks_server(0).await;
    let app = jwks_app(&server, ClaimRules::default());

    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", bearer(&session_token(TEST_EMAIL)))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let app = shared_secret_app(ClaimRules::default());
    let mut claims = session_claims(TEST_EMAIL);
    claims["exp"] = json!(now() - 10);

    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", bearer(&sign_hs256(&claims)))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = shared_secret_app(ClaimRules::default());

    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_issuer_checked_when_configured() {
    let rules = ClaimRules {
        issuer: Some("https://auth.example.com".to_string()),
        ..ClaimRules::default()
    };
    let app = shared_secret_app(rules);

    let mut claims = session_claims(TEST_EMAIL);
    claims["iss"] = json!("https://evil.example.com");
    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", bearer(&sign_hs256(&claims)))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    claims["iss"] = json!("https://auth.example.com");
    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", bearer(&sign_hs256(&claims)))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_authorized_party_allowlist() {
    let rules = ClaimRules {
        authorized_parties: vec!["https://optimedia.example.com".to_string()],
        ..ClaimRules::default()
    };
    let app = shared_secret_app(rules);

    let mut claims = session_claims(TEST_EMAIL);
    claims["azp"] = json!("https://phishing.example.com");
    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", bearer(&sign_hs256(&claims)))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    claims["azp"] = json!("https://optimedia.example.com");
    app.client()
        .get("/api/all-videos")
        .add_header("Authorization", bearer(&sign_hs256(&claims)))
        .await
        .assert_status_ok();
}
