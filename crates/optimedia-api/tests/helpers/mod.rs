//! Test helpers: build the real router over in-memory collaborators.
//!
//! The video store and media service are fakes, so these tests need neither
//! Postgres nor network access. Sessions are HS256 tokens signed with
//! [`auth::TEST_SECRET`].

#![allow(dead_code)]

pub mod auth;
pub mod fakes;
pub mod fixtures;

use axum::Router;
use axum_test::TestServer;
use optimedia_api::auth::middleware::AuthState;
use optimedia_api::auth::shared_secret::SharedSecretVerifier;
use optimedia_api::auth::{ClaimRules, SessionVerifier};
use optimedia_api::build_router;
use optimedia_api::state::{AppState, UploadSettings};
use optimedia_core::UploadLimits;
use std::sync::Arc;

pub use fakes::{FakeMediaTransformer, InMemoryVideoStore};

pub const TEST_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Test application: server plus handles on the fakes behind it.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoStore>,
    pub media: Arc<FakeMediaTransformer>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_upload_settings(limits: &UploadLimits) -> UploadSettings {
    UploadSettings::new(
        limits,
        "test-image-folder".to_string(),
        "test-video-folder".to_string(),
        "q_auto,f_mp4".to_string(),
    )
}

/// Router with default limits and the shared-secret verifier.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(
        UploadLimits::default(),
        Arc::new(SharedSecretVerifier::new(
            auth::TEST_SECRET,
            ClaimRules::default(),
        )),
    )
}

pub fn setup_test_app_with(limits: UploadLimits, verifier: Arc<dyn SessionVerifier>) -> TestApp {
    let videos = Arc::new(InMemoryVideoStore::default());
    let media = Arc::new(FakeMediaTransformer::default());
    let router = test_router(videos.clone(), media.clone(), &limits, verifier);

    let server = TestServer::new(router).expect("Failed to create test server");
    TestApp {
        server,
        videos,
        media,
    }
}

fn test_router(
    videos: Arc<InMemoryVideoStore>,
    media: Arc<FakeMediaTransformer>,
    limits: &UploadLimits,
    verifier: Arc<dyn SessionVerifier>,
) -> Router {
    let state = Arc::new(AppState::new(videos, media, test_upload_settings(limits)));
    let auth_state = AuthState {
        verifier,
        email_claim: "email".to_string(),
    };
    build_router(
        state,
        auth_state,
        &["http://localhost:3000".to_string()],
        TEST_MAX_BODY_BYTES,
    )
}

/// Poll until `check` holds, for effects of spawned background tasks.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    check()
}
