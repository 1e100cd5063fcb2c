//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the router with a
//! [`MockBackend`] injected, so every endpoint can be exercised without a
//! real subtitle service.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use subhound_core::{testing::MockBackend, Config, SearchBackend};
use subhound_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use subhound_core::testing::fixtures;

/// Test fixture for API testing with a mock backend.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let backend = MockBackend::new()
///         .with_tier(TierKind::Tag, vec![fixtures::subtitle("1", "en")]);
///     let fixture = TestFixture::with_backend(backend);
///
///     let response = fixture.post("/api/v1/search", json!({
///         "filename": "The.Matrix.1999.mkv"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock backend, when one was injected
    pub backend: Option<Arc<MockBackend>>,
    /// Scratch directory for video and subtitle files
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture with default configuration and no backend.
    pub fn new() -> Self {
        Self::build(Config::default(), None)
    }

    /// Fixture with default configuration and the given backend.
    pub fn with_backend(backend: MockBackend) -> Self {
        Self::build(Config::default(), Some(Arc::new(backend)))
    }

    /// Fixture with a custom configuration and the given backend.
    pub fn with_config(config: Config, backend: MockBackend) -> Self {
        Self::build(config, Some(Arc::new(backend)))
    }

    fn build(config: Config, backend: Option<Arc<MockBackend>>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut state = AppState::new(config);
        if let Some(backend) = &backend {
            state = state.with_backend(Arc::clone(backend) as Arc<dyn SearchBackend>);
        }
        let router = create_router(Arc::new(state));

        Self {
            router,
            backend,
            temp_dir,
        }
    }

    /// The injected mock backend.
    pub fn backend(&self) -> &MockBackend {
        self.backend.as_deref().expect("Fixture has no backend")
    }

    /// Write `content` to a file in the scratch directory and return its path.
    pub fn write_file(&self, name: &str, content: &[u8]) -> String {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path.to_string_lossy().into_owned()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a GET request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
