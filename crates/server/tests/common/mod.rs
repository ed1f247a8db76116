//! Common test utilities for webhook testing with mocks.
//!
//! Provides a test fixture that creates an in-process server with mock
//! external services injected, so the full webhook flow runs without real
//! infrastructure.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use expresso_core::config::{
    Config, CredentialsConfig, DatabaseConfig, ManifestServiceConfig, ReportsConfig,
    RepositoryConfig, ServerConfig,
};
use expresso_core::testing::{MockManifestService, MockRepository};
use expresso_core::{AuditWorkflow, FsReportStore, JobStore, SqliteKvStore};

/// Re-export fixtures for test convenience
pub use expresso_core::testing::fixtures;

/// Test fixture for webhook testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - The content repository (MockRepository)
/// - The manifest extraction service (MockManifestService)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_challenge() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post("/webhooks/asset-event", json!({"challenge": "abc"}))
///         .await;
///
///     assert_status!(response, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock repository - records comments and patches
    pub repository: Arc<MockRepository>,
    /// Mock manifest service - records submissions, mints job ids
    pub manifests: Arc<MockManifestService>,
    /// Report store backing the report endpoints
    pub reports: Arc<FsReportStore>,
    /// Temporary directory for the report store
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let repository = Arc::new(MockRepository::new());
        let manifests = Arc::new(MockManifestService::new());
        let kv = Arc::new(SqliteKvStore::in_memory().expect("Failed to create kv store"));
        let reports = Arc::new(
            FsReportStore::new(temp_dir.path().join("reports"))
                .expect("Failed to create report store"),
        );

        let workflow = AuditWorkflow::new(
            Arc::clone(&repository) as Arc<dyn expresso_core::Repository>,
            Arc::clone(&manifests) as Arc<dyn expresso_core::ManifestService>,
            JobStore::new(kv as Arc<dyn expresso_core::KvStore>),
            Some(Arc::clone(&reports)),
        )
        .with_retry_delay(Duration::ZERO);

        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: temp_dir.path().join("test.db"),
            },
            repository: RepositoryConfig {
                credentials: CredentialsConfig {
                    client_id: "test-repo-client".to_string(),
                    client_secret: "test-repo-secret".to_string(),
                    scopes: "openid".to_string(),
                    token_url: "https://ims.test/token".to_string(),
                },
                static_token: Some("test-token".to_string()),
            },
            manifest_service: ManifestServiceConfig {
                endpoint: "https://image.test/documentManifest".to_string(),
                credentials: CredentialsConfig {
                    client_id: "test-manifest-client".to_string(),
                    client_secret: "test-manifest-secret".to_string(),
                    scopes: "openid".to_string(),
                    token_url: "https://ims.test/token".to_string(),
                },
                org_id: Some("TEST@Org".to_string()),
            },
            reports: ReportsConfig {
                enabled: true,
                dir: temp_dir.path().join("reports"),
            },
        };

        let state = Arc::new(expresso_server::state::AppState::new(
            config,
            workflow,
            Some(Arc::clone(&reports)),
        ));

        let router = expresso_server::api::create_router(state);

        Self {
            router,
            repository,
            manifests,
            reports,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
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

        self.send(request_builder.body(body).unwrap()).await
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
