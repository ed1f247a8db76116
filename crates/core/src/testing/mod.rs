//! Testing utilities and mock implementations for the webhook tests.
//!
//! Mocks for the two external-service traits let the full workflow run
//! without real infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use expresso_core::testing::{MockManifestService, MockRepository};
//!
//! let repository = MockRepository::new();
//! let manifests = MockManifestService::new();
//!
//! // Configure mock responses
//! repository.set_presigned_url("https://delivery/asset?sig=abc").await;
//! manifests.queue_job_ids(&["job-1"]).await;
//!
//! // Use in AuditWorkflow...
//! ```

mod mock_manifest_service;
mod mock_repository;

pub use mock_manifest_service::{MockManifestService, RecordedSubmission};
pub use mock_repository::{MockRepository, RecordedComment, RecordedPatch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;
    use serde_json::{json, Value};

    use crate::job::JobRecord;
    use crate::manifest::{DocumentInfo, JobResult, JobStatus, LayerNode, ManifestOutput};
    use crate::report::AssetReport;

    /// Create a childless layer node of the given kind.
    pub fn layer(kind: &str) -> LayerNode {
        LayerNode {
            id: None,
            kind: Some(kind.to_string()),
            name: None,
            children: Vec::new(),
        }
    }

    /// Create a document block with reasonable defaults.
    pub fn document(width: u64, height: u64, image_mode: &str) -> DocumentInfo {
        DocumentInfo {
            name: Some("psd".to_string()),
            width,
            height,
            bit_depth: Some(8),
            image_mode: Some(image_mode.to_string()),
            icc_profile_name: Some("sRGB IEC61966-2.1".to_string()),
            photoshop_build: None,
        }
    }

    /// Create a single-output job result.
    pub fn job_result(
        job_id: &str,
        status: &str,
        layers: Vec<LayerNode>,
        document: DocumentInfo,
    ) -> JobResult {
        let status = match status {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Succeeded,
        };
        JobResult {
            job_id: job_id.to_string(),
            outputs: vec![ManifestOutput {
                status,
                layers,
                document: Some(document),
                errors: None,
            }],
            links: None,
        }
    }

    /// Create a failed job result carrying the given error text.
    pub fn failed_job_result(job_id: &str, reason: &str) -> JobResult {
        JobResult {
            job_id: job_id.to_string(),
            outputs: vec![ManifestOutput {
                status: JobStatus::Failed,
                layers: Vec::new(),
                document: None,
                errors: Some(json!({"title": reason, "code": 400})),
            }],
            links: None,
        }
    }

    /// Create a job record with reasonable defaults.
    pub fn job_record(job_id: &str) -> JobRecord {
        JobRecord {
            job_id: job_id.to_string(),
            repository_host: "https://author.example.com".to_string(),
            asset_path: "/content/dam/brand/hero.psd".to_string(),
            presigned_download_url: "https://delivery.example.com/hero?sig=abc".to_string(),
            asset_size_bytes: 1_048_576,
            asset_uuid: "urn:aaid:aem:4123".to_string(),
            asset_name: "hero.psd".to_string(),
            raw_asset_metadata: json!({"dc:format": "image/vnd.adobe.photoshop"}),
            process_pass_count: 0,
            processing_complete: false,
            created_at: Utc::now(),
        }
    }

    /// Create a report that passes every rule, keyed by the given uuid.
    pub fn passing_report(asset_uuid: &str) -> AssetReport {
        AssetReport {
            filename: format!("{}-asset-report.json", asset_uuid),
            asset_name: "hero.psd".to_string(),
            asset_path: "/content/dam/brand/hero.psd".to_string(),
            asset_uuid: asset_uuid.to_string(),
            artboard_count: 1,
            layer_count: 3,
            smart_object_count: 0,
            text_layer_count: 1,
            text_layer_style_count: 0,
            bit_depth: Some(8),
            width: 4000,
            height: 4000,
            icc_profile_name: Some("sRGB IEC61966-2.1".to_string()),
            image_mode: Some("rgb".to_string()),
            size: 1000,
        }
    }

    /// Entry webhook body for a Photoshop asset of the given size.
    pub fn asset_event_body(path: &str, size: u64) -> Value {
        json!({
            "type": "aem.assets.asset.processing_completed",
            "data": {
                "repositoryMetadata": {
                    "dc:format": "image/vnd.adobe.photoshop",
                    "repo:size": size,
                    "repo:path": path,
                    "repo:repositoryId": "author.example.com",
                    "repo:assetId": "urn:aaid:aem:4123",
                    "repo:name": "hero.psd"
                }
            }
        })
    }

    /// Completion webhook body wrapping the given job result.
    pub fn manifest_event_body(result: &JobResult) -> Value {
        json!({
            "event": {
                "body": serde_json::to_value(result).expect("job result serializes")
            }
        })
    }
}
