//! Webhook payload shapes and workflow outcomes.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::manifest::ManifestError;
use crate::report::ReportError;
use crate::repository::RepositoryError;
use crate::store::StoreError;

/// Asset format that triggers an audit.
pub const TARGET_FORMAT: &str = "image/vnd.adobe.photoshop";

/// Entry webhook payload. Either a challenge handshake or an asset event.
#[derive(Debug, Deserialize)]
pub struct AssetEvent {
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub data: Option<AssetEventData>,
}

#[derive(Debug, Deserialize)]
pub struct AssetEventData {
    /// Kept raw: the full blob is snapshotted into the job record.
    #[serde(rename = "repositoryMetadata", default)]
    pub repository_metadata: Option<Value>,
}

/// The repository metadata fields the workflow reads. Everything else rides
/// along in the raw snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(rename = "dc:format", default)]
    pub format: Option<String>,
    #[serde(rename = "repo:size", default)]
    pub size: Option<u64>,
    #[serde(rename = "repo:path", default)]
    pub path: Option<String>,
    #[serde(rename = "repo:repositoryId", default)]
    pub repository_id: Option<String>,
    #[serde(rename = "repo:assetId", default)]
    pub asset_id: Option<String>,
    #[serde(rename = "repo:name", default)]
    pub name: Option<String>,
}

/// Completion webhook payload. The job result rides in `event.body`.
#[derive(Debug, Deserialize)]
pub struct ManifestEvent {
    #[serde(default)]
    pub challenge: Option<String>,
    #[serde(default)]
    pub event: Option<ManifestEventEnvelope>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestEventEnvelope {
    #[serde(default)]
    pub body: Option<Value>,
}

/// What a webhook delivery amounted to. The HTTP layer maps these onto
/// status codes and response bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Subscription handshake: echo the challenge back verbatim.
    ChallengeEcho(String),
    /// Event did not describe an auditable asset.
    Skipped { detail: String },
    /// Asset exceeds the size ceiling; no job was created.
    AssetTooLarge,
    /// Manifest extraction submitted; a job record now awaits completion.
    Submitted { job_id: String, asset_path: String },
    /// Completion event for a job this service has no record of.
    NoJobData,
    /// Redelivery of a completion event for an already-finished job.
    AlreadyComplete { job_id: String },
    /// Completion event for a job still running; nothing to do yet.
    StillRunning { job_id: String },
    /// Transient failure: the job was resubmitted under a new id.
    RetryScheduled { job_id: String, pass: u32 },
    /// Transient failures exhausted the retry budget; record discarded.
    RetryExhausted { job_id: String },
    /// Non-transient failure; record retained for diagnostics.
    TerminalFailure { job_id: String, reason: String },
    /// Audit finished: report written back to the repository.
    Completed { job_id: String, compatible: bool },
}

/// Errors from webhook handling.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The payload lacks a field the workflow cannot proceed without.
    #[error("Missing required input: {field}")]
    MissingRequiredInput { field: &'static str },

    /// The payload is present but not parseable as the expected shape.
    #[error("Malformed event payload: {reason}")]
    MalformedEvent { reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
