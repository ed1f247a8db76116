//! Manifest extraction: submission client and wire types.
//!
//! Submission is fire-and-forget: the response holds only a job id; the
//! manifest arrives later through a webhook carrying the same id. The job
//! correlation store bridges the two invocations.

mod client;
mod types;

pub use client::HttpManifestClient;
pub use types::{
    job_id_from_submission, DocumentInfo, JobResult, JobStatus, LayerNode, ManifestOutput,
    SubmissionReceipt,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::token::TokenError;

/// Errors from manifest submission.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The submission endpoint returned non-2xx.
    #[error("Manifest submission failed with status {status}: {message}")]
    SubmissionFailed { status: u16, message: String },

    /// 2xx response without the expected shape.
    #[error("Manifest submission response was malformed: {reason}")]
    MalformedResponse { reason: String },

    /// Token issuance failed.
    #[error(transparent)]
    Auth(#[from] TokenError),

    /// Transport-level failure.
    #[error("Manifest request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Asynchronous manifest-extraction submission.
#[async_trait]
pub trait ManifestService: Send + Sync {
    /// Submit a presigned asset URL for manifest extraction. When
    /// `request_completion_event` is set, the service is asked to deliver a
    /// completion event once the job finishes.
    async fn submit(
        &self,
        presigned_url: &str,
        request_completion_event: bool,
    ) -> Result<SubmissionReceipt, ManifestError>;
}
