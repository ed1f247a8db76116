//! Content repository (DAM) client.
//!
//! Read side: asset metadata and presigned download URLs. Write side:
//! structured comments and metadata patches. Writes go through the API
//! namespace, so content paths are rewritten before use.

mod client;

pub use client::{api_asset_path, HttpRepositoryClient};

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::token::TokenError;

/// Which downstream call failed. Presigned URL fetching is two HTTP calls;
/// diagnostics need to tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    /// Asset metadata GET
    Metadata,
    /// Repository resource descriptor GET
    Descriptor,
    /// Download relation link GET
    DownloadLink,
    /// Comment multipart POST
    CommentWrite,
    /// JSON-patch metadata PATCH
    MetadataPatch,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStage::Metadata => "metadata fetch",
            RequestStage::Descriptor => "repository descriptor fetch",
            RequestStage::DownloadLink => "download link fetch",
            RequestStage::CommentWrite => "comment write",
            RequestStage::MetadataPatch => "metadata patch",
        };
        write!(f, "{}", name)
    }
}

/// Errors from repository calls.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Downstream returned non-2xx.
    #[error("{stage} request failed with status {status}")]
    RequestFailed { stage: RequestStage, status: u16 },

    /// The resource descriptor carries no download relation.
    #[error("Repository descriptor for {path} has no download link")]
    MissingDownloadLink { path: String },

    /// Response body did not have the expected shape.
    #[error("Failed to parse {stage} response: {reason}")]
    ParseError { stage: RequestStage, reason: String },

    /// Token issuance failed.
    #[error(transparent)]
    Auth(#[from] TokenError),

    /// Transport-level failure.
    #[error("Repository request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Read/write operations against the content repository.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fetch asset metadata (three levels deep).
    async fn fetch_asset_metadata(&self, host: &str, path: &str)
        -> Result<Value, RepositoryError>;

    /// Resolve a time-limited presigned download URL for an asset.
    async fn fetch_presigned_download_url(
        &self,
        host: &str,
        path: &str,
    ) -> Result<String, RepositoryError>;

    /// Attach a comment to an asset.
    async fn write_comment(
        &self,
        host: &str,
        path: &str,
        text: &str,
    ) -> Result<(), RepositoryError>;

    /// Add a metadata property to an asset via JSON-patch.
    async fn patch_metadata(
        &self,
        host: &str,
        path: &str,
        property_path: &str,
        value: &str,
    ) -> Result<(), RepositoryError>;
}
