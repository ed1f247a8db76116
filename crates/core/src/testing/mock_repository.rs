//! Mock repository client for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::repository::{Repository, RepositoryError, RequestStage};

/// A recorded comment write for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedComment {
    pub host: String,
    pub path: String,
    pub text: String,
}

/// A recorded metadata patch for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPatch {
    pub host: String,
    pub path: String,
    pub property_path: String,
    pub value: String,
}

/// Mock implementation of the Repository trait.
///
/// Provides controllable behavior for testing:
/// - Script the presigned URL and metadata responses
/// - Record comment writes and metadata patches for assertions
/// - Simulate failures
#[derive(Debug)]
pub struct MockRepository {
    presigned_url: Arc<RwLock<String>>,
    metadata: Arc<RwLock<Value>>,
    comments: Arc<RwLock<Vec<RecordedComment>>>,
    patches: Arc<RwLock<Vec<RecordedPatch>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<RepositoryError>>>,
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            presigned_url: Arc::new(RwLock::new(
                "https://delivery.mock/asset?sig=mock".to_string(),
            )),
            metadata: Arc::new(RwLock::new(json!({}))),
            comments: Arc::new(RwLock::new(Vec::new())),
            patches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_presigned_url(&self, url: impl Into<String>) {
        *self.presigned_url.write().await = url.into();
    }

    pub async fn set_metadata(&self, metadata: Value) {
        *self.metadata.write().await = metadata;
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: RepositoryError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn comments(&self) -> Vec<RecordedComment> {
        self.comments.read().await.clone()
    }

    pub async fn patches(&self) -> Vec<RecordedPatch> {
        self.patches.read().await.clone()
    }

    async fn take_error(&self) -> Option<RepositoryError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Repository for MockRepository {
    async fn fetch_asset_metadata(
        &self,
        _host: &str,
        _path: &str,
    ) -> Result<Value, RepositoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.metadata.read().await.clone())
    }

    async fn fetch_presigned_download_url(
        &self,
        _host: &str,
        path: &str,
    ) -> Result<String, RepositoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        let url = self.presigned_url.read().await.clone();
        if url.is_empty() {
            return Err(RepositoryError::MissingDownloadLink {
                path: path.to_string(),
            });
        }
        Ok(url)
    }

    async fn write_comment(
        &self,
        host: &str,
        path: &str,
        text: &str,
    ) -> Result<(), RepositoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.comments.write().await.push(RecordedComment {
            host: host.to_string(),
            path: path.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn patch_metadata(
        &self,
        host: &str,
        path: &str,
        property_path: &str,
        value: &str,
    ) -> Result<(), RepositoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.patches.write().await.push(RecordedPatch {
            host: host.to_string(),
            path: path.to_string(),
            property_path: property_path.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

impl MockRepository {
    /// A ready-made failure for the presign stage.
    pub fn presign_failure() -> RepositoryError {
        RepositoryError::RequestFailed {
            stage: RequestStage::Descriptor,
            status: 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_comments_and_patches() {
        let repo = MockRepository::new();
        repo.write_comment("https://h", "/content/dam/a.psd", "hello")
            .await
            .unwrap();
        repo.patch_metadata("https://h", "/content/dam/a.psd", "/prop", "v")
            .await
            .unwrap();

        assert_eq!(repo.comments().await.len(), 1);
        assert_eq!(repo.patches().await[0].property_path, "/prop");
    }

    #[tokio::test]
    async fn test_error_injection_is_consumed() {
        let repo = MockRepository::new();
        repo.set_next_error(MockRepository::presign_failure()).await;

        assert!(repo
            .fetch_presigned_download_url("https://h", "/p")
            .await
            .is_err());
        assert!(repo
            .fetch_presigned_download_url("https://h", "/p")
            .await
            .is_ok());
    }
}
