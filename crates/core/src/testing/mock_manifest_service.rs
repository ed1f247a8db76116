//! Mock manifest service for testing.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::manifest::{ManifestError, ManifestService, SubmissionReceipt};

/// A recorded submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub presigned_url: String,
    pub request_completion_event: bool,
}

/// Mock implementation of the ManifestService trait.
///
/// Each submission mints a sequential job id (`mock-job-1`, `mock-job-2`,
/// ...) unless explicit ids are queued, and records the call for assertions.
#[derive(Debug)]
pub struct MockManifestService {
    submissions: Arc<RwLock<Vec<RecordedSubmission>>>,
    queued_job_ids: Arc<RwLock<Vec<String>>>,
    counter: Arc<RwLock<u32>>,
    /// If set, the next submission will fail with this error.
    next_error: Arc<RwLock<Option<ManifestError>>>,
}

impl Default for MockManifestService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockManifestService {
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            queued_job_ids: Arc::new(RwLock::new(Vec::new())),
            counter: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue explicit job ids; submissions consume them in order before
    /// falling back to generated ids.
    pub async fn queue_job_ids(&self, ids: &[&str]) {
        let mut queued = self.queued_job_ids.write().await;
        for id in ids {
            queued.push(id.to_string());
        }
    }

    pub async fn set_next_error(&self, error: ManifestError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

#[async_trait]
impl ManifestService for MockManifestService {
    async fn submit(
        &self,
        presigned_url: &str,
        request_completion_event: bool,
    ) -> Result<SubmissionReceipt, ManifestError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.submissions.write().await.push(RecordedSubmission {
            presigned_url: presigned_url.to_string(),
            request_completion_event,
        });

        let mut queued = self.queued_job_ids.write().await;
        let job_id = if queued.is_empty() {
            let mut counter = self.counter.write().await;
            *counter += 1;
            format!("mock-job-{}", *counter)
        } else {
            queued.remove(0)
        };

        let raw = json!({
            "_links": {
                "self": {"href": format!("https://image.mock/pie/psdService/status/{}", job_id)}
            }
        });
        Ok(SubmissionReceipt { job_id, raw })
    }
}
