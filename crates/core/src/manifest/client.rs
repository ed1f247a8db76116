//! HTTP client for the manifest extraction service.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::types::{job_id_from_submission, SubmissionReceipt};
use super::{ManifestError, ManifestService};
use crate::token::TokenProvider;

/// Submits asynchronous manifest-extraction requests.
pub struct HttpManifestClient {
    client: Client,
    tokens: TokenProvider,
    endpoint: String,
    api_key: String,
    org_id: Option<String>,
}

impl HttpManifestClient {
    pub fn new(
        client: Client,
        tokens: TokenProvider,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        org_id: Option<String>,
    ) -> Self {
        Self {
            client,
            tokens,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            org_id,
        }
    }
}

#[async_trait]
impl ManifestService for HttpManifestClient {
    async fn submit(
        &self,
        presigned_url: &str,
        request_completion_event: bool,
    ) -> Result<SubmissionReceipt, ManifestError> {
        let token = self.tokens.bearer().await?;

        let body = json!({
            "inputs": [
                {
                    "href": presigned_url,
                    "storage": "external"
                }
            ]
        });

        debug!(endpoint = %self.endpoint, request_completion_event, "manifest submit");
        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .header("x-api-key", &self.api_key)
            .json(&body);

        // The org id header is what makes the service emit a completion
        // event instead of requiring the caller to poll.
        if request_completion_event {
            if let Some(org_id) = &self.org_id {
                request = request.header("x-gw-ims-org-id", org_id);
            }
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ManifestError::SubmissionFailed {
                status: status.as_u16(),
                message,
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ManifestError::MalformedResponse {
                reason: e.to_string(),
            })?;

        let job_id =
            job_id_from_submission(&raw).ok_or_else(|| ManifestError::MalformedResponse {
                reason: "submission response carried no self link".to_string(),
            })?;

        Ok(SubmissionReceipt { job_id, raw })
    }
}
