//! Wire types for the document-processing service.
//!
//! The manifest itself arrives through the completion webhook, not the
//! submission response; these types cover both sides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a manifest submission. The manifest is delivered later through
/// a webhook carrying the same job id.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    /// Correlation id: last path segment of the response's self link.
    pub job_id: String,
    /// Raw submission response, kept for diagnostics.
    pub raw: Value,
}

/// Job status as delivered in a completion event output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Completed manifest job, as carried in `event.body` of a completion event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub job_id: String,
    #[serde(default)]
    pub outputs: Vec<ManifestOutput>,
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

impl JobResult {
    /// Status of the first output; completion events carry one output per
    /// submitted input and this service submits exactly one.
    pub fn status(&self) -> Option<JobStatus> {
        self.outputs.first().map(|o| o.status)
    }

    /// Concatenated error text of the first output, used to classify
    /// transient failures.
    pub fn failure_reason(&self) -> Option<String> {
        let errors = self.outputs.first()?.errors.as_ref()?;
        Some(errors.to_string())
    }
}

/// One output of a manifest job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestOutput {
    pub status: JobStatus,
    #[serde(default)]
    pub layers: Vec<LayerNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

/// Document-wide attributes from the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub width: u64,
    pub height: u64,
    #[serde(default)]
    pub bit_depth: Option<u32>,
    #[serde(default)]
    pub image_mode: Option<String>,
    #[serde(default)]
    pub icc_profile_name: Option<String>,
    #[serde(default)]
    pub photoshop_build: Option<String>,
}

/// One node of the manifest layer tree. Containers carry their children
/// inline; the report engine flattens this into an arena before counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerNode {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayerNode>,
}

/// Extract the job id from a submission response's self link
/// (`_links.self.href`, last path segment).
pub fn job_id_from_submission(raw: &Value) -> Option<String> {
    let href = raw["_links"]["self"]["href"].as_str()?;
    let segment = href.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_id_from_submission() {
        let raw = json!({
            "_links": {
                "self": {
                    "href": "https://image.example/pie/psdService/status/00bd53a5-e290"
                }
            }
        });
        assert_eq!(
            job_id_from_submission(&raw).as_deref(),
            Some("00bd53a5-e290")
        );
    }

    #[test]
    fn test_job_id_from_submission_missing_link() {
        assert!(job_id_from_submission(&json!({})).is_none());
    }

    #[test]
    fn test_job_result_parses_completion_event_body() {
        let body = json!({
            "jobId": "00bd53a5-e290-452e-a27a-56c66c805369",
            "outputs": [{
                "status": "succeeded",
                "layers": [
                    {"id": 5, "type": "layer", "name": "woman"},
                    {"id": 1, "type": "backgroundLayer", "name": "Background"}
                ],
                "document": {
                    "name": "psd",
                    "width": 6720,
                    "height": 4480,
                    "bitDepth": 8,
                    "imageMode": "cmyk",
                    "iccProfileName": "SWOP (Coated), 20%, GCR, Medium"
                }
            }]
        });

        let result: JobResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.status(), Some(JobStatus::Succeeded));
        assert_eq!(result.outputs[0].layers.len(), 2);
        let doc = result.outputs[0].document.as_ref().unwrap();
        assert_eq!(doc.width, 6720);
        assert_eq!(doc.image_mode.as_deref(), Some("cmyk"));
    }

    #[test]
    fn test_failure_reason_surfaces_errors() {
        let body = json!({
            "jobId": "j1",
            "outputs": [{
                "status": "failed",
                "errors": {"title": "unable to download the asset", "code": 400}
            }]
        });

        let result: JobResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.status(), Some(JobStatus::Failed));
        assert!(result
            .failure_reason()
            .unwrap()
            .contains("unable to download"));
    }
}
