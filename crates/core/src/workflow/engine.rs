//! The audit workflow.
//!
//! Two webhook deliveries drive one audit: the entry event submits the asset
//! for manifest extraction and persists a correlation record; the completion
//! event matches the record back, retries transient failures with a bounded
//! pass count, and on success evaluates the rules and writes the verdict
//! back to the repository.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::types::{
    AssetEvent, ManifestEvent, RepositoryMetadata, WorkflowError, WorkflowOutcome, TARGET_FORMAT,
};
use crate::job::{JobRecord, JobStore};
use crate::manifest::{JobResult, JobStatus, ManifestService};
use crate::report::{FsReportStore, ReportBuilder, MAX_ASSET_SIZE_BYTES};
use crate::repository::Repository;

/// A completion delivery whose pass count reaches this ceiling discards the
/// job instead of retrying again.
pub const MAX_PROCESS_PASSES: u32 = 5;

/// Delay before resubmitting after a transient failure.
pub const RETRY_DELAY: Duration = Duration::from_secs(15);

/// Failure text marking a transient manifest failure worth retrying.
const TRANSIENT_MARKER: &str = "unable to download";

/// Metadata property receiving the compatibility verdict.
pub const COMPATIBILITY_PROPERTY: &str = "/adobe-express-compatible";

/// Orchestrates one audit across the two webhook deliveries.
pub struct AuditWorkflow {
    repository: Arc<dyn Repository>,
    manifests: Arc<dyn ManifestService>,
    jobs: JobStore,
    reports: Option<Arc<FsReportStore>>,
    retry_delay: Duration,
}

impl AuditWorkflow {
    pub fn new(
        repository: Arc<dyn Repository>,
        manifests: Arc<dyn ManifestService>,
        jobs: JobStore,
        reports: Option<Arc<FsReportStore>>,
    ) -> Self {
        Self {
            repository,
            manifests,
            jobs,
            reports,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Override the retry delay. Tests use `Duration::ZERO`.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Handle the entry webhook: asset processing complete in the repository.
    pub async fn handle_asset_event(
        &self,
        body: &Value,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let event: AssetEvent =
            serde_json::from_value(body.clone()).map_err(|e| WorkflowError::MalformedEvent {
                reason: e.to_string(),
            })?;

        if let Some(challenge) = event.challenge {
            return Ok(WorkflowOutcome::ChallengeEcho(challenge));
        }

        let Some(raw_metadata) = event.data.and_then(|d| d.repository_metadata) else {
            return Ok(WorkflowOutcome::Skipped {
                detail: "skipped - no metadata found".to_string(),
            });
        };

        let metadata: RepositoryMetadata = serde_json::from_value(raw_metadata.clone())
            .map_err(|e| WorkflowError::MalformedEvent {
                reason: e.to_string(),
            })?;

        let format = metadata.format.unwrap_or_default();
        if format != TARGET_FORMAT {
            return Ok(WorkflowOutcome::Skipped {
                detail: format!("skipped - no metadata found {}", format),
            });
        }

        let size = metadata.size.unwrap_or(0);
        if size > MAX_ASSET_SIZE_BYTES {
            info!(size, "Asset exceeds size ceiling, not submitting");
            return Ok(WorkflowOutcome::AssetTooLarge);
        }

        let path = metadata
            .path
            .ok_or(WorkflowError::MissingRequiredInput { field: "repo:path" })?;
        let repository_id = metadata
            .repository_id
            .ok_or(WorkflowError::MissingRequiredInput {
                field: "repo:repositoryId",
            })?;
        let host = format!("https://{}", repository_id);

        // Downstream failures here leave no orphan record: the record is
        // only written after submission succeeds.
        let presigned_url = self
            .repository
            .fetch_presigned_download_url(&host, &path)
            .await?;
        let receipt = self.manifests.submit(&presigned_url, true).await?;

        let record = JobRecord {
            job_id: receipt.job_id.clone(),
            repository_host: host,
            asset_path: path.clone(),
            presigned_download_url: presigned_url,
            asset_size_bytes: size,
            asset_uuid: metadata.asset_id.unwrap_or_default(),
            asset_name: metadata.name.unwrap_or_default(),
            raw_asset_metadata: raw_metadata,
            process_pass_count: 0,
            processing_complete: false,
            created_at: Utc::now(),
        };
        self.jobs.put(&record)?;

        info!(job_id = %record.job_id, asset_path = %record.asset_path, "Manifest job submitted");
        Ok(WorkflowOutcome::Submitted {
            job_id: record.job_id,
            asset_path: path,
        })
    }

    /// Handle the completion webhook: the manifest job finished (or failed).
    pub async fn handle_manifest_event(
        &self,
        body: &Value,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let event: ManifestEvent =
            serde_json::from_value(body.clone()).map_err(|e| WorkflowError::MalformedEvent {
                reason: e.to_string(),
            })?;

        if let Some(challenge) = event.challenge {
            return Ok(WorkflowOutcome::ChallengeEcho(challenge));
        }

        let job_body = event
            .event
            .and_then(|e| e.body)
            .ok_or(WorkflowError::MissingRequiredInput { field: "event.body" })?;
        let result: JobResult =
            serde_json::from_value(job_body).map_err(|e| WorkflowError::MalformedEvent {
                reason: e.to_string(),
            })?;
        if result.job_id.is_empty() {
            return Err(WorkflowError::MissingRequiredInput { field: "jobId" });
        }

        let Some(mut record) = self.jobs.get(&result.job_id)? else {
            warn!(job_id = %result.job_id, "Completion event for unknown job");
            return Ok(WorkflowOutcome::NoJobData);
        };

        if record.processing_complete {
            return Ok(WorkflowOutcome::AlreadyComplete {
                job_id: record.job_id,
            });
        }

        // Persist the pass count before any retry decision so a crash
        // mid-handling cannot reset the retry budget.
        record.process_pass_count += 1;
        self.jobs.put(&record)?;

        match result.status() {
            Some(JobStatus::Failed) => self.handle_failure(record, &result).await,
            Some(JobStatus::Succeeded) => self.handle_success(record, &result).await,
            _ => Ok(WorkflowOutcome::StillRunning {
                job_id: record.job_id,
            }),
        }
    }

    async fn handle_failure(
        &self,
        record: JobRecord,
        result: &JobResult,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let reason = result.failure_reason().unwrap_or_default();

        if !reason.contains(TRANSIENT_MARKER) {
            warn!(job_id = %record.job_id, %reason, "Manifest job failed terminally");
            return Ok(WorkflowOutcome::TerminalFailure {
                job_id: record.job_id,
                reason,
            });
        }

        if record.process_pass_count >= MAX_PROCESS_PASSES {
            warn!(job_id = %record.job_id, passes = record.process_pass_count,
                "Retry budget exhausted, discarding job");
            self.jobs.delete(&record.job_id)?;
            return Ok(WorkflowOutcome::RetryExhausted {
                job_id: record.job_id,
            });
        }

        tokio::time::sleep(self.retry_delay).await;

        // Resubmission mints a new external job id. The record moves to the
        // new key so the next completion event finds it.
        let receipt = self
            .manifests
            .submit(&record.presigned_download_url, true)
            .await?;
        let old_id = record.job_id.clone();
        let mut record = record;
        record.job_id = receipt.job_id;
        self.jobs.put(&record)?;
        self.jobs.delete(&old_id)?;

        info!(old_job_id = %old_id, job_id = %record.job_id,
            pass = record.process_pass_count, "Manifest job resubmitted");
        Ok(WorkflowOutcome::RetryScheduled {
            job_id: record.job_id,
            pass: record.process_pass_count,
        })
    }

    async fn handle_success(
        &self,
        mut record: JobRecord,
        result: &JobResult,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let builder = ReportBuilder::from_manifest(result)?;

        // The entry-time snapshot normally carries the size; fall back to a
        // fresh metadata fetch when it does not.
        let report = if record.asset_size_bytes > 0 {
            builder.with_job_snapshot(&record).build()
        } else {
            let metadata = self
                .repository
                .fetch_asset_metadata(&record.repository_host, &record.asset_path)
                .await?;
            builder
                .with_job_snapshot(&record)
                .with_repository_metadata(&metadata)
                .build()
        };

        let compatible = report.status() == "ok";
        let verdict = if compatible {
            "Compatible_Editable"
        } else {
            "Compatible_Linked"
        };

        self.repository
            .write_comment(
                &record.repository_host,
                &record.asset_path,
                &report.to_comment_text(),
            )
            .await?;
        self.repository
            .patch_metadata(
                &record.repository_host,
                &record.asset_path,
                COMPATIBILITY_PROPERTY,
                verdict,
            )
            .await?;

        record.processing_complete = true;
        self.jobs.put(&record)?;

        if let Some(reports) = &self.reports {
            reports.write(&report)?;
        }

        info!(job_id = %record.job_id, asset_path = %record.asset_path, compatible,
            "Audit complete");
        Ok(WorkflowOutcome::Completed {
            job_id: record.job_id,
            compatible,
        })
    }
}
