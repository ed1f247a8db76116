//! Webhook-driven audit orchestration.

mod engine;
mod types;

pub use engine::{AuditWorkflow, COMPATIBILITY_PROPERTY, MAX_PROCESS_PASSES, RETRY_DELAY};
pub use types::{
    AssetEvent, AssetEventData, ManifestEvent, ManifestEventEnvelope, RepositoryMetadata,
    WorkflowError, WorkflowOutcome, TARGET_FORMAT,
};
