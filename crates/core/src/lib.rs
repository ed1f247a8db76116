pub mod config;
pub mod job;
pub mod manifest;
pub mod report;
pub mod repository;
pub mod store;
pub mod testing;
pub mod token;
pub mod workflow;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use job::{JobRecord, JobStore, JOB_RECORD_TTL_SECS};
pub use manifest::{HttpManifestClient, JobResult, ManifestError, ManifestService};
pub use report::{AssetReport, FsReportStore, ReportBuilder, ReportError, ReportSummary};
pub use repository::{HttpRepositoryClient, Repository, RepositoryError};
pub use store::{KvStore, SqliteKvStore, StoreError};
pub use token::{TokenCache, TokenError, TokenProvider};
pub use workflow::{AuditWorkflow, WorkflowError, WorkflowOutcome};
