use std::sync::Arc;

use expresso_core::report::FsReportStore;
use expresso_core::workflow::AuditWorkflow;
use expresso_core::{Config, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    workflow: AuditWorkflow,
    reports: Option<Arc<FsReportStore>>,
}

impl AppState {
    pub fn new(
        config: Config,
        workflow: AuditWorkflow,
        reports: Option<Arc<FsReportStore>>,
    ) -> Self {
        Self {
            config,
            workflow,
            reports,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn workflow(&self) -> &AuditWorkflow {
        &self.workflow
    }

    pub fn reports(&self) -> Option<&Arc<FsReportStore>> {
        self.reports.as_ref()
    }
}
