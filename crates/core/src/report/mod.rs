//! Compatibility rule evaluation and report persistence.

mod arena;
mod asset_report;
mod builder;
mod store;

pub use arena::{ArenaNode, LayerArena, LayerCounts, LayerKind};
pub use asset_report::{
    AssetReport, MAX_ARTBOARD_COUNT, MAX_ASSET_SIZE_BYTES, MAX_LAYER_COUNT, MAX_PIXEL_DIMENSION,
};
pub use builder::ReportBuilder;
pub use store::{FsReportStore, ReportSummary};

use thiserror::Error;

/// Errors from report construction and persistence.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The manifest carried no usable output or document block.
    #[error("Manifest does not describe a document")]
    InvalidManifest,

    /// A persisted report could not be parsed.
    #[error("Stored report is malformed: {reason}")]
    MalformedReport { reason: String },

    /// Filesystem failure in the report store.
    #[error("Report store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
