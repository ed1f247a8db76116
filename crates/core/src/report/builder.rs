//! Pure report construction.
//!
//! A builder consumes a parsed manifest plus whichever asset-size source is
//! available (the stored job snapshot, or a fresh repository metadata fetch)
//! and produces an immutable [`AssetReport`]. No engine state is carried
//! between evaluations.

use serde_json::Value;
use uuid::Uuid;

use super::arena::LayerArena;
use super::asset_report::AssetReport;
use super::ReportError;
use crate::job::JobRecord;
use crate::manifest::JobResult;

/// Builds one report from one manifest evaluation.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    artboard_count: u64,
    layer_count: u64,
    smart_object_count: u64,
    text_layer_count: u64,
    bit_depth: Option<u32>,
    width: u64,
    height: u64,
    icc_profile_name: Option<String>,
    image_mode: Option<String>,
    size: u64,
    asset_name: String,
    asset_path: String,
    asset_uuid: String,
}

impl ReportBuilder {
    /// Seed the builder from a manifest. Fails fast with `InvalidManifest`
    /// when the manifest carries no output or no document block.
    pub fn from_manifest(result: &JobResult) -> Result<Self, ReportError> {
        let output = result.outputs.first().ok_or(ReportError::InvalidManifest)?;
        let document = output.document.as_ref().ok_or(ReportError::InvalidManifest)?;

        // Counts span every output; each output carries one layer forest.
        let mut builder = Self::default();
        for output in &result.outputs {
            let counts = LayerArena::from_layers(&output.layers).counts();
            builder.artboard_count += counts.artboards;
            builder.layer_count += counts.raster_layers;
            builder.smart_object_count += counts.smart_objects;
            builder.text_layer_count += counts.text_layers;
        }

        builder.bit_depth = document.bit_depth;
        builder.width = document.width;
        builder.height = document.height;
        builder.icc_profile_name = document.icc_profile_name.clone();
        builder.image_mode = document.image_mode.clone();

        Ok(builder)
    }

    /// Take asset identity and size from the snapshot captured at submission
    /// time, avoiding a second repository fetch.
    pub fn with_job_snapshot(mut self, record: &JobRecord) -> Self {
        self.size = record.asset_size_bytes;
        self.asset_name = record.asset_name.clone();
        self.asset_path = record.asset_path.clone();
        self.asset_uuid = record.asset_uuid.clone();
        self
    }

    /// Take the asset size from a fresh repository metadata response.
    pub fn with_repository_metadata(mut self, metadata: &Value) -> Self {
        if let Some(size) = metadata["jcr:content"]["metadata"]["dam:size"].as_u64() {
            self.size = size;
        }
        self
    }

    pub fn build(self) -> AssetReport {
        // Reports for the same asset share a key so repeated audits overwrite
        // rather than accumulate.
        let filename = if self.asset_uuid.is_empty() {
            format!("{}-asset-report.json", Uuid::new_v4())
        } else {
            format!("{}-asset-report.json", self.asset_uuid)
        };

        AssetReport {
            filename,
            asset_name: self.asset_name,
            asset_path: self.asset_path,
            asset_uuid: self.asset_uuid,
            artboard_count: self.artboard_count,
            layer_count: self.layer_count,
            smart_object_count: self.smart_object_count,
            text_layer_count: self.text_layer_count,
            text_layer_style_count: 0,
            bit_depth: self.bit_depth,
            width: self.width,
            height: self.height,
            icc_profile_name: self.icc_profile_name,
            image_mode: self.image_mode,
            size: self.size,
        }
    }
}
