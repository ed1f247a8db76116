//! Filesystem report persistence.
//!
//! Reports are small JSON documents written one file per asset under a
//! configured directory. Aggregation is a single linear pass over the
//! directory; the report population is bounded by the asset population.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::asset_report::AssetReport;
use super::ReportError;

/// Cross-report aggregate: how often each rule failed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_count: u64,
    pub size_was_issue: u64,
    pub width_was_issue: u64,
    pub height_was_issue: u64,
    pub artboard_count_was_issue: u64,
    pub image_mode_was_issue: u64,
    pub layer_count_was_issue: u64,
    pub smart_object_was_issue: u64,
}

/// Report storage rooted at one directory.
pub struct FsReportStore {
    dir: PathBuf,
}

impl FsReportStore {
    /// Open a store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Write a report under its filename, overwriting any previous audit of
    /// the same asset.
    pub fn write(&self, report: &AssetReport) -> Result<(), ReportError> {
        let rendered = serde_json::to_string_pretty(&report.to_report_json())
            .map_err(|e| ReportError::MalformedReport {
                reason: e.to_string(),
            })?;
        fs::write(self.path_for(&report.filename), rendered)?;
        Ok(())
    }

    /// Filenames of every stored report.
    pub fn list(&self) -> Result<Vec<String>, ReportError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(".json") {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn read(&self, filename: &str) -> Result<AssetReport, ReportError> {
        let raw = fs::read_to_string(self.path_for(filename))?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| ReportError::MalformedReport {
            reason: e.to_string(),
        })?;
        AssetReport::from_report_json(&value)
    }

    /// Delete every stored report. Returns how many were removed.
    pub fn delete_all(&self) -> Result<u64, ReportError> {
        let mut removed = 0;
        for name in self.list()? {
            fs::remove_file(self.path_for(&name))?;
            removed += 1;
        }
        Ok(removed)
    }

    /// One pass over every report, tallying rule failures. A report that
    /// fails to parse is skipped rather than failing the whole summary.
    pub fn aggregate(&self) -> Result<ReportSummary, ReportError> {
        let mut summary = ReportSummary::default();
        for name in self.list()? {
            let report = match self.read(&name) {
                Ok(report) => report,
                Err(e) => {
                    warn!(filename = %name, error = %e, "Skipping unreadable report");
                    continue;
                }
            };

            summary.total_count += 1;
            if !report.size_ok() {
                summary.size_was_issue += 1;
            }
            if !report.width_ok() {
                summary.width_was_issue += 1;
            }
            if !report.height_ok() {
                summary.height_was_issue += 1;
            }
            if !report.artboard_count_ok() {
                summary.artboard_count_was_issue += 1;
            }
            if !report.image_mode_ok() {
                summary.image_mode_was_issue += 1;
            }
            if !report.layer_count_ok() {
                summary.layer_count_was_issue += 1;
            }
            if !report.smart_object_count_ok() {
                summary.smart_object_was_issue += 1;
            }
        }
        Ok(summary)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn store() -> (tempfile::TempDir, FsReportStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsReportStore::new(dir.path().join("reports")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let (_guard, store) = store();
        let report = fixtures::passing_report("uuid-1");
        store.write(&report).unwrap();

        let fetched = store.read(&report.filename).unwrap();
        assert_eq!(fetched, report);
    }

    #[test]
    fn test_write_overwrites_same_asset() {
        let (_guard, store) = store();
        let mut report = fixtures::passing_report("uuid-1");
        store.write(&report).unwrap();

        report.width = 9000;
        store.write(&report).unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.read(&report.filename).unwrap().width, 9000);
    }

    #[test]
    fn test_delete_all_empties_the_store() {
        let (_guard, store) = store();
        store.write(&fixtures::passing_report("uuid-1")).unwrap();
        store.write(&fixtures::passing_report("uuid-2")).unwrap();

        assert_eq!(store.delete_all().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_counts_rule_failures() {
        let (_guard, store) = store();

        store.write(&fixtures::passing_report("uuid-ok")).unwrap();

        let mut wide = fixtures::passing_report("uuid-wide");
        wide.width = 9000;
        store.write(&wide).unwrap();

        let mut heavy = fixtures::passing_report("uuid-heavy");
        heavy.size = crate::report::MAX_ASSET_SIZE_BYTES + 1;
        heavy.image_mode = Some("CMYK".to_string());
        store.write(&heavy).unwrap();

        let summary = store.aggregate().unwrap();
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.width_was_issue, 1);
        assert_eq!(summary.size_was_issue, 1);
        assert_eq!(summary.image_mode_was_issue, 1);
        assert_eq!(summary.height_was_issue, 0);
        assert_eq!(summary.artboard_count_was_issue, 0);
        assert_eq!(summary.layer_count_was_issue, 0);
        assert_eq!(summary.smart_object_was_issue, 0);
    }

    #[test]
    fn test_aggregate_skips_unparsable_files() {
        let (_guard, store) = store();
        store.write(&fixtures::passing_report("uuid-1")).unwrap();
        fs::write(store.dir().join("garbage.json"), "not json").unwrap();

        let summary = store.aggregate().unwrap();
        assert_eq!(summary.total_count, 1);
    }

    #[test]
    fn test_list_ignores_non_json_entries() {
        let (_guard, store) = store();
        store.write(&fixtures::passing_report("uuid-1")).unwrap();
        fs::write(store.dir().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }
}
