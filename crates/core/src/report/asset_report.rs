//! The compatibility report value type.
//!
//! Rule verdicts are computed accessors over the stored measurements, never
//! stored themselves: `status()` cannot go stale relative to the fields it
//! is derived from. The serialized shape materializes the verdicts for
//! consumers of the report JSON.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ReportError;

/// At most one artboard; conflated with groups by the manifest.
pub const MAX_ARTBOARD_COUNT: u64 = 1;
/// Width and height ceiling, pixels.
pub const MAX_PIXEL_DIMENSION: u64 = 8000;
/// Asset size ceiling: 496 MiB.
pub const MAX_ASSET_SIZE_BYTES: u64 = 520_093_696;
/// Layer-count ceiling.
pub const MAX_LAYER_COUNT: u64 = 20;

/// One compatibility evaluation of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetReport {
    /// Report store key; asset-uuid derived when the uuid is known.
    pub filename: String,
    #[serde(default)]
    pub asset_name: String,
    #[serde(default)]
    pub asset_path: String,
    #[serde(default)]
    pub asset_uuid: String,

    // Structural counts from the manifest layer tree
    pub artboard_count: u64,
    #[serde(default)]
    pub layer_count: u64,
    #[serde(default)]
    pub smart_object_count: u64,
    #[serde(default)]
    pub text_layer_count: u64,
    /// Defined for the report shape; no detection path sets it yet.
    #[serde(default)]
    pub text_layer_style_count: u64,

    // Document attributes
    #[serde(default)]
    pub bit_depth: Option<u32>,
    pub width: u64,
    pub height: u64,
    #[serde(default)]
    pub icc_profile_name: Option<String>,
    #[serde(default)]
    pub image_mode: Option<String>,
    pub size: u64,
}

impl AssetReport {
    pub fn artboard_count_ok(&self) -> bool {
        self.artboard_count <= MAX_ARTBOARD_COUNT
    }

    pub fn width_ok(&self) -> bool {
        self.width <= MAX_PIXEL_DIMENSION
    }

    pub fn height_ok(&self) -> bool {
        self.height <= MAX_PIXEL_DIMENSION
    }

    pub fn size_ok(&self) -> bool {
        self.size <= MAX_ASSET_SIZE_BYTES
    }

    pub fn image_mode_ok(&self) -> bool {
        match &self.image_mode {
            Some(mode) => !mode.eq_ignore_ascii_case("cmyk"),
            None => true,
        }
    }

    pub fn layer_count_ok(&self) -> bool {
        self.layer_count <= MAX_LAYER_COUNT
    }

    pub fn smart_object_count_ok(&self) -> bool {
        self.smart_object_count == 0
    }

    /// Overall verdict: "ok" iff every rule passes. Always recomputed.
    pub fn status(&self) -> &'static str {
        let ok = self.artboard_count_ok()
            && self.width_ok()
            && self.height_ok()
            && self.size_ok()
            && self.image_mode_ok()
            && self.layer_count_ok()
            && self.smart_object_count_ok();
        if ok {
            "ok"
        } else {
            "error"
        }
    }

    /// Full report JSON with rule verdicts and status materialized.
    pub fn to_report_json(&self) -> Value {
        let mut value = serde_json::to_value(self).expect("report serializes");
        let extra = json!({
            "artboardCountOk": self.artboard_count_ok(),
            "widthOk": self.width_ok(),
            "heightOk": self.height_ok(),
            "sizeOk": self.size_ok(),
            "imageModeOk": self.image_mode_ok(),
            "layerCountOk": self.layer_count_ok(),
            "smartObjectCountOk": self.smart_object_count_ok(),
            "status": self.status(),
        });
        value
            .as_object_mut()
            .expect("report is an object")
            .extend(extra.as_object().unwrap().clone());
        value
    }

    /// Parse a persisted report. The materialized verdicts are ignored;
    /// they are recomputed from the stored measurements.
    pub fn from_report_json(value: &Value) -> Result<Self, ReportError> {
        serde_json::from_value(value.clone()).map_err(|e| ReportError::MalformedReport {
            reason: e.to_string(),
        })
    }

    /// Human-readable rendering written back to the asset as a comment.
    pub fn to_comment_text(&self) -> String {
        format!(
            "Express compatibility audit\n\
             status: {}\n\
             artboard count: {} (ok: {})\n\
             layer count: {} (ok: {})\n\
             smart object count: {} (ok: {})\n\
             width: {} (ok: {})\n\
             height: {} (ok: {})\n\
             size: {} (ok: {})\n\
             image mode: {} (ok: {})\n\
             bit depth: {}\n\
             icc profile: {}",
            self.status(),
            self.artboard_count,
            self.artboard_count_ok(),
            self.layer_count,
            self.layer_count_ok(),
            self.smart_object_count,
            self.smart_object_count_ok(),
            self.width,
            self.width_ok(),
            self.height,
            self.height_ok(),
            self.size,
            self.size_ok(),
            self.image_mode.as_deref().unwrap_or("na"),
            self.image_mode_ok(),
            self.bit_depth
                .map(|b| b.to_string())
                .unwrap_or_else(|| "na".to_string()),
            self.icc_profile_name.as_deref().unwrap_or("na"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn passing_report() -> AssetReport {
        AssetReport {
            filename: "uuid-1-asset-report.json".to_string(),
            asset_name: "hero.psd".to_string(),
            asset_path: "/content/dam/brand/hero.psd".to_string(),
            asset_uuid: "uuid-1".to_string(),
            artboard_count: 1,
            layer_count: 3,
            smart_object_count: 0,
            text_layer_count: 1,
            text_layer_style_count: 0,
            bit_depth: Some(8),
            width: 4000,
            height: 4000,
            icc_profile_name: Some("sRGB IEC61966-2.1".to_string()),
            image_mode: Some("rgb".to_string()),
            size: 1000,
        }
    }

    #[test]
    fn test_all_rules_pass() {
        let report = passing_report();
        assert_eq!(report.status(), "ok");
    }

    // status is the AND of all rule booleans: flip each rule independently

    #[test]
    fn test_artboard_count_violation() {
        let mut report = passing_report();
        report.artboard_count = 2;
        assert!(!report.artboard_count_ok());
        assert_eq!(report.status(), "error");
    }

    #[test]
    fn test_width_violation() {
        let mut report = passing_report();
        report.width = 9000;
        assert!(!report.width_ok());
        assert_eq!(report.status(), "error");
    }

    #[test]
    fn test_height_violation() {
        let mut report = passing_report();
        report.height = 8001;
        assert!(!report.height_ok());
        assert_eq!(report.status(), "error");
    }

    #[test]
    fn test_size_violation() {
        let mut report = passing_report();
        report.size = MAX_ASSET_SIZE_BYTES + 1;
        assert!(!report.size_ok());
        assert_eq!(report.status(), "error");
    }

    #[test]
    fn test_image_mode_violation() {
        let mut report = passing_report();
        report.image_mode = Some("CMYK".to_string());
        assert!(!report.image_mode_ok());
        assert_eq!(report.status(), "error");
    }

    #[test]
    fn test_layer_count_violation() {
        let mut report = passing_report();
        report.layer_count = MAX_LAYER_COUNT + 1;
        assert!(!report.layer_count_ok());
        assert_eq!(report.status(), "error");
    }

    #[test]
    fn test_smart_object_violation() {
        let mut report = passing_report();
        report.smart_object_count = 1;
        assert!(!report.smart_object_count_ok());
        assert_eq!(report.status(), "error");
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let mut report = passing_report();
        report.width = MAX_PIXEL_DIMENSION;
        report.height = MAX_PIXEL_DIMENSION;
        report.size = MAX_ASSET_SIZE_BYTES;
        report.layer_count = MAX_LAYER_COUNT;
        report.artboard_count = MAX_ARTBOARD_COUNT;
        assert_eq!(report.status(), "ok");
    }

    #[test]
    fn test_missing_image_mode_passes() {
        let mut report = passing_report();
        report.image_mode = None;
        assert!(report.image_mode_ok());
    }

    #[test]
    fn test_report_json_materializes_verdicts() {
        let mut report = passing_report();
        report.width = 9000;
        let value = report.to_report_json();

        assert_eq!(value["widthOk"], false);
        assert_eq!(value["heightOk"], true);
        assert_eq!(value["status"], "error");
        assert_eq!(value["artboardCount"], 1);
        assert_eq!(value["textLayerStyleCount"], 0);
    }

    #[test]
    fn test_report_json_round_trip_preserves_status_inputs() {
        let mut report = passing_report();
        report.image_mode = Some("cmyk".to_string());
        report.smart_object_count = 2;

        let value = report.to_report_json();
        let parsed = AssetReport::from_report_json(&value).unwrap();

        assert_eq!(parsed, report);
        assert_eq!(parsed.status(), report.status());
    }
}
