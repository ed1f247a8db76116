//! Job correlation records.
//!
//! A record is created by the entry webhook when a manifest request is
//! submitted, looked up by the completion webhook under the external job id,
//! and either marked complete or discarded when retries are exhausted.
//! Records not cleaned up explicitly expire through the store TTL.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{KvStore, StoreError};

/// Store TTL for job records: 18 000 seconds (five hours).
pub const JOB_RECORD_TTL_SECS: u64 = 18_000;

/// One in-flight audit job, keyed by the external job id.
///
/// Repository metadata is snapshotted at submission time so the completion
/// handler does not need a second repository fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: String,
    pub repository_host: String,
    pub asset_path: String,
    pub presigned_download_url: String,
    pub asset_size_bytes: u64,
    pub asset_uuid: String,
    pub asset_name: String,
    pub raw_asset_metadata: Value,
    /// Incremented on every completion delivery; bounds retries.
    pub process_pass_count: u32,
    /// Idempotency guard: a completed job ignores redeliveries.
    pub processing_complete: bool,
    pub created_at: DateTime<Utc>,
}

/// Job record persistence over the KV store.
pub struct JobStore {
    kv: Arc<dyn KvStore>,
}

impl JobStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn get(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        let Some(raw) = self.kv.get(job_id)? else {
            return Ok(None);
        };

        let record = serde_json::from_str(&raw).map_err(|e| StoreError::Serialization {
            key: job_id.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(record))
    }

    /// Persist a record under its job id with the standard TTL.
    pub fn put(&self, record: &JobRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record).map_err(|e| StoreError::Serialization {
            key: record.job_id.clone(),
            reason: e.to_string(),
        })?;
        self.kv.put_with_ttl(&record.job_id, &raw, JOB_RECORD_TTL_SECS)
    }

    pub fn delete(&self, job_id: &str) -> Result<(), StoreError> {
        self.kv.delete(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteKvStore;
    use serde_json::json;

    pub(crate) fn test_record(job_id: &str) -> JobRecord {
        JobRecord {
            job_id: job_id.to_string(),
            repository_host: "https://author.example.com".to_string(),
            asset_path: "/content/dam/brand/hero.psd".to_string(),
            presigned_download_url: "https://delivery.example.com/hero?sig=abc".to_string(),
            asset_size_bytes: 1_048_576,
            asset_uuid: "urn:aaid:aem:4123".to_string(),
            asset_name: "hero.psd".to_string(),
            raw_asset_metadata: json!({"dc:format": "image/vnd.adobe.photoshop"}),
            process_pass_count: 0,
            processing_complete: false,
            created_at: Utc::now(),
        }
    }

    fn store() -> JobStore {
        JobStore::new(Arc::new(SqliteKvStore::in_memory().unwrap()))
    }

    #[test]
    fn test_put_then_get_round_trips() {
        let store = store();
        let record = test_record("job-1");
        store.put(&record).unwrap();

        let fetched = store.get("job-1").unwrap().unwrap();
        assert_eq!(fetched.job_id, "job-1");
        assert_eq!(fetched.asset_path, record.asset_path);
        assert_eq!(fetched.process_pass_count, 0);
        assert!(!fetched.processing_complete);
    }

    #[test]
    fn test_get_absent_job() {
        let store = store();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_put_overwrites_pass_count() {
        let store = store();
        let mut record = test_record("job-1");
        store.put(&record).unwrap();

        record.process_pass_count = 3;
        store.put(&record).unwrap();

        let fetched = store.get("job-1").unwrap().unwrap();
        assert_eq!(fetched.process_pass_count, 3);
    }

    #[test]
    fn test_delete() {
        let store = store();
        store.put(&test_record("job-1")).unwrap();
        store.delete("job-1").unwrap();
        assert!(store.get("job-1").unwrap().is_none());
    }

    #[test]
    fn test_serialized_field_names_are_camel_case() {
        let record = test_record("job-1");
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("jobId").is_some());
        assert!(value.get("presignedDownloadUrl").is_some());
        assert!(value.get("processPassCount").is_some());
        assert!(value.get("processingComplete").is_some());
    }
}
