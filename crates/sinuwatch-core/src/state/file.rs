// # File Snapshot Store
//
// File-based implementation of SnapshotStore: one JSON file per account.
//
// ## File Layout
//
// `<dir>/previous_grades_<account>.json`, holding:
//
// ```json
// {
//   "version": "1.0",
//   "saved_at": "2025-01-09T12:00:00Z",
//   "records": [
//     { "year": "1", "semester": "1", "subject": "Algebra",
//       "type": "Examen", "date": "2024-01-10", "grade": "9" }
//   ]
// }
// ```
//
// A bare top-level array (the pre-envelope format) is still accepted on load.
//
// ## Durability
//
// - Atomic writes: new snapshot written to a temp file, then renamed
// - Corruption: an unreadable or unparsable file degrades to an empty
//   snapshot with a warn log; the next save overwrites it

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::record::GradeRecord;
use crate::traits::snapshot_store::SnapshotStore;

/// Snapshot file format version
/// Used for future migration if format changes
const SNAPSHOT_FILE_VERSION: &str = "1.0";

/// Serializable snapshot file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SnapshotFileFormat {
    version: String,
    saved_at: chrono::DateTime<chrono::Utc>,
    records: Vec<GradeRecord>,
}

/// File-based snapshot store, one JSON file per account
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub async fn new<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();

        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(&dir).await.map_err(|e| {
                Error::snapshot(format!(
                    "failed to create snapshot directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self { dir })
    }

    /// Path of the snapshot file for one account
    fn snapshot_path(&self, account_id: &str) -> PathBuf {
        self.dir.join(format!("previous_grades_{account_id}.json"))
    }

    fn temp_path(&self, account_id: &str) -> PathBuf {
        self.dir
            .join(format!("previous_grades_{account_id}.json.tmp"))
    }

    /// Account ids become file names; refuse anything that could escape `dir`
    fn validate_account_id(account_id: &str) -> Result<(), Error> {
        if account_id.is_empty()
            || account_id.contains(['/', '\\'])
            || account_id.contains("..")
        {
            return Err(Error::snapshot(format!(
                "invalid account identifier for snapshot file: '{account_id}'"
            )));
        }
        Ok(())
    }

    /// Parse snapshot content, accepting both the envelope and the bare-array format
    fn parse_snapshot(content: &str) -> Result<Vec<GradeRecord>, serde_json::Error> {
        match serde_json::from_str::<SnapshotFileFormat>(content) {
            Ok(file) => {
                if file.version != SNAPSHOT_FILE_VERSION {
                    tracing::warn!(
                        expected = SNAPSHOT_FILE_VERSION,
                        got = %file.version,
                        "snapshot file version mismatch, loading anyway"
                    );
                }
                Ok(file.records)
            }
            Err(_) => serde_json::from_str::<Vec<GradeRecord>>(content),
        }
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self, account_id: &str) -> Result<Vec<GradeRecord>, Error> {
        Self::validate_account_id(account_id)?;
        let path = self.snapshot_path(account_id);

        if !path.exists() {
            tracing::debug!(account = account_id, path = %path.display(),
                "no previous snapshot, starting empty");
            return Ok(Vec::new());
        }

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(account = account_id, path = %path.display(), error = %e,
                    "snapshot unreadable, starting empty");
                return Ok(Vec::new());
            }
        };

        match Self::parse_snapshot(&content) {
            Ok(records) => {
                tracing::debug!(account = account_id, count = records.len(),
                    "loaded previous snapshot");
                Ok(records)
            }
            Err(e) => {
                tracing::warn!(account = account_id, path = %path.display(), error = %e,
                    "snapshot corrupt, starting empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, account_id: &str, records: &[GradeRecord]) -> Result<(), Error> {
        Self::validate_account_id(account_id)?;

        let file = SnapshotFileFormat {
            version: SNAPSHOT_FILE_VERSION.to_string(),
            saved_at: chrono::Utc::now(),
            records: records.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        // Write to a temp file first, then rename into place
        let temp_path = self.temp_path(account_id);
        {
            let mut f = fs::File::create(&temp_path).await.map_err(|e| {
                Error::snapshot(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            f.write_all(json.as_bytes()).await.map_err(|e| {
                Error::snapshot(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            f.flush().await.map_err(|e| {
                Error::snapshot(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        let path = self.snapshot_path(account_id);
        fs::rename(&temp_path, &path).await.map_err(|e| {
            Error::snapshot(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::debug!(account = account_id, count = records.len(), path = %path.display(),
            "snapshot saved");
        Ok(())
    }
}
