// # Memory Snapshot Store
//
// In-memory implementation of SnapshotStore.
//
// ## Purpose
//
// Snapshot storage that doesn't persist across restarts. Every run after a
// restart behaves like a first run (everything reported as new), so this is
// only suitable for tests and embedding scenarios that manage their own
// persistence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::record::GradeRecord;
use crate::traits::snapshot_store::SnapshotStore;

/// In-memory snapshot store implementation
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    inner: Arc<RwLock<HashMap<String, Vec<GradeRecord>>>>,
}

impl MemorySnapshotStore {
    /// Create a new empty memory snapshot store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of accounts with a stored snapshot
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, account_id: &str) -> Result<Vec<GradeRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(account_id).cloned().unwrap_or_default())
    }

    async fn save(&self, account_id: &str, records: &[GradeRecord]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(account_id.to_string(), records.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_account_loads_empty() {
        let store = MemorySnapshotStore::new();
        assert!(store.load("STUDENT_A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let store = MemorySnapshotStore::new();
        let records = vec![GradeRecord {
            year: "1".into(),
            semester: "1".into(),
            subject: "Algebra".into(),
            kind: "Examen".into(),
            date: "2024-01-10".into(),
            grade: "9".into(),
        }];

        store.save("STUDENT_A", &records).await.unwrap();
        assert_eq!(store.load("STUDENT_A").await.unwrap(), records);
        assert_eq!(store.len().await, 1);
    }
}
