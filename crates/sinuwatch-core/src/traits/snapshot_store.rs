// # Snapshot Store Trait
//
// Defines the interface for persisting the last-seen records per account.
//
// ## Purpose
//
// The snapshot is what makes the diff meaningful: the previous run's
// extraction result, keyed by account identifier, replaced wholesale at the
// end of each successful run (never merged).
//
// ## Implementations
//
// - File-based: one JSON file per account (`FileSnapshotStore`)
// - In-memory: tests and embedding (`MemorySnapshotStore`)

use async_trait::async_trait;

use crate::error::Result;
use crate::record::GradeRecord;

/// Trait for snapshot store implementations
///
/// # Degradation
///
/// `load` must return an empty sequence when no snapshot exists for the
/// account; implementations are also expected to degrade a *corrupt*
/// snapshot to empty (logging it) rather than failing the account; a bad
/// file means one noisy first-run-style pass, not a dead account.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks, even
/// though the engine accesses the store strictly sequentially.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the previous snapshot for an account
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<GradeRecord>)`: previous records, empty on first run
    /// - `Err(Error)`: storage error (not corruption, see Degradation)
    async fn load(&self, account_id: &str) -> Result<Vec<GradeRecord>>;

    /// Replace the snapshot for an account with the given records
    async fn save(&self, account_id: &str, records: &[GradeRecord]) -> Result<()>;
}
