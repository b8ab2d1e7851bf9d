// # sinuwatch-core
//
// Core library for the sinuwatch grade-watch agent.
//
// ## Architecture Overview
//
// This library provides the account-sequential grade pipeline:
// - **GradeSource**: Trait for fetching the current grade records of one account
// - **Notifier**: Trait for pushing user-facing messages
// - **SnapshotStore**: Trait for persisting the last-seen records per account
// - **GradeWatcher**: Engine that orchestrates load → fetch → diff → notify → save
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Portal scraping and push delivery live in
//    dedicated crates; the core only sees the traits
// 2. **Sequential**: Accounts are processed one at a time, in list order,
//    with a pacing delay between them
// 3. **Account-Scoped Failures**: One account's failure never prevents the
//    remaining accounts from being processed
// 4. **Library-First**: The engine can be embedded without the daemon

pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod record;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{AccountConfig, EngineConfig, WatchConfig};
pub use diff::{GradeChange, GradeDiff, diff};
pub use engine::{EngineEvent, GradeWatcher};
pub use error::{Error, Result};
pub use record::GradeRecord;
pub use state::{FileSnapshotStore, MemorySnapshotStore};
pub use traits::{GradeSource, Notifier, SnapshotStore};
