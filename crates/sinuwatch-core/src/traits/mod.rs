//! Core traits for the grade-watch system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`GradeSource`]: Fetch the current grade records for one account
//! - [`Notifier`]: Push user-facing messages to an external sink
//! - [`SnapshotStore`]: Persist the last-seen records per account

pub mod grade_source;
pub mod notifier;
pub mod snapshot_store;

pub use grade_source::{Credentials, GradeSource};
pub use notifier::Notifier;
pub use snapshot_store::SnapshotStore;
