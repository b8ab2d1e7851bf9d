// # Grade Source Trait
//
// Defines the interface for fetching one account's current grade records.
//
// ## Implementations
//
// - WebSinu portal: `sinuwatch-portal` crate
//
// ## Contract
//
// One call performs the whole authenticated round trip for one account:
// login handshake, records-page request, row extraction. The session
// (cookies, token) lives only inside the call and is discarded before it
// returns; nothing is reused across accounts or runs.
//
// Sources are single-shot and must not retry internally; a failed attempt
// is terminal for that account in that run, and the engine decides what to
// do with the failure. Sources must not touch the snapshot store or the
// notifier; those are owned by the engine.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::GradeRecord;

/// Login credentials for one portal account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Trait for grade source implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait GradeSource: Send + Sync {
    /// Authenticate and fetch the current records for one account
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<GradeRecord>)`: extracted records in page order; an empty
    ///   vector is returned as-is, and the engine decides how to treat it
    /// - `Err(Error)`: network, auth, protocol, or extraction failure;
    ///   the error aborts this account only
    async fn fetch_grades(&self, credentials: &Credentials) -> Result<Vec<GradeRecord>>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
