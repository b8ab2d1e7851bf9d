// # Notifier Trait
//
// Defines the interface for pushing user-facing messages.
//
// ## Implementations
//
// - ntfy topic: `sinuwatch-ntfy` crate
//
// ## Contract
//
// Delivery is best-effort: the engine logs a failed notification and moves
// on, it never aborts an account because a push did not go through.
// Notifiers are single-shot: no retry, no queueing, no background tasks.

use async_trait::async_trait;

use crate::error::Result;

/// Trait for notification sink implementations
///
/// # Thread Safety
///
/// The sink is shared across the whole run; implementations must be safe to
/// call from async tasks, though the engine only ever calls sequentially.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message
    ///
    /// # Parameters
    ///
    /// - `message`: plain-text body
    /// - `title`: short headline
    /// - `tags`: ntfy-style tag names, rendered by the sink as it sees fit
    async fn notify(&self, message: &str, title: &str, tags: &[&str]) -> Result<()>;

    /// Get the sink name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}
