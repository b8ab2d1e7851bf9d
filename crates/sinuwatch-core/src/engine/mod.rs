//! Core grade-watch engine
//!
//! The GradeWatcher is responsible for:
//! - Loading the previous snapshot per account
//! - Fetching current records via GradeSource
//! - Diffing and classifying new/changed grades
//! - Pushing per-delta notifications via Notifier
//! - Replacing the snapshot after each account
//!
//! ## Pipeline
//!
//! ```text
//! for each account (fixed order, pacing delay between):
//!     SnapshotStore::load ──► GradeSource::fetch_grades ──► diff
//!                                                            │
//!              SnapshotStore::save ◄── Notifier::notify ◄────┘
//! ```
//!
//! Processing is strictly sequential: no operation overlaps another for the
//! same account, and accounts never run in parallel. All failures are
//! account-scoped: one account's failure never prevents the next account
//! from being processed. Nothing is retried within a run.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{AccountConfig, EngineConfig};
use crate::diff::{GradeDiff, diff};
use crate::error::{Error, Result};
use crate::traits::{Credentials, GradeSource, Notifier, SnapshotStore};

/// Default notification title when nothing more specific applies
const DEFAULT_TITLE: &str = "WebSinu Grades Update";

/// Events emitted by the GradeWatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run started
    Started { accounts_count: usize },

    /// Account skipped before fetching (e.g. missing credentials)
    AccountSkipped { account_id: String, reason: String },

    /// Account processed to completion
    AccountCompleted {
        account_id: String,
        new_count: usize,
        changed_count: usize,
        first_run: bool,
    },

    /// Account aborted by a fetch/auth/persistence failure
    AccountFailed {
        account_id: String,
        category: &'static str,
        error: String,
    },

    /// Run finished (all accounts attempted)
    Stopped,
}

/// Core grade-watch engine
///
/// One instance drives one full pass over the configured accounts and then
/// returns; scheduling repeated runs is the caller's concern.
///
/// ## Lifecycle
///
/// 1. Create with [`GradeWatcher::new()`]
/// 2. Drive a pass with [`GradeWatcher::run()`]
/// 3. Drop to cleanup
pub struct GradeWatcher {
    /// Source of current grade records
    source: Box<dyn GradeSource>,

    /// Notification sink (shared, best-effort)
    notifier: Box<dyn Notifier>,

    /// Snapshot persistence
    snapshots: Box<dyn SnapshotStore>,

    /// Accounts to process, in order
    accounts: Vec<AccountConfig>,

    /// Pause between accounts (seconds)
    account_delay_secs: u64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl GradeWatcher {
    /// Create a new grade watcher
    ///
    /// # Returns
    ///
    /// A tuple of (watcher, event_receiver) where event_receiver yields
    /// engine events for monitoring and tests
    pub fn new(
        source: Box<dyn GradeSource>,
        notifier: Box<dyn Notifier>,
        snapshots: Box<dyn SnapshotStore>,
        accounts: Vec<AccountConfig>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let watcher = Self {
            source,
            notifier,
            snapshots,
            accounts,
            account_delay_secs: config.account_delay_secs,
            event_tx: tx,
        };

        Ok((watcher, rx))
    }

    /// Run one full pass over the configured accounts
    ///
    /// # Returns
    ///
    /// - `Ok(())`: all accounts attempted (individual accounts may have failed)
    /// - `Err(Error)`: a process-level precondition failure only
    pub async fn run(&self) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            accounts_count: self.accounts.len(),
        });

        info!(source = self.source.source_name(), accounts = self.accounts.len(),
            "grade watch run starting");
        self.notify_best_effort(
            "WebSinu grades agent started!",
            "Agent Status",
            &["robot"],
        )
        .await;

        let last_index = self.accounts.len().saturating_sub(1);
        for (index, account) in self.accounts.iter().enumerate() {
            self.process_account(account).await;

            // Cooperative pacing between accounts, never after the last one
            if index < last_index && self.account_delay_secs > 0 {
                debug!(secs = self.account_delay_secs, "pausing before next account");
                tokio::time::sleep(tokio::time::Duration::from_secs(self.account_delay_secs))
                    .await;
            }
        }

        info!("all account checks completed");
        self.notify_best_effort(
            "All WebSinu grade checks completed!",
            "Agent Batch Complete",
            &["checkmark", "bell"],
        )
        .await;

        self.emit_event(EngineEvent::Stopped);
        Ok(())
    }

    /// Process one account end to end; failures are contained here
    async fn process_account(&self, account: &AccountConfig) {
        info!(account = %account.id, "processing account");

        if !account.has_credentials() {
            warn!(account = %account.id, "credentials missing, skipping account");
            self.notify_best_effort(
                &format!(
                    "WebSinu credentials missing for account '{}'. Skipping.",
                    account.id
                ),
                "WebSinu Agent Error",
                &["error", "x"],
            )
            .await;
            self.emit_event(EngineEvent::AccountSkipped {
                account_id: account.id.clone(),
                reason: "missing credentials".to_string(),
            });
            return;
        }

        self.notify_best_effort(
            &format!("Agent started checking for account '{}'.", account.id),
            "Agent Status",
            &["robot", "sync"],
        )
        .await;

        match self.check_account(account).await {
            Ok((diff_result, first_run)) => {
                self.emit_event(EngineEvent::AccountCompleted {
                    account_id: account.id.clone(),
                    new_count: diff_result.new_records.len(),
                    changed_count: diff_result.changed.len(),
                    first_run,
                });
            }
            Err(e) => {
                error!(account = %account.id, category = e.category(), error = %e,
                    "account run aborted");
                self.notify_failure(&account.id, &e).await;
                self.emit_event(EngineEvent::AccountFailed {
                    account_id: account.id.clone(),
                    category: e.category(),
                    error: e.to_string(),
                });
            }
        }
    }

    /// Load, fetch, diff, notify and save for one account
    async fn check_account(&self, account: &AccountConfig) -> Result<(GradeDiff, bool)> {
        // has_credentials() was checked by the caller
        let credentials = Credentials::new(
            account.username.clone().unwrap_or_default(),
            account.password.clone().unwrap_or_default(),
        );

        let previous = self.snapshots.load(&account.id).await?;
        let current = self.source.fetch_grades(&credentials).await?;
        if current.is_empty() {
            // An empty extraction and a silently changed page shape look the
            // same from here; keep the previous snapshot instead of wiping
            // the baseline and re-baselining on the next run
            return Err(Error::extraction("no grade rows extracted from records page"));
        }
        info!(account = %account.id, count = current.len(), "fetched current grades");

        let first_run = previous.is_empty();
        let diff_result = if first_run {
            // Nothing to compare against; a flood of "new grade" messages
            // on the very first check would be noise
            info!(account = %account.id, "no previous snapshot, saving baseline");
            self.notify_best_effort(
                &format!(
                    "First grade check completed for {}. Found {} grades. \
                     Will notify on changes.",
                    account.id,
                    current.len()
                ),
                DEFAULT_TITLE,
                &["info"],
            )
            .await;
            GradeDiff::default()
        } else {
            let diff_result = diff(&previous, &current);
            self.report_deltas(&account.id, &diff_result).await;
            diff_result
        };

        // Replace the snapshot wholesale. A write failure is reported, but
        // notifications already sent are not rolled back.
        self.snapshots.save(&account.id, &current).await?;

        Ok((diff_result, first_run))
    }

    /// Send one notification per new record and per change
    async fn report_deltas(&self, account_id: &str, diff_result: &GradeDiff) {
        for entry in &diff_result.new_records {
            let msg = format!(
                "New grade for {}: {} is {} (on {})",
                account_id, entry.subject, entry.grade, entry.date
            );
            info!(account = account_id, subject = %entry.subject, grade = %entry.grade,
                "new grade");
            self.notify_best_effort(
                &msg,
                &format!("New WebSinu Grade for {account_id}!"),
                &["new", "sparkles"],
            )
            .await;
        }

        for entry in &diff_result.changed {
            let msg = format!(
                "Grade for {}: {} changed from {} to {} (on {})",
                account_id, entry.subject, entry.old_grade, entry.new_grade, entry.date
            );
            info!(account = account_id, subject = %entry.subject,
                old = %entry.old_grade, new = %entry.new_grade, "grade changed");
            self.notify_best_effort(
                &msg,
                &format!("WebSinu Grade Changed for {account_id}!"),
                &["changed", "warning"],
            )
            .await;
        }

        if diff_result.is_empty() {
            info!(account = account_id, "no new or changed grades");
            self.notify_best_effort(
                &format!("No new grades found for {account_id}. All good."),
                DEFAULT_TITLE,
                &["check"],
            )
            .await;
        }
    }

    /// Best-effort failure notification describing the error category
    async fn notify_failure(&self, account_id: &str, error: &Error) {
        let (message, tags): (String, &[&str]) = match error {
            Error::Auth { .. } => (
                format!(
                    "WebSinu login failed for {account_id}. \
                     Check credentials or site changes."
                ),
                &["error", "x"],
            ),
            Error::Snapshot(_) => (
                format!("Snapshot write failed for {account_id}. Check logs."),
                &["warning", "exclamation"],
            ),
            other => (
                format!(
                    "Failed to retrieve grades for {account_id} ({} error). Check logs.",
                    other.category()
                ),
                &["warning", "exclamation"],
            ),
        };
        self.notify_best_effort(&message, "WebSinu Agent Error", tags)
            .await;
    }

    /// Deliver a notification, logging failure instead of propagating it
    async fn notify_best_effort(&self, message: &str, title: &str, tags: &[&str]) {
        if let Err(e) = self.notifier.notify(message, title, tags).await {
            warn!(sink = self.notifier.notifier_name(), error = %e,
                "notification delivery failed");
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Dropping on a full channel bounds memory if nobody is draining events
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping engine event");
        }
    }
}
