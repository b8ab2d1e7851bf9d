//! Configuration types for the grade-watch system
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main watch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Accounts to process, in order
    pub accounts: Vec<AccountConfig>,

    /// Shared ntfy topic URL all notifications go to
    pub ntfy_topic_url: String,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl WatchConfig {
    /// Validate the configuration
    ///
    /// A missing per-account credential is *not* a validation error; the
    /// engine skips (and notifies about) such accounts at run time. A
    /// missing topic URL is fatal: without it no account can be processed.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.accounts.is_empty() {
            return Err(crate::Error::config("no accounts configured"));
        }

        if self.ntfy_topic_url.is_empty() {
            return Err(crate::Error::config("ntfy topic URL cannot be empty"));
        }
        if !self.ntfy_topic_url.starts_with("http://")
            && !self.ntfy_topic_url.starts_with("https://")
        {
            return Err(crate::Error::config(format!(
                "ntfy topic URL must use http or https, got: {}",
                self.ntfy_topic_url
            )));
        }

        for account in &self.accounts {
            if account.id.is_empty() {
                return Err(crate::Error::config("account identifier cannot be empty"));
            }
        }

        self.engine.validate()
    }
}

/// One portal account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Generic identifier used in snapshot file names, logs and notifications
    pub id: String,

    /// Portal username; `None` means the credential was not provided
    pub username: Option<String>,

    /// Portal password; `None` means the credential was not provided
    pub password: Option<String>,
}

impl AccountConfig {
    /// Create a new account configuration
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            password: None,
        }
    }

    /// Set the credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Both credentials present and non-empty
    pub fn has_credentials(&self) -> bool {
        matches!((&self.username, &self.password),
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty())
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pause between accounts, in seconds
    ///
    /// Cooperative pacing so a multi-account run doesn't hammer the portal.
    /// Applied between accounts, not after the last one.
    #[serde(default = "default_account_delay_secs")]
    pub account_delay_secs: u64,

    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.account_delay_secs > 3600 {
            return Err(crate::Error::config(format!(
                "account delay must be at most 3600 seconds, got {}",
                self.account_delay_secs
            )));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            account_delay_secs: default_account_delay_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_account_delay_secs() -> u64 {
    5
}

fn default_event_channel_capacity() -> usize {
    100
}
