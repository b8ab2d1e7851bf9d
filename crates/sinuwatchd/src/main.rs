// # sinuwatchd - WebSinu grade-watch agent
//
// Thin integration layer only: reads configuration from the environment,
// wires the portal source, the ntfy notifier and the file snapshot store
// into the GradeWatcher, runs one full pass and exits. All watch logic
// lives in sinuwatch-core; scheduling repeated runs belongs to cron or a
// systemd timer, not to this binary.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Accounts
// - `SINUWATCH_ACCOUNTS`: Comma-separated list of account identifiers
// - `<ID>_WEBSINU_USERNAME`: Portal username for account `<ID>`
// - `<ID>_WEBSINU_PASSWORD`: Portal password for account `<ID>`
//
// An account whose credentials are missing is still listed in the run; the
// engine skips it with a notification instead of failing the whole batch.
//
// ### Notifications
// - `NTFY_TOPIC_URL`: Full ntfy publish URL (required)
//
// ### Snapshots
// - `SINUWATCH_SNAPSHOT_DIR`: Directory for snapshot files (default ".")
//
// ### Engine
// - `SINUWATCH_ACCOUNT_DELAY_SECS`: Pause between accounts (default 5)
// - `SINUWATCH_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// export SINUWATCH_ACCOUNTS=ANA,MIHAI
// export ANA_WEBSINU_USERNAME=ana.pop
// export ANA_WEBSINU_PASSWORD=secret
// export MIHAI_WEBSINU_USERNAME=mihai.ionescu
// export MIHAI_WEBSINU_PASSWORD=secret2
// export NTFY_TOPIC_URL=https://ntfy.sh/my-grades
// export SINUWATCH_SNAPSHOT_DIR=/var/lib/sinuwatch
//
// sinuwatchd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use sinuwatch_core::{AccountConfig, EngineConfig, GradeWatcher, WatchConfig};
use sinuwatch_core::state::FileSnapshotStore;
use sinuwatch_ntfy::NtfyNotifier;
use sinuwatch_portal::PortalClient;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum AgentExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AgentExitCode> for ExitCode {
    fn from(code: AgentExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    accounts: Vec<AccountConfig>,
    ntfy_topic_url: String,
    snapshot_dir: String,
    account_delay_secs: u64,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Credentials are looked up per account under `<ID>_WEBSINU_USERNAME`
    /// and `<ID>_WEBSINU_PASSWORD`; a missing pair leaves the account in
    /// the list for the engine to skip and report.
    fn from_env() -> Result<Self> {
        let account_ids: Vec<String> = env::var("SINUWATCH_ACCOUNTS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let accounts = account_ids
            .into_iter()
            .map(|id| {
                let mut account = AccountConfig::new(&id);
                account.username = env::var(format!("{id}_WEBSINU_USERNAME")).ok();
                account.password = env::var(format!("{id}_WEBSINU_PASSWORD")).ok();
                account
            })
            .collect();

        Ok(Self {
            accounts,
            ntfy_topic_url: env::var("NTFY_TOPIC_URL").unwrap_or_default(),
            snapshot_dir: env::var("SINUWATCH_SNAPSHOT_DIR")
                .unwrap_or_else(|_| ".".to_string()),
            account_delay_secs: env::var("SINUWATCH_ACCOUNT_DELAY_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()
                .map_err(|e| {
                    anyhow::anyhow!("SINUWATCH_ACCOUNT_DELAY_SECS is not a number: {e}")
                })?
                .unwrap_or(5),
            log_level: env::var("SINUWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            anyhow::bail!(
                "SINUWATCH_ACCOUNTS must contain at least one account identifier. \
                Set it via: export SINUWATCH_ACCOUNTS=ANA,MIHAI"
            );
        }

        if self.ntfy_topic_url.is_empty() {
            anyhow::bail!(
                "NTFY_TOPIC_URL is required. \
                Set it via: export NTFY_TOPIC_URL=https://ntfy.sh/your-topic"
            );
        }
        if !self.ntfy_topic_url.starts_with("https://")
            && !self.ntfy_topic_url.starts_with("http://")
        {
            anyhow::bail!(
                "NTFY_TOPIC_URL must use HTTP or HTTPS scheme. Got: {}",
                self.ntfy_topic_url
            );
        }

        if self.snapshot_dir.is_empty() {
            anyhow::bail!("SINUWATCH_SNAPSHOT_DIR cannot be empty");
        }

        if self.account_delay_secs > 3600 {
            anyhow::bail!(
                "SINUWATCH_ACCOUNT_DELAY_SECS must be at most 3600 seconds. Got: {}",
                self.account_delay_secs
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "SINUWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Convert into the core watch configuration
    fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            accounts: self.accounts.clone(),
            ntfy_topic_url: self.ntfy_topic_url.clone(),
            engine: EngineConfig {
                account_delay_secs: self.account_delay_secs,
                ..EngineConfig::default()
            },
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return AgentExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return AgentExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return AgentExitCode::ConfigError.into();
    }

    info!("Starting sinuwatchd agent");
    info!("Configuration loaded: {} account(s)", config.accounts.len());

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return AgentExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_agent(config).await {
            error!("Agent error: {e}");
            AgentExitCode::RuntimeError
        } else {
            AgentExitCode::CleanShutdown
        }
    })
    .into()
}

/// Run one full watch pass
async fn run_agent(config: Config) -> Result<()> {
    let watch_config = config.watch_config();
    watch_config.validate()?;

    let source = PortalClient::new();
    let notifier = NtfyNotifier::new(&watch_config.ntfy_topic_url)?;
    let snapshots = FileSnapshotStore::new(&config.snapshot_dir).await?;

    info!("Snapshot directory: {}", config.snapshot_dir);
    for account in &watch_config.accounts {
        if account.has_credentials() {
            info!("Watching account: {}", account.id);
        } else {
            warn!("Account {} has no credentials and will be skipped", account.id);
        }
    }

    let (watcher, mut events) = GradeWatcher::new(
        Box::new(source),
        Box::new(notifier),
        Box::new(snapshots),
        watch_config.accounts,
        watch_config.engine,
    )?;

    // Surface engine events in the log while the pass runs
    let event_logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            info!(?event, "engine event");
        }
    });

    info!("Starting grade watch pass");
    let result = watcher.run().await;

    drop(watcher);
    let _ = event_logger.await;

    result?;
    info!("Grade watch pass completed");
    Ok(())
}
