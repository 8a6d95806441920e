//! # register: Command-line Till
//!
//! Wires the till crates together for one command at a time.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Register Startup                                │
//! │                                                                         │
//! │  1. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: info,till=debug,sqlx=warn; override with RUST_LOG        │
//! │                                                                         │
//! │  2. Load Configuration                                                  │
//! │     • register.toml + TILL_* overrides, validated                       │
//! │                                                                         │
//! │  3. Connect to Database                                                 │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │                                                                         │
//! │  4. checkout only: start the notification worker                        │
//! │     • SpoolNotifier when spool_dir is set, LogNotifier otherwise        │
//! │                                                                         │
//! │  5. Run the command, then drain the notification queue                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod request;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::RegisterConfig;
use till_db::{Database, DbConfig};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till_db=trace` - Trace the database crate only
/// - Default: `info,till=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured database, creating its directory if needed.
pub async fn open_database(config: &RegisterConfig) -> anyhow::Result<Database> {
    let path = &config.database.path;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create data directory {}", dir.display()))?;
    }

    let db = Database::new(DbConfig::new(path).max_connections(config.database.max_connections))
        .await
        .with_context(|| format!("cannot open database {}", path.display()))?;

    info!(path = %path.display(), "Database ready");
    Ok(db)
}
