//! Mawid — local, single-operator appointment tracking.
//!
//! Tracks appointments in SQLite, derives display statuses from time and
//! acknowledgement state, raises periodic reminders with snooze deferral,
//! and exports presentation-quality card images (a greeting card for one
//! appointment, or a list/report card for the currently visible set).
//! The embedding shell (UI, login, dialogs) lives elsewhere; this crate is
//! the engine behind it.

pub mod assets;
pub mod config;
pub mod db;
pub mod engine;
pub mod export;
pub mod models;
pub mod reminder;
pub mod render;
pub mod status;
pub mod store;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for an embedding shell. `RUST_LOG` wins when set.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
