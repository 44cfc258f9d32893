//! The Small Admin - dashboard data layer.
//!
//! Headless core of the admin dashboard for the food-ordering platform:
//! typed records, the REST transport, per-page data controllers (products,
//! orders, paid/delivered views, customers, special items), and the draft
//! reconciliation engine behind every batch-editable page.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod collab;
pub mod engine;
pub mod models;
pub mod pages;
pub mod query;
pub mod search;
pub mod storage;
pub mod vocab;

pub use engine::{DraftEngine, SaveReport};
pub use query::ListQuery;
pub use vocab::Weekday;

fn log_dir() -> std::path::PathBuf {
    std::env::var("SMALL_ADMIN_LOG_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("the-small-admin").join("logs"))
}

/// Initialize structured logging (console + daily rolling file). Safe to
/// call more than once; later calls are ignored.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,the_small_admin_lib=debug"));

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&log_dir, "admin");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let console_layer = fmt::layer().with_target(true);
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        // Keep the guard alive for the lifetime of the process — dropping it
        // flushes and stops the background log writer.
        std::mem::forget(guard);
        info!("The Small Admin data layer v{}", env!("CARGO_PKG_VERSION"));
    }
}
