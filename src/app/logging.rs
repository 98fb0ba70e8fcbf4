//! Usage: Process-wide tracing setup (stdout + daily-rolling file under the app dot-dir).

use crate::app_paths;
use std::sync::OnceLock;
use tracing_subscriber::layer::SubscriberExt;

// Dropping the guard would lose buffered log lines, so it lives for the
// whole process.
static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

pub(crate) fn init(app: &tauri::AppHandle) {
    // Route `log` records from tauri/wry and other deps into tracing.
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    let file_layer = match app_paths::app_log_dir(app) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "score-analyzer-desktop.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(writer),
            )
        }
        Err(err) => {
            eprintln!("log file disabled, failed to resolve log dir: {err}");
            None
        }
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);
    let _ = tracing::subscriber::set_global_default(subscriber);
}
