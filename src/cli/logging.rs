//! Tracing subscriber setup.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::CliError;

/// File name of the JSON-lines event log.
const EVENT_LOG: &str = "events.jsonl";

/// Install the global subscriber.
///
/// Human-readable events go to stderr, filtered by `RUST_LOG` (default
/// `info`). With `json_dir`, every event is also written as one JSON object
/// per line to `json_dir/events.jsonl`. The returned guard flushes that
/// file when dropped, so keep it alive until exit.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub(crate) fn init(json_dir: Option<&Path>) -> Result<Option<WorkerGuard>, CliError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (json_layer, guard) = match json_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|e| {
                CliError::new(format!("Failed to create log directory {}: {e}", dir.display()))
            })?;
            let appender = tracing_appender::rolling::never(dir, EVENT_LOG);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(json_layer)
        .try_init()
        .map_err(|e| CliError::new(format!("Failed to initialize logging: {e}")))?;

    if let Some(dir) = json_dir {
        tracing::info!(path = %dir.join(EVENT_LOG).display(), "event log enabled");
    }
    Ok(guard)
}
