//! Logging setup
//!
//! Console output by default; optionally a daily-rotated file under the
//! configured log directory. Filtering follows `RUST_LOG`, defaulting
//! to info for the diamond crates.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::model::Configuration;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,diamond_server=info,diamond_core=info,diamond_persistence=info")
    })
}

/// Initialise the global subscriber. The returned guard must stay alive
/// for the process lifetime when file logging is enabled.
pub fn init_logging(configuration: &Configuration) -> Option<WorkerGuard> {
    let console = fmt::layer().with_target(true);

    if configuration.log_to_file() {
        let appender =
            RollingFileAppender::new(Rotation::DAILY, configuration.log_dir(), "diamond.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file = fmt::layer().with_writer(writer).with_ansi(false);

        tracing_subscriber::registry()
            .with(console.and_then(file).with_filter(env_filter()))
            .init();
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(console.with_filter(env_filter()))
            .init();
        None
    }
}
