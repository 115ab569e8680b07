use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::uptime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber: compact stdout output, plus a daily
/// rolling file under `log_dir` when one is given.
///
/// Keep the returned guard alive for as long as file logging should flush.
pub fn setup_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_timer(uptime()).compact();

    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "juice-storefront");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let file = fmt::layer().with_ansi(false).with_writer(writer);
            tracing_subscriber::registry().with(env_filter).with(stdout).with(file).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(env_filter).with(stdout).init();
            None
        }
    }
}
