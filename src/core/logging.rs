use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "pdftune.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber: stderr console output plus a daily
/// rolling file in `log_dir`.
///
/// Stdout is left to command output. When the log directory is unusable
/// logging continues on the console only, and the problem is reported as a
/// warning once the subscriber is in place.
pub fn init(log_dir: &Path) {
    let mut problems = Vec::new();

    if let Err(err) = std::fs::create_dir_all(log_dir) {
        problems.push(format!(
            "cannot create log directory {}: {}",
            log_dir.display(),
            err
        ));
    }

    let file_layer = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
    {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        Err(err) => {
            problems.push(format!("file logging disabled: {}", err));
            None
        }
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        problems.push(format!("logging was already initialized: {}", err));
    }

    for problem in problems {
        tracing::warn!("{}", problem);
    }
}
