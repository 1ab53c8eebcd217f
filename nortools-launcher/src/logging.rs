use std::ffi::OsString;
use std::path::PathBuf;

use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Directory to write `nortools-launcher.log` into. Logging stays off when unset.
pub const LOG_DIR_ENV: &str = "NORTOOLS_LAUNCHER_LOG_DIR";
pub const LOG_FILE: &str = "nortools-launcher.log";

/// Installs a file subscriber when [`LOG_DIR_ENV`] points at an existing directory.
///
/// The returned guard flushes the writer when dropped and has to outlive every
/// event that should reach the file.
pub fn init() -> Result<Option<WorkerGuard>> {
    let Some(dir) = log_dir(std::env::var_os(LOG_DIR_ENV)) else {
        return Ok(None);
    };

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(non_blocking)
            .with_ansi(false)
            .finish(),
    )?;

    Ok(Some(guard))
}

/// Installs the `color_eyre` hooks and the optional log file.
///
/// Neither failure is fatal. `init` fails when a global subscriber already
/// exists, and that subscriber receives the warnings.
pub fn setup() -> Option<WorkerGuard> {
    let reporting = color_eyre::install();

    let guard = match init() {
        Ok(guard) => guard,
        Err(error) => {
            tracing::warn!("unable to set up the log file: {error}");
            None
        }
    };

    if let Err(error) = reporting {
        tracing::warn!("unable to install error reporting: {error}");
    }

    guard
}

fn log_dir(value: Option<OsString>) -> Option<PathBuf> {
    value
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .filter(|dir| dir.is_dir())
}
