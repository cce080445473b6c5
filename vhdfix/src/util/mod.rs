use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use vhdfix_shared::errors::{VhdfixError, VhdfixResult};

/// Find an external binary.
///
/// # Arguments
/// * `binary_name` - Name of the binary to find (e.g., "qemu-img")
/// * `explicit` - Path configured by the user; when set it is the only candidate
///
/// # Returns
/// * `Ok(PathBuf)` - Path to an executable file
/// * `Err(...)` - No executable found in any expected location
pub fn find_binary(binary_name: &str, explicit: Option<&Path>) -> VhdfixResult<PathBuf> {
    find_binary_in(binary_name, explicit, std::env::var_os("PATH"))
}

fn find_binary_in(
    binary_name: &str,
    explicit: Option<&Path>,
    search_path: Option<OsString>,
) -> VhdfixResult<PathBuf> {
    let found = match explicit {
        Some(path) => which::which(path).map_err(|e| {
            VhdfixError::Engine(format!(
                "Binary '{}' not found at {}: {}",
                binary_name,
                path.display(),
                e
            ))
        })?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            which::which_in(binary_name, search_path, cwd).map_err(|e| {
                VhdfixError::Engine(format!(
                    "Binary '{}' not found in PATH: {}",
                    binary_name, e
                ))
            })?
        }
    };

    tracing::debug!(binary = %found.display(), "Found binary");
    Ok(found)
}

/// Install the global subscriber, logging to stderr.
///
/// Stdout is reserved for the size report, so stderr is the only sink.
/// `default_filter` applies when RUST_LOG is unset or invalid. The returned
/// guard flushes buffered lines when dropped and must outlive the run.
pub fn init_logging(default_filter: &str) -> WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(false)
                .without_time()
                .with_ansi(false),
        )
        .try_init();

    guard
}
