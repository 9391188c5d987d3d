//! Tracing setup.
//!
//! The TUI owns stdout and the alternate screen, so log records go to a
//! file instead. Logging is off unless `-verbose` is given or `RUST_LOG`
//! is set.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Log file created in the working directory.
pub const LOG_FILE_NAME: &str = "blobphish.log";

/// Filter used by `-verbose` when `RUST_LOG` is absent.
const VERBOSE_FILTER: &str = "debug";

/// Install the global subscriber if logging is wanted.
pub fn init(config: &Config) -> io::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let Some(directive) = filter_directive(config.verbose, rust_log.as_deref()) else {
        return Ok(());
    };

    let file = create_log_file(Path::new("."))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-verbose` means debug; otherwise no logging.
fn filter_directive(verbose: bool, rust_log: Option<&str>) -> Option<String> {
    match rust_log {
        Some(directive) => Some(directive.to_string()),
        None if verbose => Some(VERBOSE_FILTER.to_string()),
        None => None,
    }
}

/// Create (truncating) the log file inside `dir`.
fn create_log_file(dir: &Path) -> io::Result<File> {
    File::create(dir.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn logging_is_off_by_default() {
        assert_eq!(filter_directive(false, None), None);
    }

    #[test]
    fn verbose_enables_debug() {
        assert_eq!(filter_directive(true, None).as_deref(), Some("debug"));
    }

    #[test]
    fn rust_log_overrides_verbose() {
        assert_eq!(
            filter_directive(true, Some("blobphish=trace")).as_deref(),
            Some("blobphish=trace")
        );
        assert_eq!(filter_directive(false, Some("warn")).as_deref(), Some("warn"));
    }

    #[test]
    fn log_file_is_created_in_the_given_directory() {
        let dir = TempDir::new().unwrap();
        let _file = create_log_file(dir.path()).unwrap();
        assert!(dir.path().join(LOG_FILE_NAME).is_file());
    }

    #[test]
    fn log_file_creation_fails_in_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(create_log_file(&dir.path().join("absent")).is_err());
    }
}
