//! Log file setup
//!
//! Every retry, rate-limit hit, timeout and terminal failure is logged, and
//! for batch runs the log file is the only record of which apps failed.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::error::Result;

/// Line layout: `2024-09-30 14:02:11 - WARN - message`
fn format_line(
    buf: &mut env_logger::fmt::Formatter,
    record: &log::Record<'_>,
) -> std::io::Result<()> {
    writeln!(
        buf,
        "{} - {} - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

/// Build the logger, appending to `log_file` or writing to stderr.
fn builder(log_file: Option<&Path>, debug: bool) -> Result<Builder> {
    let mut builder = Builder::new();
    builder
        .filter_level(if debug { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .format(format_line);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    } else {
        builder.target(Target::Stderr);
    }

    Ok(builder)
}

/// Install the global logger. Calling it twice keeps the first logger.
pub fn init(log_file: Option<&Path>, debug: bool) -> Result<()> {
    let mut builder = builder(log_file, debug)?;
    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builder_creates_log_directory() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("logs").join("api_errors.log");

        let builder = builder(Some(&path), false);

        assert!(builder.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_builder_bare_file_name() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("plain.log");
        assert!(builder(Some(&path), true).is_ok());
    }

    #[test]
    fn test_builder_stderr() {
        assert!(builder(None, false).is_ok());
    }
}
