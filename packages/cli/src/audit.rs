//! Per-run audit trail: timestamped log file plus copies of every input.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::{CliError, Result};

/// Audit trail for one command execution.
///
/// Everything the run touches is keyed by a `YYYYMMDD_HHMM` prefix: the log
/// file gets full detail, and every input file is copied next to it so a
/// failed submission can be replayed by hand.
pub struct AuditTrail {
    prefix: String,
    dir: PathBuf,
    log_path: PathBuf,
}

impl AuditTrail {
    /// Create the audit directory and pick this run's prefix.
    pub fn create(dir: &Path) -> Result<Self> {
        let prefix = chrono::Local::now().format("%Y%m%d_%H%M").to_string();
        fs::create_dir_all(dir)?;
        let log_path = dir.join(format!("{prefix}.log"));
        Ok(Self {
            prefix,
            dir: dir.to_path_buf(),
            log_path,
        })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Copy an input file under this run's prefix.
    pub fn copy_input(&self, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .ok_or_else(|| CliError::Config(format!("not a file: {}", source.display())))?;
        let dest = self
            .dir
            .join(format!("{}_{}", self.prefix, name.to_string_lossy()));
        fs::copy(source, &dest)?;
        tracing::debug!(source = %source.display(), copy = %dest.display(), "input copied");
        Ok(dest)
    }

    /// Install the dual subscriber: full detail to the log file, filtered
    /// detail to the console.
    pub fn init_logging(&self, debug: bool) -> Result<()> {
        let file = File::create(&self.log_path)?;
        let console_level = if debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_filter(LevelFilter::DEBUG),
            )
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_filter(console_level),
            )
            .try_init()
            .map_err(|e| CliError::Config(format!("logging setup failed: {e}")))
    }
}

/// Plain stderr subscriber for commands without an audit trail.
///
/// WARN by default, `RUST_LOG` respected.
pub fn init_console_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .try_init()
        .map_err(|e| CliError::Config(format!("logging setup failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_timestamp_shaped() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditTrail::create(dir.path()).unwrap();
        // YYYYMMDD_HHMM
        assert_eq!(audit.prefix().len(), 13);
        assert_eq!(audit.prefix().as_bytes()[8], b'_');
        assert!(audit
            .prefix()
            .chars()
            .all(|c| c.is_ascii_digit() || c == '_'));
        assert!(audit.log_path().starts_with(dir.path()));
    }

    #[test]
    fn test_copy_input_uses_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditTrail::create(dir.path()).unwrap();

        let source = dir.path().join("receipt.pdf");
        fs::write(&source, b"%PDF-1.4").unwrap();

        let copy = audit.copy_input(&source).unwrap();
        assert!(copy
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("_receipt.pdf"));
        assert_eq!(fs::read(&copy).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_copy_input_rejects_pathless_source() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditTrail::create(dir.path()).unwrap();
        assert!(audit.copy_input(Path::new("/")).is_err());
    }
}
