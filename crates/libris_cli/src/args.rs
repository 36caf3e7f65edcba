//! Command-line and environment configuration.

use clap::Parser;
use libris_core::default_log_level;
use std::path::PathBuf;

/// Interactive in-memory book catalog.
#[derive(Debug, Clone, Parser)]
#[command(name = "libris", version)]
pub struct Args {
    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "LIBRIS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, env = "LIBRIS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Start with an empty catalog.
    #[arg(long, env = "LIBRIS_NO_SEED")]
    pub no_seed: bool,
}

impl Args {
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("libris").join("logs"))
    }
}
