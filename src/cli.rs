use std::path::PathBuf;

use clap::{Parser, builder::RangedU64ValueParser};
use tracing_subscriber::{EnvFilter, fmt};

use crate::history::DEFAULT_HISTORY_SIZE;

/// Command-line arguments for the library catalog shell
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Load books and users from a JSON fixture instead of the sample data
    #[arg(long, value_name = "PATH", conflicts_with = "empty")]
    pub seed_file: Option<PathBuf>,

    /// Start with an empty catalog
    #[arg(long)]
    pub empty: bool,

    /// Number of loan records kept for the history view
    #[arg(
        long,
        default_value_t = DEFAULT_HISTORY_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub history_size: usize,

    /// Enable verbose output with detailed operation logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Disable colored menu output
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Log filter used when `RUST_LOG` is not set
    #[must_use]
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }

    /// Install the global tracing subscriber, writing to stderr so the menu
    /// on stdout stays readable.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn init_logging(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_log_filter()));
        let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
        if self.log_json { builder.json().try_init() } else { builder.try_init() }
    }
}
