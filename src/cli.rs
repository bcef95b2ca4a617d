//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Demograf - population and mortality statistics dashboard
///
/// Aggregates demographic CSV tables into age-bracket and cause-of-death
/// distributions and serves them as pie and bar charts on a single HTML
/// page.
///
/// Examples:
///   demograf --config demograf.toml
///   demograf --port 9000 --population-year 2018
///   demograf --once --output dashboard.html
///   demograf --once --format json --output distributions.json
///   demograf --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for demograf.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server bind address
    #[arg(long, value_name = "HOST", env = "DEMOGRAF_HOST")]
    pub host: Option<String>,

    /// Server bind port
    #[arg(short, long, value_name = "PORT", env = "DEMOGRAF_PORT")]
    pub port: Option<u16>,

    /// Year column to aggregate in the population tables
    #[arg(long, value_name = "YEAR")]
    pub population_year: Option<i32>,

    /// Year to filter the mortality table to
    #[arg(long, value_name = "YEAR")]
    pub mortality_year: Option<i32>,

    /// Render the dashboard once and exit instead of serving
    #[arg(long)]
    pub once: bool,

    /// Output file path for --once
    #[arg(short, long, default_value = "dashboard.html", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format for --once (html, json)
    #[arg(long, default_value = "html", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default demograf.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for --once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Self-contained HTML page (default)
    #[default]
    Html,
    /// JSON dump of the aggregated distributions
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.exists() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        if self.port == Some(0) {
            return Err("Port must be at least 1".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
