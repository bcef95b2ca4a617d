//! Demograf - Population and Mortality Statistics Dashboard
//!
//! Aggregates demographic CSV tables into age-bracket and cause-of-death
//! distributions, renders them as pie and bar charts, and serves the
//! charts inline on a single HTML page.

mod analysis;
mod chart;
mod cli;
mod config;
mod ingest;
mod models;
mod report;
mod server;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Demograf v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Load configuration and apply CLI overrides
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if config.population.files.is_empty() && config.mortality.file.is_empty() {
        warn!("No input tables configured; the dashboard will be empty");
    }

    if args.once {
        return run_once(&args, &config);
    }

    server::serve(config).await
}

/// Handle --init-config: generate a default demograf.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new("demograf.toml");

    if path.exists() {
        eprintln!("demograf.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write demograf.toml")?;

    println!("Created demograf.toml with default settings.");
    println!("Edit it to point at your population and mortality CSV files.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Render the dashboard a single time and write it to the output file.
fn run_once(args: &Args, config: &Config) -> Result<()> {
    let output = match args.format {
        OutputFormat::Html => report::build_dashboard(config)?,
        OutputFormat::Json => report::build_json(config)?,
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write output to {}", args.output.display()))?;

    info!("Dashboard written to {}", args.output.display());
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from demograf.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}
