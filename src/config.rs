//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `demograf.toml` files. The configuration is an explicit structure
//! passed into the assembler, never process-wide globals.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Population analysis settings.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Mortality analysis settings.
    #[serde(default)]
    pub mortality: MortalityConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Population table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Territory name to population CSV path. One chart per entry.
    #[serde(default)]
    pub files: BTreeMap<String, String>,

    /// Year column to aggregate.
    #[serde(default = "default_population_year")]
    pub year: i32,

    /// Header name of the age column.
    #[serde(default = "default_age_column")]
    pub age_column: String,

    /// Minimum percentage for a bracket to appear on the pie chart.
    #[serde(default = "default_threshold")]
    pub min_percent: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            year: default_population_year(),
            age_column: default_age_column(),
            min_percent: default_threshold(),
        }
    }
}

fn default_population_year() -> i32 {
    2019
}

fn default_age_column() -> String {
    "Età".to_string()
}

fn default_threshold() -> f64 {
    5.0
}

/// Mortality table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortalityConfig {
    /// Path to the mortality CSV. All territories share one table.
    #[serde(default)]
    pub file: String,

    /// Year to filter the table to.
    #[serde(default = "default_mortality_year")]
    pub year: i32,

    /// Minimum raw value for a cause to appear on the bar chart.
    ///
    /// Unlike `population.min_percent` this is an absolute value, not a
    /// percentage. The two thresholds are deliberately separate settings.
    #[serde(default = "default_threshold")]
    pub min_value: f64,

    /// Case-insensitive substring marking aggregate "total" rows, which
    /// are excluded to avoid double counting.
    #[serde(default = "default_total_marker")]
    pub total_marker: String,

    /// Header names of the required columns.
    #[serde(default)]
    pub columns: MortalityColumns,
}

impl Default for MortalityConfig {
    fn default() -> Self {
        Self {
            file: String::new(),
            year: default_mortality_year(),
            min_value: default_threshold(),
            total_marker: default_total_marker(),
            columns: MortalityColumns::default(),
        }
    }
}

fn default_mortality_year() -> i32 {
    2021
}

fn default_total_marker() -> String {
    "Totale".to_string()
}

/// Column header names of a mortality table.
///
/// Defaults match the ISTAT causes-of-death export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortalityColumns {
    /// Year column.
    #[serde(default = "default_time_column")]
    pub time: String,

    /// Territory column.
    #[serde(default = "default_territory_column")]
    pub territory: String,

    /// Cause-of-death label column.
    #[serde(default = "default_cause_column")]
    pub cause: String,

    /// Value column.
    #[serde(default = "default_value_column")]
    pub value: String,
}

impl Default for MortalityColumns {
    fn default() -> Self {
        Self {
            time: default_time_column(),
            territory: default_territory_column(),
            cause: default_cause_column(),
            value: default_value_column(),
        }
    }
}

fn default_time_column() -> String {
    "TIME".to_string()
}

fn default_territory_column() -> String {
    "Territorio".to_string()
}

fn default_cause_column() -> String {
    "Causa iniziale di morte - European Short List".to_string()
}

fn default_value_column() -> String {
    "Value".to_string()
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new("demograf.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(year) = args.population_year {
            self.population.year = year;
        }
        if let Some(year) = args.mortality_year {
            self.mortality.year = year;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut config = Config::default();
        config
            .population
            .files
            .insert("Example".to_string(), "data/example.csv".to_string());
        config.mortality.file = "data/mortality.csv".to_string();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.population.year, 2019);
        assert_eq!(config.mortality.year, 2021);
        assert_eq!(config.population.age_column, "Età");
        assert_eq!(config.mortality.total_marker, "Totale");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[population]
year = 2020
age_column = "Age"
min_percent = 2.5

[population.files]
Bari = "data/bari.csv"
Lecce = "data/lecce.csv"

[mortality]
file = "data/deaths.csv"
year = 2021

[mortality.columns]
time = "Time"
territory = "Territory"
cause = "Cause"
value = "Value"

[server]
port = 9000
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.population.year, 2020);
        assert_eq!(config.population.age_column, "Age");
        assert_eq!(config.population.min_percent, 2.5);
        assert_eq!(config.population.files.len(), 2);
        assert_eq!(
            config.population.files.get("Bari").map(String::as_str),
            Some("data/bari.csv")
        );
        assert_eq!(config.mortality.columns.territory, "Territory");
        assert_eq!(config.server.port, 9000);
        // Unset fields keep their defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.mortality.min_value, 5.0);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[population]"));
        assert!(toml_str.contains("[mortality]"));
        assert!(toml_str.contains("[server]"));

        // Round-trips through the parser
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.mortality.file, "data/mortality.csv");
    }
}
