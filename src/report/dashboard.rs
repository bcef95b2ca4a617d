//! HTML dashboard generation.
//!
//! For each configured territory this module runs the aggregation and
//! rendering pipeline and concatenates the resulting charts, with one
//! heading per chart, into a single self-contained HTML document. The
//! page is rebuilt from the source tables on every call; nothing is
//! cached between invocations.

use crate::analysis::{aggregate_causes, aggregate_population};
use crate::chart;
use crate::config::Config;
use crate::ingest::{load_mortality, PopulationTable};
use crate::models::{BracketSummary, CauseSummary};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Aggregated distributions for every configured territory.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    /// Year the population distributions refer to.
    pub population_year: i32,
    /// Year the mortality summaries refer to.
    pub mortality_year: i32,
    /// Age-bracket distribution per territory.
    pub population: BTreeMap<String, Vec<BracketSummary>>,
    /// Cause totals per territory.
    pub mortality: BTreeMap<String, CauseSummary>,
}

/// Load and aggregate all configured tables.
pub fn collect_data(config: &Config) -> Result<DashboardData> {
    let mut population = BTreeMap::new();
    for (territory, path) in &config.population.files {
        let table = PopulationTable::load(Path::new(path))?;
        let summaries = aggregate_population(
            &table,
            config.population.year,
            &config.population.age_column,
        )
        .with_context(|| format!("Population analysis failed for {}", territory))?;
        population.insert(territory.clone(), summaries);
    }

    let mortality = if config.mortality.file.is_empty() {
        warn!("No mortality table configured, skipping cause analysis");
        BTreeMap::new()
    } else {
        let records = load_mortality(Path::new(&config.mortality.file), &config.mortality.columns)?;
        aggregate_causes(&records, config.mortality.year, &config.mortality.total_marker)
    };

    info!(
        "Collected data for {} population and {} mortality territories",
        population.len(),
        mortality.len()
    );

    Ok(DashboardData {
        population_year: config.population.year,
        mortality_year: config.mortality.year,
        population,
        mortality,
    })
}

/// Generate the complete HTML dashboard.
pub fn build_dashboard(config: &Config) -> Result<String> {
    let data = collect_data(config)?;
    let mut body = String::new();

    for (territory, summaries) in &data.population {
        let labels: Vec<String> = summaries.iter().map(|s| s.label.clone()).collect();
        let percentages: Vec<f64> = summaries.iter().map(|s| s.percentage).collect();

        let title = format!(
            "Population by Age Bracket - {} ({})",
            territory, data.population_year
        );
        let png = chart::render_pie(&labels, &percentages, &title, config.population.min_percent)?;

        body.push_str(&format!("<h3>{}</h3>\n", escape(&title)));
        body.push_str(&image_tag(&png, &title));
    }

    for (territory, causes) in &data.mortality {
        let title = format!("Causes of Death - {} ({})", territory, data.mortality_year);
        body.push_str(&format!("<h3>{}</h3>\n", escape(&title)));

        if causes.is_empty() {
            body.push_str("<p>No data available for this territory.</p>\n");
            continue;
        }

        let labels: Vec<String> = causes.keys().cloned().collect();
        let values: Vec<f64> = causes.values().copied().collect();
        let png = chart::render_bars(&labels, &values, &title, config.mortality.min_value)?;
        body.push_str(&image_tag(&png, &title));
    }

    Ok(wrap_page(&body))
}

/// Serialize the aggregated distributions as pretty-printed JSON.
pub fn build_json(config: &Config) -> Result<String> {
    let data = collect_data(config)?;
    serde_json::to_string_pretty(&data).map_err(Into::into)
}

/// Wrap the chart sections into a full HTML document.
fn wrap_page(body: &str) -> String {
    let mut page = String::new();

    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str("<title>Population and Mortality Analysis</title>\n");
    page.push_str("</head>\n<body>\n");
    page.push_str("<h1>Population and Mortality Analysis</h1>\n");
    page.push_str(body);
    page.push_str(&format!(
        "<footer><p>Generated at {}</p></footer>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    page.push_str("</body>\n</html>\n");

    page
}

/// Inline a PNG as a base64 `data:` image tag.
fn image_tag(png: &[u8], alt: &str) -> String {
    format!(
        "<img src=\"data:image/png;base64,{}\" alt=\"{}\">\n",
        STANDARD.encode(png),
        escape(alt)
    )
}

/// Minimal HTML escaping for text interpolated into the page.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MortalityColumns};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn test_config(dir: &TempDir) -> Config {
        let population_csv = "\
Età,2019
5,10
5,10
20,5
20,5
95,1
Totale,31
";
        let mortality_csv = "\
Territorio,TIME,\"Causa iniziale di morte - European Short List\",Value
Bari,2021,tumori,150
Bari,2021,malattie circolatorie,80
Bari,2021,Totale,230
Foggia,2021,Totale,90
Lecce,2020,tumori,40
";
        let mut config = Config::default();
        config
            .population
            .files
            .insert("Bari".to_string(), write_file(dir, "bari.csv", population_csv));
        config.mortality.file = write_file(dir, "deaths.csv", mortality_csv);
        config
    }

    #[test]
    fn test_collect_data() {
        let dir = TempDir::new().unwrap();
        let data = collect_data(&test_config(&dir)).unwrap();

        let brackets = &data.population["Bari"];
        assert_eq!(brackets.len(), 3);
        let sum: f64 = brackets.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);

        // Lecce is 2020-only, so it drops out of the 2021 view entirely;
        // Foggia had only a total row and keeps an empty summary.
        assert_eq!(data.mortality.len(), 2);
        assert_eq!(data.mortality["Bari"]["tumori"], 150.0);
        assert!(data.mortality["Foggia"].is_empty());
    }

    #[test]
    fn test_build_dashboard() {
        let dir = TempDir::new().unwrap();
        let html = build_dashboard(&test_config(&dir)).unwrap();

        assert!(html.contains("<h1>Population and Mortality Analysis</h1>"));
        assert!(html.contains("Population by Age Bracket - Bari (2019)"));
        assert!(html.contains("Causes of Death - Bari (2021)"));
        assert!(html.contains("data:image/png;base64,"));
        // Foggia has no retained causes
        assert!(html.contains("Causes of Death - Foggia (2021)"));
        assert!(html.contains("No data available for this territory."));
        assert!(html.contains("Generated at"));
    }

    #[test]
    fn test_build_json() {
        let dir = TempDir::new().unwrap();
        let json = build_json(&test_config(&dir)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["population_year"], 2019);
        assert_eq!(value["mortality"]["Bari"]["tumori"], 150.0);
        assert!(value["population"]["Bari"].as_array().unwrap().len() == 3);
    }

    #[test]
    fn test_missing_population_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config
            .population
            .files
            .insert("Ghost".to_string(), "/nonexistent/ghost.csv".to_string());

        assert!(build_dashboard(&config).is_err());
    }

    #[test]
    fn test_missing_year_column_surfaces() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.population.year = 1999;

        let err = build_dashboard(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("1999"));
    }

    #[test]
    fn test_unconfigured_mortality_skipped() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.mortality.file = String::new();

        let html = build_dashboard(&config).unwrap();
        assert!(html.contains("Population by Age Bracket - Bari"));
        assert!(!html.contains("Causes of Death"));
    }

    #[test]
    fn test_custom_mortality_columns() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(&dir);
        config.mortality.file = write_file(
            &dir,
            "deaths_en.csv",
            "Region,Year,Cause,Deaths\nApulia,2021,neoplasms,77\n",
        );
        config.mortality.columns = MortalityColumns {
            time: "Year".to_string(),
            territory: "Region".to_string(),
            cause: "Cause".to_string(),
            value: "Deaths".to_string(),
        };

        let data = collect_data(&config).unwrap();
        assert_eq!(data.mortality["Apulia"]["neoplasms"], 77.0);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b> & \"c\""), "a&lt;b&gt; &amp; &quot;c&quot;");
    }
}
