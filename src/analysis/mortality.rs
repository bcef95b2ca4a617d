//! Per-territory aggregation of mortality causes.

use crate::models::{CauseSummary, MortalityRecord};
use std::collections::BTreeMap;
use tracing::debug;

/// Sum the value column per (territory, cause) for the target year.
///
/// Rows whose cause label contains `total_marker` (case-insensitive) are
/// aggregate rows and excluded to avoid double counting. Every territory
/// present in the year-filtered table keeps a key even when the exclusion
/// leaves it with no causes; such a territory maps to an empty summary.
///
/// Values stay raw. Percentage conversion happens nowhere in this path;
/// the bar-chart threshold downstream operates on these absolute values.
pub fn aggregate_causes(
    records: &[MortalityRecord],
    year: i32,
    total_marker: &str,
) -> BTreeMap<String, CauseSummary> {
    let marker = total_marker.to_lowercase();

    let mut by_territory: BTreeMap<String, CauseSummary> = BTreeMap::new();
    for record in records.iter().filter(|r| r.year == year) {
        let summary = by_territory.entry(record.territory.clone()).or_default();

        if record.cause.to_lowercase().contains(&marker) {
            continue;
        }
        *summary.entry(record.cause.clone()).or_insert(0.0) += record.value;
    }

    debug!(
        "Aggregated causes for {} territories (year {})",
        by_territory.len(),
        year
    );
    by_territory
}
