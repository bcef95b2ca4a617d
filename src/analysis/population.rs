//! Age-bracket aggregation of population tables.

use crate::ingest::PopulationTable;
use crate::models::{AgeBracket, BracketSummary, DataError};
use std::collections::BTreeMap;
use tracing::debug;

/// Bucket a population table into fixed-width age brackets and sum the
/// counts of the `year` column, returning one summary per bracket in
/// ascending bracket order.
///
/// Rows whose age is not an integer (e.g. "Totale", "Non specificata")
/// are dropped. Percentages sum to 100 when the grand total is positive
/// and are all zero when it is not.
pub fn aggregate_population(
    table: &PopulationTable,
    year: i32,
    age_column: &str,
) -> Result<Vec<BracketSummary>, DataError> {
    let age_idx = table.require_column(age_column)?;
    let year_idx = table
        .column(&year.to_string())
        .ok_or(DataError::YearUnavailable(year))?;

    let mut totals: BTreeMap<AgeBracket, f64> = BTreeMap::new();
    for row in table.rows() {
        let age = match row.get(age_idx).and_then(|v| v.trim().parse::<u32>().ok()) {
            Some(age) => age,
            None => continue, // sentinel rows such as "Totale"
        };
        let Some(bracket) = AgeBracket::containing(age) else {
            continue;
        };

        let count = row
            .get(year_idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        *totals.entry(bracket).or_insert(0.0) += count;
    }

    let grand_total: f64 = totals.values().sum();
    debug!(
        "Aggregated {} brackets, total {} for year {}",
        totals.len(),
        grand_total,
        year
    );

    let summaries = totals
        .into_iter()
        .map(|(bracket, count)| BracketSummary {
            label: bracket.to_string(),
            count,
            percentage: if grand_total > 0.0 {
                count / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    Ok(summaries)
}
