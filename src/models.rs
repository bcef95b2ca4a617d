//! Data models for the statistics dashboard.
//!
//! This module contains the core data structures shared by the ingestion,
//! aggregation, and rendering layers, along with the domain error type.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Width of every age bracket, in years.
pub const BRACKET_WIDTH: u32 = 15;

/// Upper bound (exclusive) of the bracketed age range. Ages at or above
/// this value fall outside the bin set and are dropped.
pub const AGE_CEILING: u32 = 105;

/// Errors surfaced by the aggregation layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// The population table has no column for the requested year.
    #[error("no data available for year {0}")]
    YearUnavailable(i32),

    /// A required column is absent from the input table.
    #[error("missing required column `{0}`")]
    MissingColumn(String),
}

/// A fixed-width age bracket, identified by its lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgeBracket {
    /// Inclusive lower bound of the bracket.
    pub lo: u32,
}

impl AgeBracket {
    /// Returns the bracket containing `age`, or `None` when the age lies
    /// beyond the bracketed range.
    pub fn containing(age: u32) -> Option<Self> {
        if age >= AGE_CEILING {
            return None;
        }
        Some(Self {
            lo: (age / BRACKET_WIDTH) * BRACKET_WIDTH,
        })
    }

    /// Inclusive upper bound of the bracket.
    pub fn hi(&self) -> u32 {
        self.lo + BRACKET_WIDTH - 1
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi())
    }
}

/// One age bracket of a population distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketSummary {
    /// Bracket label, e.g. `"15-29"`.
    pub label: String,
    /// Summed population count for the selected year.
    pub count: f64,
    /// Share of the grand total, in percent. Zero when the total is zero.
    pub percentage: f64,
}

/// One parsed row of a mortality table.
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityRecord {
    /// Administrative region the row belongs to.
    pub territory: String,
    /// Cause-of-death label.
    pub cause: String,
    /// Reference year of the observation.
    pub year: i32,
    /// Observed value (typically a death count).
    pub value: f64,
}

/// Summed values per cause for a single territory, in label order.
pub type CauseSummary = BTreeMap<String, f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_assignment() {
        assert_eq!(AgeBracket::containing(0), Some(AgeBracket { lo: 0 }));
        assert_eq!(AgeBracket::containing(14), Some(AgeBracket { lo: 0 }));
        assert_eq!(AgeBracket::containing(15), Some(AgeBracket { lo: 15 }));
        assert_eq!(AgeBracket::containing(104), Some(AgeBracket { lo: 90 }));
        assert_eq!(AgeBracket::containing(105), None);
        assert_eq!(AgeBracket::containing(130), None);
    }

    #[test]
    fn test_bracket_bounds_contain_age() {
        for age in 0..AGE_CEILING {
            let bracket = AgeBracket::containing(age).unwrap();
            assert!(bracket.lo <= age && age <= bracket.hi());
            assert_eq!(bracket.hi() - bracket.lo + 1, BRACKET_WIDTH);
        }
    }

    #[test]
    fn test_bracket_label() {
        assert_eq!(AgeBracket { lo: 0 }.to_string(), "0-14");
        assert_eq!(AgeBracket { lo: 90 }.to_string(), "90-104");
    }

    #[test]
    fn test_data_error_display() {
        let err = DataError::YearUnavailable(2019);
        assert_eq!(err.to_string(), "no data available for year 2019");

        let err = DataError::MissingColumn("Value".to_string());
        assert!(err.to_string().contains("Value"));
    }
}
