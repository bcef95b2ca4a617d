//! Aggregation of raw tables into summary distributions.
//!
//! This module turns a population table into an age-bracket distribution
//! and a mortality table into per-territory cause totals.

pub mod mortality;
pub mod population;

pub use mortality::aggregate_causes;
pub use population::aggregate_population;
