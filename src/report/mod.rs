//! Dashboard assembly.
//!
//! This module turns the configured input tables into the final HTML
//! page (or a JSON dump of the aggregated distributions).

pub mod dashboard;

pub use dashboard::{build_dashboard, build_json};
