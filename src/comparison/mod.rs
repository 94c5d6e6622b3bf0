//! Comparison Engine
//!
//! Pure functions over completed validation results:
//! - `compare`: per-metric and overall winners across several ideas
//! - `diff`: score movement between two versions of one idea
//!
//! Both reject incomplete or malformed input with `Error::InvalidInput`
//! instead of returning a partial report.

pub mod catalog;
pub mod delta;
pub mod winners;

pub use catalog::{MetricCatalog, MetricDef};
pub use delta::{classify, diff, Trend, VersionComparison, CHANGE_THRESHOLD};
pub use winners::{compare, compare_with_catalog, compare_with_recommendation, ComparisonReport};
