/*!
 * awr_report_analyze — Oracle AWR HTML Report Analyzer (Rust)
 *
 * Extracts a fixed set of performance metrics and the top-SQL table from an
 * Oracle AWR (Automatic Workload Repository) HTML report and derives
 * threshold-based tuning recommendations from them.
 *
 * Two-stage pipeline, pure per input document:
 *
 *   raw HTML -> extract_metrics  -> MetricMap
 *            -> extract_top_sql  -> Vec<TopSqlRow>
 *   MetricMap -> generate_recommendations -> Vec<Recommendation>
 *
 * License: GPLv3+
 */

pub mod error;
pub mod extract;
pub mod metrics;
pub mod rules;
pub mod thresholds;

pub use error::{AwrError, Result};
pub use extract::{extract_metrics, extract_top_sql, TopSqlRow};
pub use metrics::{Metric, MetricMap};
pub use rules::{generate_recommendations, Recommendation, Severity};
pub use thresholds::AlertThresholds;
