/*!
 * thresholds.rs — Configurable alert thresholds for awr_report_analyze
 *
 * Allows tuning of every numeric rule bound from a TOML config file,
 * so you do NOT have to recompile just to change an alert value.
 * Missing keys fall back field-wise to the built-in defaults.
 *
 * License: GPLv3+
 */

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// All configurable thresholds for the recommendation rule table.
/// Percent bounds are on the 0-100 scale; times in the unit the rule's
/// metric reports (log sync in ms, checkpoints in s).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub buffer_hit_pct: f64,       // fire below (default: 90)
    pub parse_calls: f64,          // fire above (default: 300)
    pub library_hit_pct: f64,      // fire below (default: 95)
    pub soft_parse_pct: f64,       // fire below (default: 90)
    pub hard_parses: f64,          // fire above (default: 100)
    pub shared_pool_free_pct: f64, // fire below (default: 10)
    pub memory_usage_pct: f64,     // fire above (default: 90)
    pub pga_cache_hit_pct: f64,    // fire below (default: 60)
    pub physical_reads: f64,       // fire above (default: 10000)
    pub physical_writes: f64,      // fire above (default: 10000)
    pub redo_size_bytes: f64,      // fire above (default: 10 MB)
    pub cpu_utilization_pct: f64,  // fire above (default: 80)
    pub db_time_ratio: f64,        // fire above (default: 90)
    pub sql_response_time_s: f64,  // fire above (default: 1)
    pub latch_misses: f64,         // fire above (default: 100)
    pub log_file_sync_ms: f64,     // fire above (default: 10)
    pub transaction_count: f64,    // fire above (default: 5000)
    pub full_table_scans: f64,     // fire above (default: 1000)
    pub top_sql_buffer_gets: f64,  // fire above (default: 100000)
    pub sorts_disk: f64,           // fire above (default: 1000)
    pub memory_sort_pct: f64,      // fire below (default: 80)
    pub db_files: f64,             // fire above (default: 1000)
    pub log_switches: f64,         // fire above (default: 30)
    pub checkpoint_time_s: f64,    // fire above (default: 5)
    pub log_write_time_ms: f64,    // fire above (default: 10)
    pub logons: f64,               // fire above (default: 100)
    pub session_count: f64,        // fire above (default: 500)
    /// Tolerance factor for the CPU capacity guard: utilization beyond
    /// cores * 100 * factor is treated as a critical extraction anomaly.
    pub cpu_overcommit_factor: f64, // default: 1.2
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            buffer_hit_pct: 90.0,
            parse_calls: 300.0,
            library_hit_pct: 95.0,
            soft_parse_pct: 90.0,
            hard_parses: 100.0,
            shared_pool_free_pct: 10.0,
            memory_usage_pct: 90.0,
            pga_cache_hit_pct: 60.0,
            physical_reads: 10_000.0,
            physical_writes: 10_000.0,
            redo_size_bytes: 10_000_000.0,
            cpu_utilization_pct: 80.0,
            db_time_ratio: 90.0,
            sql_response_time_s: 1.0,
            latch_misses: 100.0,
            log_file_sync_ms: 10.0,
            transaction_count: 5_000.0,
            full_table_scans: 1_000.0,
            top_sql_buffer_gets: 100_000.0,
            sorts_disk: 1_000.0,
            memory_sort_pct: 80.0,
            db_files: 1_000.0,
            log_switches: 30.0,
            checkpoint_time_s: 5.0,
            log_write_time_ms: 10.0,
            logons: 100.0,
            session_count: 500.0,
            cpu_overcommit_factor: 1.2,
        }
    }
}

impl AlertThresholds {
    /// Load thresholds from a TOML file. Keys absent from the file keep
    /// their defaults; an unreadable or unparseable file is an error the
    /// caller decides how to handle.
    ///
    /// Example TOML:
    /// ```toml
    /// buffer_hit_pct = 92.5
    /// logons = 250
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_rule_table() {
        let t = AlertThresholds::default();
        assert_eq!(t.buffer_hit_pct, 90.0);
        assert_eq!(t.redo_size_bytes, 10_000_000.0);
        assert_eq!(t.cpu_overcommit_factor, 1.2);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_absent_keys() {
        let t: AlertThresholds =
            toml::from_str("buffer_hit_pct = 95.0\nlogons = 10.0\n").unwrap();
        assert_eq!(t.buffer_hit_pct, 95.0);
        assert_eq!(t.logons, 10.0);
        assert_eq!(t.parse_calls, 300.0);
        assert_eq!(t.session_count, 500.0);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let t: AlertThresholds = toml::from_str("").unwrap();
        assert_eq!(t.memory_sort_pct, AlertThresholds::default().memory_sort_pct);
    }

    #[test]
    fn unknown_or_bad_toml_is_an_error() {
        assert!(toml::from_str::<AlertThresholds>("buffer_hit_pct = \"high\"").is_err());
    }
}
