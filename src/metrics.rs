/*!
 * metrics.rs — Closed metric vocabulary and the per-report metric map
 *
 * Keys are a fixed enum rather than free strings so the rule table in
 * rules.rs is type-checked against the vocabulary. An absent key means
 * "unknown", never zero: every reader supplies its own default through
 * `MetricMap::get_or`, the one canonical read-with-default.
 *
 * License: GPLv3+
 */

use std::collections::HashMap;
use std::fmt;

/// Every numeric metric the extractor can record or a recommendation rule
/// can read. Values are floats on the scale the report uses: percentages
/// stay 0-100, byte counts stay bytes, K/M/G suffixes are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    BufferCacheHitRatio,
    LibraryHitPct,
    MemoryUsagePct,
    PhysicalReads,
    PhysicalWrites,
    UserCalls,
    DbCpuSeconds,
    CpuUtilizationPct,
    ParseCalls,
    RedoSizeBytes,
    LogicalReads,
    HardParses,
    SoftParsePct,
    LatchHitPct,
    SqlWorkAreaMb,
    Executions,
    Logons,
    CpuIdlePct,
    CpuCores,
    SnapDurationSeconds,
    SharedPoolFreePct,
    PgaCacheHitPct,
    DbTimeRatio,
    SqlResponseTime,
    EnqueueWaits,
    LatchMisses,
    LogFileSync,
    UserCommits,
    UserRollbacks,
    TransactionCount,
    FullTableScans,
    TopSqlBufferGets,
    SortsDisk,
    MemorySortPct,
    DbFiles,
    LogSwitches,
    CheckpointTime,
    LogFileParallelWrite,
    SessionCount,
}

impl Metric {
    /// Stable display order for CLI output and debugging.
    pub const ALL: [Metric; 39] = [
        Metric::BufferCacheHitRatio,
        Metric::LibraryHitPct,
        Metric::MemoryUsagePct,
        Metric::PhysicalReads,
        Metric::PhysicalWrites,
        Metric::UserCalls,
        Metric::DbCpuSeconds,
        Metric::CpuUtilizationPct,
        Metric::ParseCalls,
        Metric::RedoSizeBytes,
        Metric::LogicalReads,
        Metric::HardParses,
        Metric::SoftParsePct,
        Metric::LatchHitPct,
        Metric::SqlWorkAreaMb,
        Metric::Executions,
        Metric::Logons,
        Metric::CpuIdlePct,
        Metric::CpuCores,
        Metric::SnapDurationSeconds,
        Metric::SharedPoolFreePct,
        Metric::PgaCacheHitPct,
        Metric::DbTimeRatio,
        Metric::SqlResponseTime,
        Metric::EnqueueWaits,
        Metric::LatchMisses,
        Metric::LogFileSync,
        Metric::UserCommits,
        Metric::UserRollbacks,
        Metric::TransactionCount,
        Metric::FullTableScans,
        Metric::TopSqlBufferGets,
        Metric::SortsDisk,
        Metric::MemorySortPct,
        Metric::DbFiles,
        Metric::LogSwitches,
        Metric::CheckpointTime,
        Metric::LogFileParallelWrite,
        Metric::SessionCount,
    ];

    /// Canonical snake_case key, as reported in CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Metric::BufferCacheHitRatio => "buffer_cache_hit_ratio",
            Metric::LibraryHitPct => "library_hit_pct",
            Metric::MemoryUsagePct => "memory_usage_pct",
            Metric::PhysicalReads => "physical_reads",
            Metric::PhysicalWrites => "physical_writes",
            Metric::UserCalls => "user_calls",
            Metric::DbCpuSeconds => "db_cpu_seconds",
            Metric::CpuUtilizationPct => "cpu_utilization_pct",
            Metric::ParseCalls => "parse_calls",
            Metric::RedoSizeBytes => "redo_size_bytes",
            Metric::LogicalReads => "logical_reads",
            Metric::HardParses => "hard_parses",
            Metric::SoftParsePct => "soft_parse_pct",
            Metric::LatchHitPct => "latch_hit_pct",
            Metric::SqlWorkAreaMb => "sql_work_area_mb",
            Metric::Executions => "executions",
            Metric::Logons => "logons",
            Metric::CpuIdlePct => "cpu_idle_pct",
            Metric::CpuCores => "cpu_cores",
            Metric::SnapDurationSeconds => "snap_duration_seconds",
            Metric::SharedPoolFreePct => "shared_pool_free_percent",
            Metric::PgaCacheHitPct => "pga_cache_hit_percent",
            Metric::DbTimeRatio => "db_time_ratio",
            Metric::SqlResponseTime => "sql_response_time",
            Metric::EnqueueWaits => "enqueue_waits",
            Metric::LatchMisses => "latch_misses",
            Metric::LogFileSync => "log_file_sync",
            Metric::UserCommits => "user_commits",
            Metric::UserRollbacks => "user_rollbacks",
            Metric::TransactionCount => "transaction_count",
            Metric::FullTableScans => "full_table_scans",
            Metric::TopSqlBufferGets => "top_sql_buffer_gets",
            Metric::SortsDisk => "sorts_disk",
            Metric::MemorySortPct => "memory_sort_percent",
            Metric::DbFiles => "db_files",
            Metric::LogSwitches => "log_switches",
            Metric::CheckpointTime => "checkpoint_time",
            Metric::LogFileParallelWrite => "log_file_parallel_write",
            Metric::SessionCount => "session_count",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Metrics extracted from one AWR report. Numeric values keyed by `Metric`,
/// plus the single string-typed metric (`top_wait_event`) held separately so
/// the value type stays a closed sum instead of an any-type.
///
/// Built fresh per report, discarded after rendering. No ordering guarantee
/// on keys; `set` is last-wins when the same label appears twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricMap {
    values: HashMap<Metric, f64>,
    top_wait_event: Option<String>,
}

impl MetricMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        self.values.insert(metric, value);
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    /// Read a metric with an explicit default for the absent-key case.
    /// This is the only lookup the rule table uses, so each rule's default
    /// is declared exactly once at its call site.
    pub fn get_or(&self, metric: Metric, default: f64) -> f64 {
        self.get(metric).unwrap_or(default)
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.values.contains_key(&metric)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.top_wait_event.is_none()
    }

    pub fn set_top_wait_event(&mut self, event: impl Into<String>) {
        self.top_wait_event = Some(event.into());
    }

    pub fn top_wait_event(&self) -> Option<&str> {
        self.top_wait_event.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_reads_as_caller_default() {
        let m = MetricMap::new();
        assert_eq!(m.get(Metric::BufferCacheHitRatio), None);
        assert_eq!(m.get_or(Metric::BufferCacheHitRatio, 100.0), 100.0);
        assert_eq!(m.get_or(Metric::PhysicalReads, 0.0), 0.0);
    }

    #[test]
    fn set_is_last_wins() {
        let mut m = MetricMap::new();
        m.set(Metric::UserCalls, 10.0);
        m.set(Metric::UserCalls, 25.0);
        assert_eq!(m.get(Metric::UserCalls), Some(25.0));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn top_wait_event_is_a_string_metric() {
        let mut m = MetricMap::new();
        assert_eq!(m.top_wait_event(), None);
        m.set_top_wait_event("log file sync");
        assert_eq!(m.top_wait_event(), Some("log file sync"));
        assert!(!m.is_empty());
    }

    #[test]
    fn all_names_are_distinct() {
        let mut names: Vec<&str> = Metric::ALL.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Metric::ALL.len());
    }
}
