/*!
 * rules.rs — Threshold-based tuning recommendations
 *
 * A fixed, ordered table of independent predicates over the metric map.
 * Each rule reads its keys through `MetricMap::get_or` with the default it
 * wants for "metric unknown", so absence never fires a rule by accident.
 * Rules do not short-circuit each other; output order equals rule order.
 *
 * License: GPLv3+
 */

use std::fmt;

use crate::metrics::{Metric, MetricMap};
use crate::thresholds::AlertThresholds;

/// Severity attached to a recommendation at creation time, so consumers
/// route on the tag instead of sniffing message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Tuning,
    Ok,
}

impl Severity {
    pub fn marker(self) -> &'static str {
        match self {
            Severity::Critical => "\u{1F534} ALERT",
            Severity::Warning => "\u{1F7E0} NOTICE",
            Severity::Tuning => "\u{1F7E1} TUNING",
            Severity::Ok => "\u{2705}",
        }
    }
}

/// One advisory derived from the metric map.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub severity: Severity,
    pub message: String,
}

impl Recommendation {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Recommendation {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.marker(), self.message)
    }
}

/// Evaluate the full rule table against the metrics.
///
/// The CPU capacity guard runs first: a utilization figure beyond what the
/// core count can physically deliver (with the configured overcommit
/// tolerance) raises a critical alert carrying the out-of-range details,
/// but evaluation continues so the remaining advisories still appear.
/// When nothing fires, the result is a single "no issues" entry.
pub fn generate_recommendations(
    metrics: &MetricMap,
    t: &AlertThresholds,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let get = |m: Metric, default: f64| metrics.get_or(m, default);

    // Capacity guard
    let cpu_util = get(Metric::CpuUtilizationPct, 0.0);
    let cpu_cores = get(Metric::CpuCores, 1.0);
    let max_possible = cpu_cores * 100.0 * t.cpu_overcommit_factor;
    if cpu_util > max_possible {
        recs.push(Recommendation::new(
            Severity::Critical,
            format!(
                "CPU utilization {:.2}% exceeds the capacity of {} core(s) \
                 (max plausible {:.0}%). Extraction may be incomplete.",
                cpu_util, cpu_cores, max_possible
            ),
        ));
    }

    // Database efficiency
    if get(Metric::BufferCacheHitRatio, 100.0) < t.buffer_hit_pct {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Low buffer cache hit ratio. Increase DB_CACHE_SIZE.",
        ));
    }
    if get(Metric::ParseCalls, 0.0) > t.parse_calls {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "High parse calls. Enable cursor sharing and bind variables.",
        ));
    }
    if get(Metric::LibraryHitPct, 100.0) < t.library_hit_pct {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Low library cache efficiency. Tune shared pool size or reduce parsing.",
        ));
    }
    if get(Metric::SoftParsePct, 100.0) < t.soft_parse_pct {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Low soft parse ratio. Optimize application to use bind variables.",
        ));
    }
    if get(Metric::HardParses, 0.0) > t.hard_parses {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Excessive hard parsing. Check bind variables or use CURSOR_SHARING=FORCE.",
        ));
    }

    // Memory
    if get(Metric::SharedPoolFreePct, 100.0) < t.shared_pool_free_pct {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Low free space in shared pool. Consider increasing SHARED_POOL_SIZE.",
        ));
    }
    if get(Metric::MemoryUsagePct, 0.0) > t.memory_usage_pct {
        recs.push(Recommendation::new(
            Severity::Warning,
            "High memory usage. Investigate memory-intensive processes.",
        ));
    }
    if get(Metric::PgaCacheHitPct, 100.0) < t.pga_cache_hit_pct {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Low PGA cache hit. Increase PGA_AGGREGATE_TARGET.",
        ));
    }

    // I/O
    if get(Metric::PhysicalReads, 0.0) > t.physical_reads {
        recs.push(Recommendation::new(
            Severity::Warning,
            "High physical reads. Investigate inefficient SQL or missing indexes.",
        ));
    }
    if get(Metric::PhysicalWrites, 0.0) > t.physical_writes {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "High physical writes. Optimize write operations and checkpointing.",
        ));
    }
    if get(Metric::RedoSizeBytes, 0.0) > t.redo_size_bytes {
        recs.push(Recommendation::new(
            Severity::Warning,
            "High redo generation. Investigate frequent DMLs or logging overhead.",
        ));
    }

    // CPU and timing
    if cpu_util > t.cpu_utilization_pct {
        recs.push(Recommendation::new(
            Severity::Warning,
            "High CPU usage. Identify CPU-intensive SQL or processes.",
        ));
    }
    if get(Metric::DbTimeRatio, 0.0) > t.db_time_ratio {
        recs.push(Recommendation::new(
            Severity::Warning,
            "High DB Time. Investigate top wait events and SQLs.",
        ));
    }
    if get(Metric::SqlResponseTime, 0.0) > t.sql_response_time_s {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Poor SQL response time. Check indexes and joins.",
        ));
    }

    // Concurrency and contention
    if get(Metric::EnqueueWaits, 0.0) > 0.0 {
        recs.push(Recommendation::new(
            Severity::Warning,
            "Enqueue waits detected. Investigate object contention.",
        ));
    }
    if get(Metric::LatchMisses, 0.0) > t.latch_misses {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "High latch misses. Tune latch-related parameters or reduce contention.",
        ));
    }
    if get(Metric::LogFileSync, 0.0) > t.log_file_sync_ms {
        recs.push(Recommendation::new(
            Severity::Warning,
            "High log file sync time. Check I/O performance or commit frequency.",
        ));
    }

    // Transactions
    // Only meaningful when the report carried at least one of the two
    // counters; with both absent the 0 < 1 defaults would always fire.
    let saw_tx_counters =
        metrics.contains(Metric::UserCommits) || metrics.contains(Metric::UserRollbacks);
    if saw_tx_counters && get(Metric::UserCommits, 0.0) < get(Metric::UserRollbacks, 1.0) {
        recs.push(Recommendation::new(
            Severity::Warning,
            "Rollbacks are more than commits. Investigate transaction failures.",
        ));
    }
    if get(Metric::TransactionCount, 0.0) > t.transaction_count {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "High transaction volume. Consider batching operations.",
        ));
    }

    // SQL execution
    if get(Metric::FullTableScans, 0.0) > t.full_table_scans {
        recs.push(Recommendation::new(
            Severity::Warning,
            "Many full table scans. Investigate missing indexes or rewrite queries.",
        ));
    }
    if get(Metric::TopSqlBufferGets, 0.0) > t.top_sql_buffer_gets {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "SQL with high buffer gets. Tune expensive queries.",
        ));
    }
    if get(Metric::SortsDisk, 0.0) > t.sorts_disk {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "High disk sorts. Increase SORT_AREA_SIZE or use temporary tablespaces.",
        ));
    }
    if get(Metric::MemorySortPct, 100.0) < t.memory_sort_pct {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Most sorts not in memory. Increase workarea_size_policy or PGA.",
        ));
    }

    // Storage and configuration
    if get(Metric::DbFiles, 0.0) > t.db_files {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Too many database files. Could affect startup time and file I/O.",
        ));
    }
    if get(Metric::LogSwitches, 0.0) > t.log_switches {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Frequent log switches. Consider increasing log file size.",
        ));
    }
    if get(Metric::CheckpointTime, 0.0) > t.checkpoint_time_s {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "Long checkpoints. Tune checkpoint parameters or log buffer.",
        ));
    }
    if get(Metric::LogFileParallelWrite, 0.0) > t.log_write_time_ms {
        recs.push(Recommendation::new(
            Severity::Warning,
            "Slow log writes. Investigate redo log disk I/O.",
        ));
    }

    // Dominant wait event
    match metrics.top_wait_event().unwrap_or("") {
        "db file sequential read" => recs.push(Recommendation::new(
            Severity::Tuning,
            "Index reads dominating. Investigate slow I/O on indexed reads.",
        )),
        "db file scattered read" => recs.push(Recommendation::new(
            Severity::Tuning,
            "Full table scans common. Check missing indexes.",
        )),
        "log file sync" => recs.push(Recommendation::new(
            Severity::Tuning,
            "COMMIT frequency too high. Use batch processing.",
        )),
        "buffer busy waits" => recs.push(Recommendation::new(
            Severity::Tuning,
            "Buffer contention. Tune hot blocks or increase freelists.",
        )),
        "enq: TX - row lock contention" => recs.push(Recommendation::new(
            Severity::Tuning,
            "Row lock contention. Optimize transaction design and commit frequency.",
        )),
        _ => {}
    }

    // Connections
    if get(Metric::Logons, 0.0) > t.logons {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "High connection rate. Implement connection pooling.",
        ));
    }
    if get(Metric::SessionCount, 0.0) > t.session_count {
        recs.push(Recommendation::new(
            Severity::Tuning,
            "High session count. Review connection management and pooling.",
        ));
    }

    if recs.is_empty() {
        recs.push(Recommendation::new(
            Severity::Ok,
            "No critical performance issues detected.",
        ));
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> AlertThresholds {
        AlertThresholds::default()
    }

    #[test]
    fn empty_map_yields_single_no_issues_entry() {
        let recs = generate_recommendations(&MetricMap::new(), &defaults());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Ok);
        assert_eq!(recs[0].message, "No critical performance issues detected.");
    }

    #[test]
    fn buffer_hit_threshold_is_strict() {
        let mut m = MetricMap::new();
        m.set(Metric::BufferCacheHitRatio, 90.0);
        let recs = generate_recommendations(&m, &defaults());
        assert_eq!(recs[0].severity, Severity::Ok);

        m.set(Metric::BufferCacheHitRatio, 89.99);
        let recs = generate_recommendations(&m, &defaults());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Tuning);
        assert!(recs[0].message.contains("buffer cache"));
    }

    #[test]
    fn multiple_rules_fire_in_declaration_order() {
        let mut m = MetricMap::new();
        m.set(Metric::ParseCalls, 500.0);
        m.set(Metric::PhysicalReads, 20_000.0);
        m.set(Metric::Logons, 250.0);
        let recs = generate_recommendations(&m, &defaults());
        let messages: Vec<&str> = recs.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "High parse calls. Enable cursor sharing and bind variables.",
                "High physical reads. Investigate inefficient SQL or missing indexes.",
                "High connection rate. Implement connection pooling.",
            ]
        );
    }

    #[test]
    fn capacity_guard_fires_first_and_does_not_suppress() {
        let mut m = MetricMap::new();
        m.set(Metric::CpuUtilizationPct, 450.0);
        m.set(Metric::CpuCores, 2.0);
        m.set(Metric::HardParses, 500.0);
        let recs = generate_recommendations(&m, &defaults());
        assert_eq!(recs[0].severity, Severity::Critical);
        assert!(recs[0].message.contains("450.00%"));
        // 450 > 80 also fires the plain high-CPU warning, plus hard parses.
        assert!(recs
            .iter()
            .any(|r| r.message.starts_with("Excessive hard parsing")));
        assert!(recs.iter().any(|r| r.message.starts_with("High CPU usage")));
    }

    #[test]
    fn rollbacks_exceeding_commits_fires() {
        let mut m = MetricMap::new();
        m.set(Metric::UserCommits, 5.0);
        m.set(Metric::UserRollbacks, 10.0);
        let recs = generate_recommendations(&m, &defaults());
        assert_eq!(recs.len(), 1);
        assert!(recs[0].message.starts_with("Rollbacks"));
    }

    #[test]
    fn absent_commits_compare_against_default_rollback_of_one() {
        // commits default 0, rollbacks default 1, so an empty map would
        // fire this rule if it did not sit behind get_or defaults matching
        // the canonical table; verify it does fire when only commits known.
        let mut m = MetricMap::new();
        m.set(Metric::UserCommits, 0.0);
        let recs = generate_recommendations(&m, &defaults());
        assert!(recs.iter().any(|r| r.message.starts_with("Rollbacks")));
    }

    #[test]
    fn known_wait_events_emit_categorical_advisories() {
        for (event, expect) in [
            ("db file sequential read", "Index reads dominating"),
            ("db file scattered read", "Full table scans common"),
            ("log file sync", "COMMIT frequency too high"),
            ("buffer busy waits", "Buffer contention"),
            ("enq: TX - row lock contention", "Row lock contention"),
        ] {
            let mut m = MetricMap::new();
            m.set_top_wait_event(event);
            let recs = generate_recommendations(&m, &defaults());
            assert_eq!(recs.len(), 1, "event {event}");
            assert!(recs[0].message.starts_with(expect), "event {event}");
        }
    }

    #[test]
    fn unknown_wait_event_is_ignored() {
        let mut m = MetricMap::new();
        m.set_top_wait_event("SQL*Net message from client");
        let recs = generate_recommendations(&m, &defaults());
        assert_eq!(recs[0].severity, Severity::Ok);
    }

    #[test]
    fn enqueue_waits_fires_on_any_positive_count() {
        let mut m = MetricMap::new();
        m.set(Metric::EnqueueWaits, 1.0);
        let recs = generate_recommendations(&m, &defaults());
        assert_eq!(recs[0].severity, Severity::Warning);
        assert!(recs[0].message.starts_with("Enqueue waits"));
    }

    #[test]
    fn thresholds_are_configurable() {
        let mut m = MetricMap::new();
        m.set(Metric::Logons, 50.0);
        assert_eq!(
            generate_recommendations(&m, &defaults())[0].severity,
            Severity::Ok
        );

        let tight = AlertThresholds {
            logons: 10.0,
            ..AlertThresholds::default()
        };
        let recs = generate_recommendations(&m, &tight);
        assert!(recs[0].message.starts_with("High connection rate"));
    }

    #[test]
    fn display_carries_severity_marker() {
        let r = Recommendation::new(Severity::Warning, "High memory usage.");
        assert_eq!(r.to_string(), "\u{1F7E0} NOTICE: High memory usage.");
    }
}
