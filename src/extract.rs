/*!
 * extract.rs — AWR HTML metric and top-SQL extraction
 *
 * Scans every table row of the report, matches row labels against a fixed
 * ordered pattern table, and converts the human-formatted cell values
 * (comma separators, % suffix, K/M/G magnitudes) into the typed MetricMap.
 * Snapshot duration, CPU core count and CPU utilization get dedicated
 * passes because the report encodes them indirectly.
 *
 * A cell that fails to convert skips its row; the scan never aborts.
 *
 * License: GPLv3+
 */

use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::error::{AwrError, Result};
use crate::metrics::{Metric, MetricMap};

/// Timestamp format of the Begin/End Snap rows, e.g. `16-Jan-25 11:30:26`.
const SNAP_TS_FORMAT: &str = "%d-%b-%y %H:%M:%S";

/// Window assumed when the snapshot timestamps are missing or unparseable.
/// Used only for the derived CPU computation, never recorded in the map.
const DEFAULT_SNAP_DURATION_SECS: f64 = 1800.0;

/// Label substring -> metric, checked in declared order, first match wins.
/// Some labels are substrings of others and the irregular internal
/// whitespace is exactly what the AWR renderer emits, so both the order
/// and the literal spacing are significant.
const LABEL_PATTERNS: [(&str, Metric); 19] = [
    ("Buffer  Hit   %", Metric::BufferCacheHitRatio),
    ("Library Hit   %", Metric::LibraryHitPct),
    ("Memory Usage %", Metric::MemoryUsagePct),
    ("Physical read (blocks)", Metric::PhysicalReads),
    ("Physical write (blocks)", Metric::PhysicalWrites),
    ("User calls", Metric::UserCalls),
    ("DB CPU", Metric::DbCpuSeconds),
    ("%Total CPU", Metric::CpuUtilizationPct),
    ("CPU Utilization %", Metric::CpuUtilizationPct),
    ("Parse Calls", Metric::ParseCalls),
    ("Redo size (bytes)", Metric::RedoSizeBytes),
    ("Logical read (blocks)", Metric::LogicalReads),
    ("Hard parses (SQL)", Metric::HardParses),
    ("Soft Parse %", Metric::SoftParsePct),
    ("Latch Hit %", Metric::LatchHitPct),
    ("SQL Work Area (MB)", Metric::SqlWorkAreaMb),
    ("Executions", Metric::Executions),
    ("Logons:", Metric::Logons),
    ("%Idle", Metric::CpuIdlePct),
];

/// One row of the report's top-SQL section, in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct TopSqlRow {
    pub sql_id: String,
    pub executions: u64,
    pub elapsed_time_seconds: f64,
    pub cpu_time_seconds: f64,
}

/// Extract the metric map from an AWR HTML report.
///
/// Pure per input: identical documents yield identical maps. Absent keys
/// mean the report did not carry that metric; callers read them with an
/// explicit default via [`MetricMap::get_or`].
pub fn extract_metrics(html: &str) -> Result<MetricMap> {
    let doc = Html::parse_document(html);
    let tables = table_cells(&doc);
    if tables.is_empty() {
        return Err(AwrError::MalformedInput {
            reason: "document contains no tables".into(),
        });
    }

    let mut map = MetricMap::new();
    let duration = snapshot_duration(&tables, &mut map);
    let cores = cpu_core_count(&tables, html, &mut map);

    // Generic label -> value scan over every row of every table.
    for row in tables.iter().flatten() {
        if row.len() < 2 {
            continue;
        }
        let matched = LABEL_PATTERNS
            .iter()
            .find(|(pattern, _)| row[0].contains(pattern));
        let Some(&(_, metric)) = matched else {
            continue;
        };
        match cell_to_number(&row[1]) {
            // Last-wins: a later row with the same label overwrites.
            Some(value) => map.set(metric, value),
            None => debug!(label = %row[0], raw = %row[1], "skipping row, value not numeric"),
        }
    }

    reconcile_cpu_utilization(&mut map, duration, cores);
    Ok(map)
}

/// Extract the top-SQL table: the first table whose header row carries both
/// a "SQL ID" and an "Executions" column. Rows that fail to parse are
/// skipped; once a matching table is found, later tables are never
/// consulted, even if the match yielded zero rows. Missing table -> empty.
pub fn extract_top_sql(html: &str) -> Vec<TopSqlRow> {
    let doc = Html::parse_document(html);
    for table in table_cells(&doc) {
        let Some(header) = table.first() else {
            continue;
        };
        let is_top_sql = header.iter().any(|c| c.contains("SQL ID"))
            && header.iter().any(|c| c.contains("Executions"));
        if !is_top_sql {
            continue;
        }

        let mut rows = Vec::new();
        for cells in &table[1..] {
            if cells.len() < 4 {
                continue;
            }
            let executions = cells[1].replace(',', "").parse::<u64>();
            let elapsed = cells[2].replace(',', "").parse::<f64>();
            let cpu = cells[3].replace(',', "").parse::<f64>();
            match (executions, elapsed, cpu) {
                (Ok(executions), Ok(elapsed_time_seconds), Ok(cpu_time_seconds)) => {
                    rows.push(TopSqlRow {
                        sql_id: cells[0].clone(),
                        executions,
                        elapsed_time_seconds,
                        cpu_time_seconds,
                    });
                }
                _ => debug!(sql_id = %cells[0], "skipping top-SQL row, non-numeric cell"),
            }
        }
        return rows;
    }
    Vec::new()
}

/// Convert one human-formatted cell into a number.
///
/// Commas are thousands separators and always stripped. A trailing `%`
/// keeps percentage semantics on the 0-100 scale. A trailing K/M/G
/// (either case) expands by 1e3/1e6/1e9; a suffixed value whose residue
/// is not numeric is a failure, not a plain-parse retry.
fn cell_to_number(raw: &str) -> Option<f64> {
    let stripped = raw.replace(',', "");
    let value = stripped.trim();

    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse().ok();
    }

    if value.len() > 1 {
        let scale = match value.chars().last() {
            Some('K') | Some('k') => Some(1e3),
            Some('M') | Some('m') => Some(1e6),
            Some('G') | Some('g') => Some(1e9),
            _ => None,
        };
        if let Some(scale) = scale {
            let mantissa = value[..value.len() - 1].trim();
            return mantissa.parse::<f64>().ok().map(|n| n * scale);
        }
    }

    value.parse().ok()
}

/// Snapshot window in seconds from the Begin Snap / End Snap rows.
///
/// The human timestamp sits in the third cell of each row. The scan stops
/// as soon as both rows are seen. A negative delta means the window
/// crossed midnight, so a day is added back. On success the duration is
/// also recorded in the map; on failure the default window is returned
/// without recording anything.
fn snapshot_duration(tables: &[Vec<Vec<String>>], map: &mut MetricMap) -> f64 {
    let mut begin: Option<&str> = None;
    let mut end: Option<&str> = None;
    for row in tables.iter().flatten() {
        if row.len() >= 3 {
            if begin.is_none() && row[0].starts_with("Begin Snap:") {
                begin = Some(row[2].as_str());
            } else if end.is_none() && row[0].starts_with("End Snap:") {
                end = Some(row[2].as_str());
            }
        }
        if begin.is_some() && end.is_some() {
            break;
        }
    }

    let parsed = match (begin, end) {
        (Some(b), Some(e)) => {
            let b = NaiveDateTime::parse_from_str(b, SNAP_TS_FORMAT);
            let e = NaiveDateTime::parse_from_str(e, SNAP_TS_FORMAT);
            match (b, e) {
                (Ok(b), Ok(e)) => {
                    let mut secs = (e - b).num_seconds();
                    if secs < 0 {
                        secs += 86_400;
                    }
                    Some(secs as f64)
                }
                _ => None,
            }
        }
        _ => None,
    };

    match parsed {
        Some(duration) => {
            map.set(Metric::SnapDurationSeconds, duration);
            duration
        }
        None => {
            warn!(
                "snapshot timestamps missing or unparseable, assuming {}s window",
                DEFAULT_SNAP_DURATION_SECS
            );
            DEFAULT_SNAP_DURATION_SECS
        }
    }
}

/// CPU core count from the host-information table (header row carrying
/// both "CPUs" and "Cores"; the count is the third cell of the first data
/// row that parses). Falls back to a regex over the raw text, then to a
/// single core. Only a found count is recorded in the map.
fn cpu_core_count(tables: &[Vec<Vec<String>>], raw: &str, map: &mut MetricMap) -> f64 {
    for table in tables {
        let Some(header) = table.first() else {
            continue;
        };
        let is_host_table = header.iter().any(|c| c.contains("CPUs"))
            && header.iter().any(|c| c.contains("Cores"));
        if !is_host_table {
            continue;
        }
        for row in &table[1..] {
            if row.len() < 3 {
                continue;
            }
            if let Ok(cores) = row[2].replace(',', "").parse::<u64>() {
                map.set(Metric::CpuCores, cores as f64);
                return cores as f64;
            }
        }
    }

    let re = Regex::new(r"CPUs:\s*(\d+)").unwrap();
    if let Some(caps) = re.captures(raw) {
        if let Ok(cores) = caps[1].parse::<u64>() {
            debug!(cores, "CPU count taken from raw-text fallback");
            map.set(Metric::CpuCores, cores as f64);
            return cores as f64;
        }
    }

    debug!("no CPU core count found, assuming 1 core");
    1.0
}

/// Post-scan CPU utilization reconciliation.
///
/// An idle percentage, when present, always wins: utilization becomes
/// `100 - idle` even over a directly captured value. Otherwise, with DB CPU
/// seconds, a positive window and a core count, utilization is derived as
/// `(db_cpu / duration) / cores * 100`, rounded to two decimals. Otherwise
/// whatever the scan captured (possibly nothing) stands.
fn reconcile_cpu_utilization(map: &mut MetricMap, duration: f64, cores: f64) {
    if let Some(idle) = map.get(Metric::CpuIdlePct) {
        map.set(Metric::CpuUtilizationPct, 100.0 - idle);
        return;
    }
    let db_cpu = map.get_or(Metric::DbCpuSeconds, 0.0);
    if db_cpu > 0.0 && duration > 0.0 && cores > 0.0 {
        let pct = (db_cpu / duration) / cores * 100.0;
        map.set(Metric::CpuUtilizationPct, (pct * 100.0).round() / 100.0);
    }
}

/// Every table of the document as trimmed cell text, report order
/// preserved, header rows included.
fn table_cells(doc: &Html) -> Vec<Vec<Vec<String>>> {
    let table_sel = Selector::parse("table").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("td, th").unwrap();

    doc.select(&table_sel)
        .map(|table| {
            table
                .select(&row_sel)
                .map(|row| {
                    row.select(&cell_sel)
                        .map(|cell| cell.text().collect::<String>().trim().to_string())
                        .collect::<Vec<String>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect()
        })
        .collect()
}
