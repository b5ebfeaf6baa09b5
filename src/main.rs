/*!
 * main.rs — Oracle AWR Report Analyzer (Rust)
 *
 * Extract performance metrics and the top-SQL table from an Oracle AWR
 * (Automatic Workload Repository) HTML report and print threshold-based
 * tuning recommendations underneath.
 *
 * Usage:
 *   awr_report_analyze <awrrpt_xxx.html> [thresholds.toml]
 *
 * - Reads any Oracle AWR HTML/HTM report export
 * - Prints the extracted metric map, the top SQL by executions, and an
 *   ordered list of advisories with severity markers
 * - Ends with a mini Knowledge Base / Best Practices for quick reference
 *
 * License: GPLv3+
 */

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use awr_report_analyze::{
    extract_metrics, extract_top_sql, generate_recommendations, AlertThresholds, Metric,
};

/// Thresholds file consulted when no explicit path is given.
const DEFAULT_THRESHOLDS_FILE: &str = "awr_thresholds.toml";

/// Print usage and exit. (If called, process will not return!)
fn usage() -> ! {
    eprintln!(
        "
Oracle AWR Report Analyzer (Rust)
---------------------------------

Usage:
  awr_report_analyze <awrrpt_xxx.html> [thresholds.toml]

Example:
  awr_report_analyze awrrpt_1_67450_67453.html

- Reads an AWR HTML report and prints extracted metrics, top SQL and
  tuning recommendations
- Optional second argument: a TOML file overriding alert thresholds
  (falls back to {DEFAULT_THRESHOLDS_FILE} in the working directory,
  then to built-in defaults)
"
    );
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        usage();
    }

    let filename = &args[1];
    let html = match fs::read_to_string(filename) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read {}: {}", filename, e);
            process::exit(1);
        }
    };

    // Explicit thresholds path is a hard error when broken; the implicit
    // default file is optional.
    let thresholds = match args.get(2) {
        Some(path) => match AlertThresholds::load(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error: failed to load thresholds from {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            if Path::new(DEFAULT_THRESHOLDS_FILE).is_file() {
                AlertThresholds::load(DEFAULT_THRESHOLDS_FILE).unwrap_or_else(|e| {
                    eprintln!(
                        "Warning: ignoring unreadable {}: {}",
                        DEFAULT_THRESHOLDS_FILE, e
                    );
                    AlertThresholds::default()
                })
            } else {
                debug!("no thresholds file, using built-in defaults");
                AlertThresholds::default()
            }
        }
    };

    let metrics = match extract_metrics(&html) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let top_sql = extract_top_sql(&html);
    let recommendations = generate_recommendations(&metrics, &thresholds);

    println!("# AWR Analysis for `{}`\n", filename);

    println!("## Extracted Metrics\n");
    let mut found = 0;
    for metric in Metric::ALL {
        if let Some(value) = metrics.get(metric) {
            println!("{:<26} {}", metric, value);
            found += 1;
        }
    }
    if let Some(event) = metrics.top_wait_event() {
        println!("{:<26} {}", "top_wait_event", event);
        found += 1;
    }
    if found == 0 {
        println!("*No known metrics found in this report.*");
    }

    println!("\n## Top SQL by Executions\n");
    if top_sql.is_empty() {
        println!("*No top-SQL section found.*");
    } else {
        println!(
            "{:<16} {:>12} {:>14} {:>12}",
            "SQL ID", "Executions", "Elapsed (s)", "CPU (s)"
        );
        for row in &top_sql {
            println!(
                "{:<16} {:>12} {:>14.2} {:>12.2}",
                row.sql_id, row.executions, row.elapsed_time_seconds, row.cpu_time_seconds
            );
        }
    }

    println!("\n## Recommendations\n");
    for rec in &recommendations {
        println!("- {}", rec);
    }

    println!("\n## Knowledge Base / Best Practices");
    println!("- Buffer/library cache hit ratios below 90-95% mean wasted I/O or parsing.");
    println!("- Hard parses signal missing bind variables; prefer soft parses.");
    println!("- CPU utilization is derived from idle% or DB CPU over the snapshot window.");
    println!("- Always correlate recommendations with the top SQL and wait events.\n");
}
