//! Call statistics overview.
//!
//! Provides a quick summary of a call-result table: total and valid call
//! counts, talk time, appointments, bad numbers, platform errors, and the
//! outcome distribution. Used by `recon stats` and by `recon analyze`.

use anyhow::Result;
use std::path::Path;

use call_reconcile_core::models::StatisticsSnapshot;
use call_reconcile_core::stats;

use crate::analyze::classify_table;
use crate::config::Config;
use crate::table_io::read_table;

/// `recon stats`: classify a call table and print its statistics.
pub async fn run_stats(config: &Config, results_path: &Path, json: bool) -> Result<()> {
    let calls = read_table(results_path).await?;
    let (records, _) = classify_table(config, &calls);
    let snapshot = stats::compute(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Call Statistics — {}", results_path.display());
    println!("================================");
    println!();
    print_statistics(&snapshot);
    println!();
    Ok(())
}

pub fn print_statistics(s: &StatisticsSnapshot) {
    println!("  Total calls:     {}", s.total_calls);
    println!(
        "  Valid calls:     {} ({}%)",
        s.valid_calls,
        percent(s.valid_calls, s.total_calls)
    );
    println!("  Talk time:       {}", s.total_duration);
    println!("  Appointments:    {}", s.appointments);
    println!("  Invalid numbers: {}", s.invalid_phones);
    println!("  Errors:          {}", s.errors);

    if !s.outcome_histogram.is_empty() {
        println!();
        println!("  By outcome:");
        println!("  {:<16} {:>6}", "OUTCOME", "COUNT");
        println!("  {}", "-".repeat(24));
        let mut rows: Vec<(&String, &usize)> = s.outcome_histogram.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (outcome, count) in rows {
            println!("  {:<16} {:>6}", outcome, count);
        }
    }
}

fn percent(part: usize, total: usize) -> usize {
    if total > 0 {
        (part * 100) / total
    } else {
        0
    }
}
