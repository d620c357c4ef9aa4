// SLI / BSI: starter and bench lineup strength from player NIV values.

use crate::config::{LineupAggregate, LineupConfig};

/// Starter Lineup Index: aggregate NIV over the starting lineup.
/// An empty lineup scores 0.0.
pub fn compute_sli(starter_nivs: &[f64], config: &LineupConfig) -> f64 {
    aggregate(starter_nivs, config.aggregate)
}

/// Bench Strength Index: aggregate NIV over the bench, discounted because
/// bench production only matters contingently.
pub fn compute_bsi(bench_nivs: &[f64], config: &LineupConfig) -> f64 {
    aggregate(bench_nivs, config.aggregate) * config.bench_discount
}

fn aggregate(values: &[f64], mode: LineupAggregate) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().sum();
    match mode {
        LineupAggregate::Sum => sum,
        LineupAggregate::Mean => sum / values.len() as f64,
    }
}
