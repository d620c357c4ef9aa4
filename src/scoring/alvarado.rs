// Alvarado index: value efficiency. How much production a roster extracts
// relative to what its players cost on draft day and what their impact
// scores predict.

use crate::scoring::stats::{clamp, compute_pool_stats, compute_zscore, PoolStats};
use std::collections::HashMap;

/// Smallest allowed squared-z denominator. Keeps near-average players from
/// producing unbounded efficiency values.
const DENOMINATOR_FLOOR: f64 = 0.1;

/// Per-player inputs for the efficiency calculation, gathered league-wide
/// so the z-score pools span every roster.
#[derive(Debug, Clone)]
pub struct ValueSample {
    pub player_id: String,
    pub team_id: String,
    pub is_starter: bool,
    /// Marginal contribution estimate (see `marginal_contribution`).
    pub marginal: f64,
    pub niv: f64,
    /// Draft pick number, or `total_picks + 1` for undrafted players.
    pub draft_cost: f64,
}

/// Marginal contribution proxy: the player's mean share of their team's
/// weekly total, scaled to a 0-100 range. A bounded leave-one-out style
/// estimate; full Shapley enumeration is deliberately avoided.
///
/// `player_weekly` pairs (week, points); `team_weekly_totals` maps week to
/// the team's total that week. Weeks where the team total is non-positive
/// are skipped.
pub fn marginal_contribution(
    player_weekly: &[(u16, f64)],
    team_weekly_totals: &HashMap<u16, f64>,
) -> f64 {
    let mut shares = Vec::new();
    for (week, points) in player_weekly {
        if let Some(&total) = team_weekly_totals.get(week) {
            if total > 0.0 {
                shares.push(points / total);
            }
        }
    }
    if shares.is_empty() {
        return 0.0;
    }
    let mean_share = shares.iter().sum::<f64>() / shares.len() as f64;
    mean_share * 100.0
}

/// Per-player efficiency: marginal contribution divided by the squared
/// average of the NIV and draft-cost z-scores, clamped to [0, 100].
fn player_efficiency(sample: &ValueSample, niv_pool: &PoolStats, cost_pool: &PoolStats) -> f64 {
    let z_niv = compute_zscore(sample.niv, niv_pool);
    let z_cost = compute_zscore(sample.draft_cost, cost_pool);
    let avg_z = (z_niv + z_cost) / 2.0;
    let mut denominator = avg_z * avg_z;
    if denominator < DENOMINATOR_FLOOR {
        denominator = DENOMINATOR_FLOOR;
    }
    clamp(sample.marginal / denominator, 0.0, 100.0)
}

/// Compute every team's Alvarado index: the mean efficiency over that
/// team's starters. Teams without starters in `samples` score 0.0.
///
/// Z-score pools are league-wide over all samples, so a degenerate league
/// (one team, identical values) collapses z-scores to zero rather than
/// diverging.
pub fn compute_team_alvarado(samples: &[ValueSample]) -> HashMap<String, f64> {
    let niv_values: Vec<f64> = samples.iter().map(|s| s.niv).collect();
    let cost_values: Vec<f64> = samples.iter().map(|s| s.draft_cost).collect();
    let niv_pool = compute_pool_stats(&niv_values);
    let cost_pool = compute_pool_stats(&cost_values);

    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for sample in samples {
        let entry = sums.entry(sample.team_id.clone()).or_insert((0.0, 0));
        if sample.is_starter {
            entry.0 += player_efficiency(sample, &niv_pool, &cost_pool);
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(team_id, (sum, count))| {
            let value = if count == 0 { 0.0 } else { sum / count as f64 };
            (team_id, value)
        })
        .collect()
}
