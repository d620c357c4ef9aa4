// Ingram index: positional balance via a Herfindahl-Hirschman concentration
// measure over starter and bench position counts.

use crate::model::{Position, RosterRole, RosterSlot};
use crate::scoring::stats::clamp;
use std::collections::HashMap;

const STARTER_WEIGHT: f64 = 0.7;
const BENCH_WEIGHT: f64 = 0.3;

/// Compute a team's Ingram balance index in [0, 1]. Higher means the roster
/// spreads across positions; a single-position roster concentrates toward 0.
pub fn compute_ingram(slots: &[RosterSlot]) -> f64 {
    let starters: Vec<Position> = slots
        .iter()
        .filter(|s| s.role == RosterRole::Starter)
        .map(|s| s.position)
        .collect();
    let bench: Vec<Position> = slots
        .iter()
        .filter(|s| s.role == RosterRole::Bench)
        .map(|s| s.position)
        .collect();

    let weighted_hhi = STARTER_WEIGHT * hhi(&starters) + BENCH_WEIGHT * hhi(&bench);
    clamp(1.0 - weighted_hhi, 0.0, 1.0)
}

/// HHI over position shares: sum of squared shares. Empty group scores 0.
fn hhi(positions: &[Position]) -> f64 {
    if positions.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<Position, usize> = HashMap::new();
    for pos in positions {
        *counts.entry(*pos).or_insert(0) += 1;
    }
    let total = positions.len() as f64;
    counts
        .values()
        .map(|&count| {
            let share = count as f64 / total;
            share * share
        })
        .sum()
}
