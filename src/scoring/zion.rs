// Zion tensor: four-component strength-of-schedule measure over the
// opponents a team has actually faced.

use crate::model::MatchupResult;
use crate::scoring::stats::{clamp, compute_pool_stats};
use std::collections::HashMap;

/// Normalizer for opponent scoring variance (component 2).
const VARIANCE_SCALE: f64 = 1000.0;
/// Normalizer for opponent Alvarado (component 4).
const ALVARADO_SCALE: f64 = 20.0;

/// Precomputed metrics for one opponent, looked up per matchup faced.
#[derive(Debug, Clone, Copy)]
pub struct OpponentProfile {
    pub win_rate: f64,
    /// Population variance of the opponent's weekly scores.
    pub score_variance: f64,
    pub ingram: f64,
    pub alvarado: f64,
}

/// Compute a team's Zion tensor and its L2 magnitude.
///
/// Components, each averaged over opponents faced (repeat opponents count
/// once per matchup):
/// 1. traditional difficulty: opponent win rate;
/// 2. volatility: opponent scoring variance / 1000, capped at 1.0;
/// 3. positional stress: opponent Ingram;
/// 4. efficiency pressure: opponent Alvarado / 20, capped at 1.0.
///
/// A team with no matchups gets the zero vector and magnitude 0.0.
pub fn compute_zion(
    matchups: &[MatchupResult],
    profiles: &HashMap<String, OpponentProfile>,
) -> ([f64; 4], f64) {
    let mut sums = [0.0f64; 4];
    let mut count = 0usize;

    for matchup in matchups {
        let Some(profile) = profiles.get(&matchup.opponent_id) else {
            continue;
        };
        sums[0] += profile.win_rate;
        sums[1] += clamp(profile.score_variance / VARIANCE_SCALE, 0.0, 1.0);
        sums[2] += profile.ingram;
        sums[3] += clamp(profile.alvarado / ALVARADO_SCALE, 0.0, 1.0);
        count += 1;
    }

    if count == 0 {
        return ([0.0; 4], 0.0);
    }

    let n = count as f64;
    let components = [sums[0] / n, sums[1] / n, sums[2] / n, sums[3] / n];
    let magnitude = components.iter().map(|c| c * c).sum::<f64>().sqrt();
    (components, magnitude)
}

/// Population variance of a team's weekly scores across its matchups.
pub fn weekly_score_variance(matchups: &[MatchupResult]) -> f64 {
    let scores: Vec<f64> = matchups.iter().map(|m| m.points_for).collect();
    let stats = compute_pool_stats(&scores);
    stats.stdev * stats.stdev
}
