// SMI (Schedule Momentum Index): recent scoring margin plus win rate,
// on a [0, 2] scale. Reported alongside CPR but not composed into it.

use crate::model::MatchupResult;
use crate::scoring::stats::clamp;

/// Neutral momentum for a team with no matchups played.
const NEUTRAL_SMI: f64 = 1.0;

/// Compute a team's SMI from its played matchups.
///
/// `clamp((avg_point_diff + 50) / 50, 0, 2) + 0.5 * win_pct`, with the
/// final value clamped back into [0, 2].
pub fn compute_smi(matchups: &[MatchupResult]) -> f64 {
    if matchups.is_empty() {
        return NEUTRAL_SMI;
    }

    let n = matchups.len() as f64;
    let avg_diff = matchups
        .iter()
        .map(|m| m.points_for - m.points_against)
        .sum::<f64>()
        / n;
    let wins = matchups
        .iter()
        .filter(|m| m.points_for > m.points_against)
        .count() as f64;
    let win_pct = wins / n;

    let base = clamp((avg_diff + 50.0) / 50.0, 0.0, 2.0);
    clamp(base + 0.5 * win_pct, 0.0, 2.0)
}

/// Win rate over played matchups; 0.0 with no matchups.
pub fn win_rate(matchups: &[MatchupResult]) -> f64 {
    if matchups.is_empty() {
        return 0.0;
    }
    let wins = matchups
        .iter()
        .filter(|m| m.points_for > m.points_against)
        .count() as f64;
    wins / matchups.len() as f64
}
