// CPR composition and league ranking.

use crate::config::CprWeights;
use crate::model::TeamMetrics;

/// Compose a single team's CPR from its sub-indices.
///
/// Weighted sum of the four roster indices, less a schedule-difficulty
/// penalty, scaled by a positional-mix factor centered on ingram = 0.5.
pub fn compose_cpr(
    sli: f64,
    bsi: f64,
    ingram: f64,
    alvarado: f64,
    zion_magnitude: f64,
    weights: &CprWeights,
) -> f64 {
    let base = weights.sli * sli
        + weights.bsi * bsi
        + weights.ingram * ingram
        + weights.alvarado * alvarado;
    let penalty = weights.zion_penalty * zion_magnitude;
    let mix_factor = 1.0 + weights.mix_adjustment * (ingram - 0.5);
    (base - penalty) * mix_factor
}

/// Sort teams by CPR descending (ties broken by ascending team_id, giving
/// a deterministic total order) and assign ranks 1..N in place.
pub fn rank_teams(teams: &mut Vec<TeamMetrics>) {
    teams.sort_by(|a, b| {
        b.cpr
            .partial_cmp(&a.cpr)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
    for (i, team) in teams.iter_mut().enumerate() {
        team.rank = (i + 1) as u32;
    }
}
