// NIV (Normalized Impact Value): five-factor per-player impact score.

use crate::config::NivWeights;
use crate::model::{InjuryStatus, NivTier, PlayerNiv, PlayerStatLine, Position};
use crate::scoring::stats::{
    compute_pool_stats, compute_zscore, median, quantile, STDEV_EPSILON,
};

/// Ceiling applied to the consistency and explosiveness ratios.
const RATIO_CEILING: f64 = 10.0;

/// Compute a player's NIV for a given week.
///
/// `history` is the player's stat lines for the season through the target
/// week, ordered ascending by week. `peer_season_totals` are aggregate
/// season points for every player at the same position (this player
/// included), forming the market comparison pool.
pub fn compute_player_niv(
    player_id: &str,
    season: u16,
    week: u16,
    position: Position,
    history: &[PlayerStatLine],
    peer_season_totals: &[f64],
    injury_status: InjuryStatus,
    weights: &NivWeights,
    recency_window: usize,
) -> PlayerNiv {
    // A player with no data scores zero across the board, not an error.
    if history.is_empty() {
        return PlayerNiv {
            player_id: player_id.to_string(),
            season,
            week,
            position,
            niv: 0.0,
            recency: 0.0,
            consistency: 0.0,
            explosiveness: 0.0,
            market: 0.0,
            availability: 0.0,
            tier: NivTier::Poor,
        };
    }

    let points: Vec<f64> = history.iter().map(|line| line.fantasy_points).collect();

    let recency = recency_score(&points, recency_window);
    let consistency = consistency_score(&points, recency_window);
    let explosiveness = explosiveness_score(&points);
    let market = market_score(&points, peer_season_totals);
    let availability = injury_status.availability_score();

    let niv = weights.recency * recency
        + weights.consistency * consistency
        + weights.explosiveness * explosiveness
        + weights.market * market
        + weights.health * availability;

    PlayerNiv {
        player_id: player_id.to_string(),
        season,
        week,
        position,
        niv,
        recency,
        consistency,
        explosiveness,
        market,
        availability,
        tier: NivTier::from_niv(niv),
    }
}

/// Decay-weighted mean of the last `window` weekly outputs. Linear weights;
/// the most recent week carries the largest weight.
fn recency_score(points: &[f64], window: usize) -> f64 {
    let recent = tail(points, window);
    if recent.is_empty() {
        return 0.0;
    }
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (i, value) in recent.iter().enumerate() {
        let w = (i + 1) as f64;
        weighted_sum += w * value;
        weight_total += w;
    }
    weighted_sum / weight_total
}

/// Inverse coefficient of variation (mean / stdev) over the window.
/// Zero variance with positive output hits the ceiling; a non-positive
/// mean fails closed to 0.0.
fn consistency_score(points: &[f64], window: usize) -> f64 {
    let recent = tail(points, window);
    let stats = compute_pool_stats(recent);
    if stats.mean <= 0.0 {
        return 0.0;
    }
    if stats.stdev < STDEV_EPSILON {
        return RATIO_CEILING;
    }
    (stats.mean / stats.stdev).min(RATIO_CEILING)
}

/// 90th-percentile weekly output relative to the player's own median.
fn explosiveness_score(points: &[f64]) -> f64 {
    let med = median(points);
    if med <= 0.0 {
        return 0.0;
    }
    (quantile(points, 0.9) / med).min(RATIO_CEILING)
}

/// Z-score of the player's season total against the position peer pool.
fn market_score(points: &[f64], peer_season_totals: &[f64]) -> f64 {
    let season_total: f64 = points.iter().sum();
    let stats = compute_pool_stats(peer_season_totals);
    compute_zscore(season_total, &stats)
}

fn tail(points: &[f64], window: usize) -> &[f64] {
    let start = points.len().saturating_sub(window);
    &points[start..]
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
