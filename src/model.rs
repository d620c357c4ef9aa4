// Core data model: players, rosters, per-team metrics, and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Positions and availability
// ---------------------------------------------------------------------------

/// Fantasy-football positions used for roster slots and peer grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
    IDP,
}

impl Position {
    /// Parse a position string. Defensive abbreviations (DL, LB, DB, ...)
    /// collapse into IDP; DST is an alias for DEF.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "K" => Some(Position::K),
            "DEF" | "DST" => Some(Position::DEF),
            "IDP" | "DL" | "DE" | "DT" | "LB" | "OLB" | "ILB" | "DB" | "CB" | "S" => {
                Some(Position::IDP)
            }
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
            Position::IDP => "IDP",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

/// Injury/availability status reported by the upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InjuryStatus {
    #[default]
    Healthy,
    Questionable,
    Doubtful,
    Out,
    InjuredReserve,
    Suspended,
}

impl InjuryStatus {
    pub fn from_str_status(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "questionable" => InjuryStatus::Questionable,
            "doubtful" => InjuryStatus::Doubtful,
            "out" => InjuryStatus::Out,
            "ir" | "injured reserve" | "injured_reserve" => InjuryStatus::InjuredReserve,
            "suspended" => InjuryStatus::Suspended,
            _ => InjuryStatus::Healthy,
        }
    }

    /// Deterministic availability score used as the NIV health sub-score.
    /// Healthy carries no penalty; worse statuses step down to zero.
    pub fn availability_score(&self) -> f64 {
        match self {
            InjuryStatus::Healthy => 1.0,
            InjuryStatus::Questionable => 0.75,
            InjuryStatus::Doubtful => 0.5,
            InjuryStatus::Out => 0.25,
            InjuryStatus::InjuredReserve | InjuryStatus::Suspended => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Ingested records
// ---------------------------------------------------------------------------

/// One player's normalized stat line for a single week. Immutable once
/// ingested for a given (player, week, season).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatLine {
    pub player_id: String,
    pub week: u16,
    pub season: u16,
    pub position: Position,
    pub injury_status: InjuryStatus,
    pub passing_yards: u32,
    pub passing_tds: u32,
    pub interceptions: u32,
    pub rushing_yards: u32,
    pub rushing_tds: u32,
    pub receptions: u32,
    pub receiving_yards: u32,
    pub receiving_tds: u32,
    pub fumbles_lost: u32,
    pub fantasy_points: f64,
}

/// Whether a rostered player is in the starting lineup or on the bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RosterRole {
    Starter,
    Bench,
}

/// One roster assignment. Roster state is owned by the league; transactions
/// (add/drop/trade) arrive as replacement roster data, never as mutations
/// performed by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSlot {
    pub team_id: String,
    pub player_id: String,
    pub role: RosterRole,
    pub position: Position,
}

/// One draft pick. Players without a selection record are undrafted and
/// carry the worst-case cost (total picks + 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSelection {
    pub player_id: String,
    pub team_id: String,
    pub pick_number: u32,
}

/// One side of a head-to-head matchup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupResult {
    pub week: u16,
    pub team_id: String,
    pub opponent_id: String,
    pub points_for: f64,
    pub points_against: f64,
}

// ---------------------------------------------------------------------------
// Computed metrics
// ---------------------------------------------------------------------------

/// Tier label assigned from a player's NIV score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NivTier {
    Elite,
    Strong,
    Average,
    BelowAverage,
    Poor,
}

impl NivTier {
    pub fn from_niv(niv: f64) -> Self {
        if niv >= 20.0 {
            NivTier::Elite
        } else if niv >= 15.0 {
            NivTier::Strong
        } else if niv >= 10.0 {
            NivTier::Average
        } else if niv >= 5.0 {
            NivTier::BelowAverage
        } else {
            NivTier::Poor
        }
    }
}

/// Normalized Impact Value for one player, with its five sub-scores.
/// Only the latest value per (player, week) is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerNiv {
    pub player_id: String,
    pub season: u16,
    pub week: u16,
    pub position: Position,
    pub niv: f64,
    pub recency: f64,
    pub consistency: f64,
    pub explosiveness: f64,
    pub market: f64,
    pub availability: f64,
    pub tier: NivTier,
}

/// Full per-team metric set for one week. `rank` is only meaningful after
/// every team in the league/week has been scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMetrics {
    pub team_id: String,
    pub week: u16,
    pub sli: f64,
    pub bsi: f64,
    pub smi: f64,
    pub ingram: f64,
    pub alvarado: f64,
    pub zion: f64,
    pub zion_components: [f64; 4],
    pub cpr: f64,
    pub rank: u32,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// How a returned snapshot was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    FreshCalculation,
    FreshCached,
    CachedFallback,
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SnapshotSource::FreshCalculation => "fresh_calculation",
            SnapshotSource::FreshCached => "fresh_cached",
            SnapshotSource::CachedFallback => "cached_fallback",
        };
        f.write_str(s)
    }
}

/// One immutable, fully computed ranking result for a (league, season, week).
/// A recomputation writes a new snapshot; existing rows are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub league_id: String,
    pub season: u16,
    pub week: u16,
    /// Sorted by rank (descending cpr, tie-break ascending team_id).
    pub rankings: Vec<TeamMetrics>,
    pub gini_coefficient: f64,
    pub league_health: f64,
    pub calculated_at: DateTime<Utc>,
    pub source: SnapshotSource,
    /// Set when serving cached data after a failed recomputation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
