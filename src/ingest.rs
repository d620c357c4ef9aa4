// Data ingestion: the provider seam, CSV loaders, and the stat normalizer.
//
// The engine assumes upstream records are already deduplicated and
// validated; loaders here only normalize shapes and skip rows that cannot
// be parsed at all.

use crate::config::DataPaths;
use crate::model::{
    DraftSelection, InjuryStatus, MatchupResult, PlayerStatLine, Position, RosterRole, RosterSlot,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open data file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read records from {path}: {source}")]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[error("provider error: {0}")]
    Provider(String),
}

/// One week of league data, fetched as a unit.
#[derive(Debug, Clone, Default)]
pub struct LeagueData {
    pub stat_lines: Vec<PlayerStatLine>,
    pub rosters: Vec<RosterSlot>,
    pub draft_picks: Vec<DraftSelection>,
    pub matchups: Vec<MatchupResult>,
}

/// Source of normalized league records. The engine is generic over where
/// data comes from; production wires a real client here, tests wire mocks.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn fetch(&self, league_id: &str, season: u16, week: u16)
        -> Result<LeagueData, IngestError>;
}

// ---------------------------------------------------------------------------
// Fantasy-point normalization (PPR)
// ---------------------------------------------------------------------------

/// Derive PPR fantasy points from counting stats.
pub fn ppr_points(line: &PlayerStatLine) -> f64 {
    line.passing_yards as f64 * 0.04
        + line.passing_tds as f64 * 4.0
        - line.interceptions as f64 * 2.0
        + line.rushing_yards as f64 * 0.1
        + line.rushing_tds as f64 * 6.0
        + line.receptions as f64 * 1.0
        + line.receiving_yards as f64 * 0.1
        + line.receiving_tds as f64 * 6.0
        - line.fumbles_lost as f64 * 2.0
}

/// Fill in `fantasy_points` from counting stats when the upstream value is
/// absent (non-positive).
pub fn normalize_stat_line(mut line: PlayerStatLine) -> PlayerStatLine {
    if line.fantasy_points <= 0.0 {
        line.fantasy_points = ppr_points(&line);
    }
    line
}

// ---------------------------------------------------------------------------
// CSV row shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StatLineRow {
    player_id: String,
    week: u16,
    season: u16,
    position: String,
    #[serde(default)]
    injury_status: String,
    #[serde(default)]
    passing_yards: u32,
    #[serde(default)]
    passing_tds: u32,
    #[serde(default)]
    interceptions: u32,
    #[serde(default)]
    rushing_yards: u32,
    #[serde(default)]
    rushing_tds: u32,
    #[serde(default)]
    receptions: u32,
    #[serde(default)]
    receiving_yards: u32,
    #[serde(default)]
    receiving_tds: u32,
    #[serde(default)]
    fumbles_lost: u32,
    #[serde(default)]
    fantasy_points: f64,
    #[serde(flatten)]
    _extra: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    team_id: String,
    player_id: String,
    role: String,
    position: String,
    #[serde(flatten)]
    _extra: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct DraftRow {
    player_id: String,
    team_id: String,
    pick_number: u32,
    #[serde(flatten)]
    _extra: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct MatchupRow {
    week: u16,
    team_id: String,
    opponent_id: String,
    points_for: f64,
    points_against: f64,
    #[serde(flatten)]
    _extra: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (file-free for tests)
// ---------------------------------------------------------------------------

/// Load and normalize stat lines from CSV. Rows that fail to deserialize
/// or carry an unknown position are logged and skipped.
pub fn load_stat_lines<R: Read>(reader: R) -> Result<Vec<PlayerStatLine>, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut lines = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.deserialize::<StatLineRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("skipping malformed stat line row: {e}");
                skipped += 1;
                continue;
            }
        };
        let Some(position) = Position::from_str_pos(&row.position) else {
            warn!(
                player_id = %row.player_id,
                position = %row.position,
                "skipping stat line with unknown position"
            );
            skipped += 1;
            continue;
        };
        lines.push(normalize_stat_line(PlayerStatLine {
            player_id: row.player_id,
            week: row.week,
            season: row.season,
            position,
            injury_status: InjuryStatus::from_str_status(&row.injury_status),
            passing_yards: row.passing_yards,
            passing_tds: row.passing_tds,
            interceptions: row.interceptions,
            rushing_yards: row.rushing_yards,
            rushing_tds: row.rushing_tds,
            receptions: row.receptions,
            receiving_yards: row.receiving_yards,
            receiving_tds: row.receiving_tds,
            fumbles_lost: row.fumbles_lost,
            fantasy_points: row.fantasy_points,
        }));
    }

    if skipped > 0 {
        info!("loaded {} stat lines, skipped {} rows", lines.len(), skipped);
    }
    Ok(lines)
}

pub fn load_rosters<R: Read>(reader: R) -> Result<Vec<RosterSlot>, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut slots = Vec::new();

    for result in csv_reader.deserialize::<RosterRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!("skipping malformed roster row: {e}");
                continue;
            }
        };
        let Some(position) = Position::from_str_pos(&row.position) else {
            warn!(
                player_id = %row.player_id,
                position = %row.position,
                "skipping roster slot with unknown position"
            );
            continue;
        };
        let role = match row.role.to_lowercase().as_str() {
            "starter" => RosterRole::Starter,
            "bench" => RosterRole::Bench,
            other => {
                warn!(player_id = %row.player_id, role = %other, "skipping roster slot with unknown role");
                continue;
            }
        };
        slots.push(RosterSlot {
            team_id: row.team_id,
            player_id: row.player_id,
            role,
            position,
        });
    }
    Ok(slots)
}

pub fn load_draft_picks<R: Read>(reader: R) -> Result<Vec<DraftSelection>, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut picks = Vec::new();

    for result in csv_reader.deserialize::<DraftRow>() {
        match result {
            Ok(row) => picks.push(DraftSelection {
                player_id: row.player_id,
                team_id: row.team_id,
                pick_number: row.pick_number,
            }),
            Err(e) => warn!("skipping malformed draft row: {e}"),
        }
    }
    Ok(picks)
}

pub fn load_matchups<R: Read>(reader: R) -> Result<Vec<MatchupResult>, csv::Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut matchups = Vec::new();

    for result in csv_reader.deserialize::<MatchupRow>() {
        match result {
            Ok(row) => matchups.push(MatchupResult {
                week: row.week,
                team_id: row.team_id,
                opponent_id: row.opponent_id,
                points_for: row.points_for,
                points_against: row.points_against,
            }),
            Err(e) => warn!("skipping malformed matchup row: {e}"),
        }
    }
    Ok(matchups)
}

// ---------------------------------------------------------------------------
// CSV file provider
// ---------------------------------------------------------------------------

/// DataProvider backed by the four record CSVs named in `[data_paths]`.
pub struct CsvFileProvider {
    paths: DataPaths,
}

impl CsvFileProvider {
    pub fn new(paths: DataPaths) -> Self {
        CsvFileProvider { paths }
    }

    fn open(path: &str) -> Result<std::fs::File, IngestError> {
        std::fs::File::open(path).map_err(|e| IngestError::Io {
            path: Path::new(path).to_path_buf(),
            source: e,
        })
    }

    fn wrap_csv<T>(path: &str, result: Result<T, csv::Error>) -> Result<T, IngestError> {
        result.map_err(|e| IngestError::Csv {
            path: Path::new(path).to_path_buf(),
            source: e,
        })
    }
}

#[async_trait]
impl DataProvider for CsvFileProvider {
    async fn fetch(
        &self,
        league_id: &str,
        season: u16,
        week: u16,
    ) -> Result<LeagueData, IngestError> {
        info!(league_id, season, week, "loading league data from csv files");

        let stat_lines = Self::wrap_csv(
            &self.paths.stat_lines,
            load_stat_lines(Self::open(&self.paths.stat_lines)?),
        )?;
        let rosters = Self::wrap_csv(
            &self.paths.rosters,
            load_rosters(Self::open(&self.paths.rosters)?),
        )?;
        let draft_picks = Self::wrap_csv(
            &self.paths.draft_picks,
            load_draft_picks(Self::open(&self.paths.draft_picks)?),
        )?;
        let matchups = Self::wrap_csv(
            &self.paths.matchups,
            load_matchups(Self::open(&self.paths.matchups)?),
        )?;

        Ok(LeagueData {
            stat_lines,
            rosters,
            draft_picks,
            matchups,
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
