// Scoring pipeline: turns one week of league data into ranked team metrics.

pub mod alvarado;
pub mod cpr;
pub mod health;
pub mod ingram;
pub mod lineup;
pub mod niv;
pub mod smi;
pub mod stats;
pub mod zion;

use crate::config::Config;
use crate::ingest::LeagueData;
use crate::model::{PlayerNiv, RosterRole, TeamMetrics};
use crate::scoring::alvarado::ValueSample;
use crate::scoring::zion::OpponentProfile;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Everything the orchestrator needs to assemble a snapshot body.
#[derive(Debug, Clone)]
pub struct ScoredLeague {
    pub rankings: Vec<TeamMetrics>,
    pub player_nivs: Vec<PlayerNiv>,
    pub gini_coefficient: f64,
    pub league_health: f64,
}

/// Score every team in the league through `week`. Pure and deterministic:
/// the same data and config always produce the same rankings.
pub fn score_league(config: &Config, data: &LeagueData, season: u16, week: u16) -> ScoredLeague {
    // Only data through the target week participates.
    let stat_lines: Vec<_> = data
        .stat_lines
        .iter()
        .filter(|line| line.season == season && line.week <= week)
        .collect();
    let matchups: Vec<_> = data.matchups.iter().filter(|m| m.week <= week).collect();

    // Per-player history, ordered by week.
    let mut histories: HashMap<&str, Vec<&crate::model::PlayerStatLine>> = HashMap::new();
    for line in &stat_lines {
        histories.entry(line.player_id.as_str()).or_default().push(*line);
    }
    for history in histories.values_mut() {
        history.sort_by_key(|line| line.week);
    }

    // Position peer pools: season totals per player, grouped by position.
    let mut peer_totals: HashMap<crate::model::Position, Vec<f64>> = HashMap::new();
    for history in histories.values() {
        let position = history[0].position;
        let total: f64 = history.iter().map(|l| l.fantasy_points).sum();
        peer_totals.entry(position).or_default().push(total);
    }

    // NIV per rostered player. Injury status comes from the latest line.
    let mut nivs: HashMap<String, PlayerNiv> = HashMap::new();
    for slot in &data.rosters {
        if nivs.contains_key(&slot.player_id) {
            continue;
        }
        let history = histories.get(slot.player_id.as_str());
        let (owned, position, injury) = match history.and_then(|lines| lines.last().copied()) {
            Some(latest) => (
                history
                    .map(|lines| lines.iter().map(|l| (*l).clone()).collect::<Vec<_>>())
                    .unwrap_or_default(),
                latest.position,
                latest.injury_status,
            ),
            None => (Vec::new(), slot.position, Default::default()),
        };
        let peers = peer_totals.get(&position).map(Vec::as_slice).unwrap_or(&[]);
        let niv = niv::compute_player_niv(
            &slot.player_id,
            season,
            week,
            position,
            &owned,
            peers,
            injury,
            &config.niv_weights,
            config.niv.recency_window,
        );
        nivs.insert(slot.player_id.clone(), niv);
    }

    // The team universe: every team with a roster or a matchup, in a
    // deterministic order.
    let mut team_ids: BTreeSet<String> = data.rosters.iter().map(|s| s.team_id.clone()).collect();
    for matchup in &matchups {
        team_ids.insert(matchup.team_id.clone());
    }

    let mut slots_by_team: HashMap<&str, Vec<&crate::model::RosterSlot>> = HashMap::new();
    for slot in &data.rosters {
        slots_by_team.entry(slot.team_id.as_str()).or_default().push(slot);
    }
    let mut matchups_by_team: HashMap<&str, Vec<crate::model::MatchupResult>> = HashMap::new();
    for matchup in &matchups {
        matchups_by_team
            .entry(matchup.team_id.as_str())
            .or_default()
            .push((*matchup).clone());
    }

    // Team weekly totals over rostered players, feeding the marginal
    // contribution estimate.
    let mut team_weekly_totals: HashMap<&str, HashMap<u16, f64>> = HashMap::new();
    for slot in &data.rosters {
        if let Some(history) = histories.get(slot.player_id.as_str()) {
            let totals = team_weekly_totals.entry(slot.team_id.as_str()).or_default();
            for line in history {
                *totals.entry(line.week).or_insert(0.0) += line.fantasy_points;
            }
        }
    }

    // Draft costs. Undrafted players carry the worst case, total picks + 1.
    let total_picks = data.draft_picks.len() as f64;
    let draft_costs: HashMap<&str, f64> = data
        .draft_picks
        .iter()
        .map(|pick| (pick.player_id.as_str(), pick.pick_number as f64))
        .collect();
    let undrafted_cost = total_picks + 1.0;

    // League-wide value samples for Alvarado.
    let empty_totals = HashMap::new();
    let samples: Vec<ValueSample> = data
        .rosters
        .iter()
        .map(|slot| {
            let weekly: Vec<(u16, f64)> = histories
                .get(slot.player_id.as_str())
                .map(|lines| lines.iter().map(|l| (l.week, l.fantasy_points)).collect())
                .unwrap_or_default();
            let totals = team_weekly_totals
                .get(slot.team_id.as_str())
                .unwrap_or(&empty_totals);
            ValueSample {
                player_id: slot.player_id.clone(),
                team_id: slot.team_id.clone(),
                is_starter: slot.role == RosterRole::Starter,
                marginal: alvarado::marginal_contribution(&weekly, totals),
                niv: nivs.get(&slot.player_id).map(|n| n.niv).unwrap_or(0.0),
                draft_cost: *draft_costs.get(slot.player_id.as_str()).unwrap_or(&undrafted_cost),
            }
        })
        .collect();
    let alvarado_by_team = alvarado::compute_team_alvarado(&samples);

    // First pass: per-team roster indices, feeding the opponent profiles
    // that Zion needs in the second pass.
    let mut first_pass: HashMap<String, (f64, f64, f64, f64, f64)> = HashMap::new();
    let mut profiles: HashMap<String, OpponentProfile> = HashMap::new();
    for team_id in &team_ids {
        let slots = slots_by_team.get(team_id.as_str()).cloned().unwrap_or_default();
        let team_matchups = matchups_by_team
            .get(team_id.as_str())
            .cloned()
            .unwrap_or_default();

        let starter_nivs: Vec<f64> = slots
            .iter()
            .filter(|s| s.role == RosterRole::Starter)
            .filter_map(|s| nivs.get(&s.player_id).map(|n| n.niv))
            .collect();
        let bench_nivs: Vec<f64> = slots
            .iter()
            .filter(|s| s.role == RosterRole::Bench)
            .filter_map(|s| nivs.get(&s.player_id).map(|n| n.niv))
            .collect();

        let owned_slots: Vec<crate::model::RosterSlot> =
            slots.iter().map(|s| (*s).clone()).collect();
        let sli = lineup::compute_sli(&starter_nivs, &config.lineup);
        let bsi = lineup::compute_bsi(&bench_nivs, &config.lineup);
        let ingram_value = ingram::compute_ingram(&owned_slots);
        let smi_value = smi::compute_smi(&team_matchups);
        let alvarado_value = *alvarado_by_team.get(team_id).unwrap_or(&0.0);

        profiles.insert(
            team_id.clone(),
            OpponentProfile {
                win_rate: smi::win_rate(&team_matchups),
                score_variance: zion::weekly_score_variance(&team_matchups),
                ingram: ingram_value,
                alvarado: alvarado_value,
            },
        );
        first_pass.insert(team_id.clone(), (sli, bsi, ingram_value, alvarado_value, smi_value));
    }

    // Second pass: Zion, CPR, ranking.
    let mut rankings: Vec<TeamMetrics> = team_ids
        .iter()
        .map(|team_id| {
            let (sli, bsi, ingram_value, alvarado_value, smi_value) = first_pass[team_id];
            let team_matchups = matchups_by_team
                .get(team_id.as_str())
                .cloned()
                .unwrap_or_default();
            let (zion_components, zion_magnitude) = zion::compute_zion(&team_matchups, &profiles);
            let cpr_value = cpr::compose_cpr(
                sli,
                bsi,
                ingram_value,
                alvarado_value,
                zion_magnitude,
                &config.cpr_weights,
            );
            TeamMetrics {
                team_id: team_id.clone(),
                week,
                sli,
                bsi,
                smi: smi_value,
                ingram: ingram_value,
                alvarado: alvarado_value,
                zion: zion_magnitude,
                zion_components,
                cpr: cpr_value,
                rank: 0,
            }
        })
        .collect();
    cpr::rank_teams(&mut rankings);

    let cpr_values: Vec<f64> = rankings.iter().map(|t| t.cpr).collect();
    let gini = health::gini_coefficient(&cpr_values);

    debug!(
        teams = rankings.len(),
        players = nivs.len(),
        gini,
        "scored league week {week}"
    );

    ScoredLeague {
        rankings,
        player_nivs: nivs.into_values().collect(),
        gini_coefficient: gini,
        league_health: health::league_health(gini),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
