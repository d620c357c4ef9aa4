// Integration tests: CSV ingestion through scoring to orchestrated
// snapshots, exercising the crate the way the binary wires it.

use async_trait::async_trait;
use cpr_engine::config::{
    Config, CprWeights, DataPaths, LeagueConfig, LineupAggregate, LineupConfig, NivConfig,
    NivWeights, OrchestratorConfig,
};
use cpr_engine::ingest::{
    load_draft_picks, load_matchups, load_rosters, load_stat_lines, DataProvider, IngestError,
    LeagueData,
};
use cpr_engine::model::SnapshotSource;
use cpr_engine::orchestrator::Orchestrator;
use cpr_engine::scoring::score_league;
use cpr_engine::store::SnapshotStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ===========================================================================
// Fixtures
// ===========================================================================

fn test_config() -> Config {
    Config {
        league: LeagueConfig {
            league_id: "integration-league".into(),
            season: 2025,
            num_teams: 4,
        },
        niv: NivConfig { recency_window: 5 },
        niv_weights: NivWeights {
            recency: 0.30,
            consistency: 0.20,
            explosiveness: 0.15,
            market: 0.20,
            health: 0.15,
        },
        lineup: LineupConfig {
            aggregate: LineupAggregate::Mean,
            bench_discount: 0.4,
        },
        cpr_weights: CprWeights {
            sli: 0.35,
            bsi: 0.15,
            ingram: 0.25,
            alvarado: 0.25,
            zion_penalty: 0.10,
            mix_adjustment: 0.10,
        },
        orchestrator: OrchestratorConfig {
            freshness_secs: 3600,
            compute_timeout_secs: 30,
        },
        db_path: ":memory:".into(),
        data_paths: DataPaths {
            stat_lines: String::new(),
            rosters: String::new(),
            draft_picks: String::new(),
            matchups: String::new(),
        },
    }
}

/// A 4-team league with two weeks of play, loaded through the CSV layer so
/// the integration path matches production ingestion.
fn four_team_league() -> LeagueData {
    let stat_lines = "\
player_id,week,season,position,injury_status,passing_yards,passing_tds,interceptions,rushing_yards,rushing_tds,receptions,receiving_yards,receiving_tds,fumbles_lost,fantasy_points
a_qb,1,2025,QB,,310,3,0,12,0,0,0,0,0,0
a_qb,2,2025,QB,,280,2,1,20,0,0,0,0,0,0
a_rb,1,2025,RB,,0,0,0,95,1,3,22,0,0,0
a_rb,2,2025,RB,,0,0,0,110,2,2,15,0,0,0
b_qb,1,2025,QB,questionable,240,1,1,5,0,0,0,0,0,0
b_qb,2,2025,QB,questionable,200,1,2,8,0,0,0,0,0,0
b_wr,1,2025,WR,,0,0,0,0,0,6,80,1,0,0
b_wr,2,2025,WR,,0,0,0,0,0,4,45,0,0,0
c_qb,1,2025,QB,,180,1,0,0,0,0,0,0,0,0
c_qb,2,2025,QB,,190,1,1,0,0,0,0,0,0,0
c_te,1,2025,TE,,0,0,0,0,0,5,50,0,0,0
c_te,2,2025,TE,,0,0,0,0,0,3,35,1,0,0
d_qb,1,2025,QB,out,90,0,2,0,0,0,0,0,0,0
d_qb,2,2025,QB,out,100,1,1,0,0,0,0,0,0,0
d_wr,1,2025,WR,,0,0,0,0,0,2,25,0,1,0
d_wr,2,2025,WR,,0,0,0,0,0,3,30,0,0,0
";
    let rosters = "\
team_id,player_id,role,position
alpha,a_qb,starter,QB
alpha,a_rb,starter,RB
bravo,b_qb,starter,QB
bravo,b_wr,starter,WR
charlie,c_qb,starter,QB
charlie,c_te,bench,TE
delta,d_qb,starter,QB
delta,d_wr,bench,WR
";
    let draft_picks = "\
player_id,team_id,pick_number
a_qb,alpha,1
b_qb,bravo,2
c_qb,charlie,3
d_qb,delta,4
a_rb,alpha,5
b_wr,bravo,6
";
    let matchups = "\
week,team_id,opponent_id,points_for,points_against
1,alpha,bravo,130.5,98.0
1,bravo,alpha,98.0,130.5
1,charlie,delta,88.0,61.0
1,delta,charlie,61.0,88.0
2,alpha,charlie,121.0,84.0
2,charlie,alpha,84.0,121.0
2,bravo,delta,92.0,70.0
2,delta,bravo,70.0,92.0
";

    LeagueData {
        stat_lines: load_stat_lines(stat_lines.as_bytes()).unwrap(),
        rosters: load_rosters(rosters.as_bytes()).unwrap(),
        draft_picks: load_draft_picks(draft_picks.as_bytes()).unwrap(),
        matchups: load_matchups(matchups.as_bytes()).unwrap(),
    }
}

struct FixtureProvider {
    calls: AtomicUsize,
    fail: bool,
}

impl FixtureProvider {
    fn new() -> Self {
        FixtureProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        FixtureProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }
}

#[async_trait]
impl DataProvider for FixtureProvider {
    async fn fetch(
        &self,
        _league_id: &str,
        _season: u16,
        _week: u16,
    ) -> Result<LeagueData, IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(IngestError::Provider("fixture failure".into()));
        }
        Ok(four_team_league())
    }
}

// ===========================================================================
// Pipeline: CSV data through to ranked metrics
// ===========================================================================

#[test]
fn pipeline_produces_complete_ranked_metrics() {
    let config = test_config();
    let data = four_team_league();
    let scored = score_league(&config, &data, 2025, 2);

    assert_eq!(scored.rankings.len(), 4);

    // Ranks are exactly 1..N in order, descending by CPR.
    for (i, team) in scored.rankings.iter().enumerate() {
        assert_eq!(team.rank, (i + 1) as u32);
    }
    for pair in scored.rankings.windows(2) {
        assert!(pair[0].cpr >= pair[1].cpr);
    }

    // Every team carries all sub-indices within their documented ranges.
    for team in &scored.rankings {
        assert!((0.0..=1.0).contains(&team.ingram), "ingram out of range");
        assert!((0.0..=2.0).contains(&team.smi), "smi out of range");
        assert!((0.0..=100.0).contains(&team.alvarado), "alvarado out of range");
        assert!(team.zion >= 0.0);
        assert_eq!(team.zion_components.len(), 4);
    }

    // Gini invariants.
    assert!((0.0..=1.0).contains(&scored.gini_coefficient));
    assert!((scored.league_health - (1.0 - scored.gini_coefficient)).abs() < 1e-12);
}

#[test]
fn undefeated_roster_outranks_winless_roster() {
    let config = test_config();
    let data = four_team_league();
    let scored = score_league(&config, &data, 2025, 2);

    let position = |id: &str| scored.rankings.iter().position(|t| t.team_id == id).unwrap();
    // alpha is 2-0 with the best stat lines; delta is 0-2 with an injured
    // starting QB.
    assert!(position("alpha") < position("delta"));
}

#[test]
fn concentrated_starters_score_lower_ingram() {
    use cpr_engine::model::{Position, RosterRole, RosterSlot};
    use cpr_engine::scoring::ingram::compute_ingram;

    let slot = |player: &str, position: Position| RosterSlot {
        team_id: "t".into(),
        player_id: player.into(),
        role: RosterRole::Starter,
        position,
    };
    let concentrated = vec![
        slot("a", Position::WR),
        slot("b", Position::WR),
        slot("c", Position::WR),
        slot("d", Position::WR),
    ];
    let spread = vec![
        slot("a", Position::QB),
        slot("b", Position::RB),
        slot("c", Position::WR),
        slot("d", Position::TE),
    ];
    assert!(compute_ingram(&concentrated) < compute_ingram(&spread));
}

// ===========================================================================
// Orchestrator: freshness, fallback, serialization
// ===========================================================================

#[tokio::test]
async fn orchestrated_snapshot_serializes_the_full_contract() {
    let provider = Arc::new(FixtureProvider::new());
    let store = Arc::new(SnapshotStore::open(":memory:").unwrap());
    let orchestrator = Orchestrator::new(test_config(), store, provider);

    let snapshot = orchestrator
        .compute_snapshot("integration-league", 2025, 2, false)
        .await
        .unwrap();
    assert_eq!(snapshot.source, SnapshotSource::FreshCalculation);

    let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(json["league_id"], "integration-league");
    assert_eq!(json["season"], 2025);
    assert_eq!(json["week"], 2);
    assert_eq!(json["source"], "fresh_calculation");
    assert!(json["gini_coefficient"].is_number());
    assert!(json["league_health"].is_number());
    assert!(json["calculated_at"].is_string());
    assert!(json.get("warning").is_none());

    let rankings = json["rankings"].as_array().unwrap();
    assert_eq!(rankings.len(), 4);
    for team in rankings {
        for field in [
            "team_id", "cpr", "sli", "bsi", "smi", "ingram", "alvarado", "zion",
            "zion_components", "rank",
        ] {
            assert!(team.get(field).is_some(), "missing field {field}");
        }
    }
}

#[tokio::test]
async fn second_request_is_served_from_cache() {
    let provider = Arc::new(FixtureProvider::new());
    let store = Arc::new(SnapshotStore::open(":memory:").unwrap());
    let orchestrator = Orchestrator::new(test_config(), store, provider.clone());

    let first = orchestrator
        .compute_snapshot("integration-league", 2025, 2, false)
        .await
        .unwrap();
    let second = orchestrator
        .compute_snapshot("integration-league", 2025, 2, false)
        .await
        .unwrap();

    assert_eq!(first.source, SnapshotSource::FreshCalculation);
    assert_eq!(second.source, SnapshotSource::FreshCached);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    // The cached snapshot carries the same rankings.
    assert_eq!(first.rankings.len(), second.rankings.len());
    for (a, b) in first.rankings.iter().zip(second.rankings.iter()) {
        assert_eq!(a.team_id, b.team_id);
        assert_eq!(a.rank, b.rank);
    }
}

#[tokio::test]
async fn provider_outage_degrades_to_cached_fallback() {
    let store = Arc::new(SnapshotStore::open(":memory:").unwrap());

    // Seed a snapshot with a healthy provider, using a freshness window so
    // small that it is immediately stale.
    let mut config = test_config();
    config.orchestrator.freshness_secs = 1;
    {
        let provider = Arc::new(FixtureProvider::new());
        let orchestrator = Orchestrator::new(config.clone(), store.clone(), provider);
        orchestrator
            .compute_snapshot("integration-league", 2025, 2, false)
            .await
            .unwrap();
    }
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    // The provider now fails; the stale snapshot must still be served.
    let provider = Arc::new(FixtureProvider::failing());
    let orchestrator = Orchestrator::new(config, store, provider);
    let snapshot = orchestrator
        .compute_snapshot("integration-league", 2025, 2, false)
        .await
        .unwrap();

    assert_eq!(snapshot.source, SnapshotSource::CachedFallback);
    assert!(snapshot.warning.is_some());
    assert_eq!(snapshot.rankings.len(), 4);

    // The warning survives serialization.
    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(json["source"], "cached_fallback");
    assert!(json["warning"].is_string());
}

#[tokio::test]
async fn outage_with_empty_store_is_a_hard_error() {
    let provider = Arc::new(FixtureProvider::failing());
    let store = Arc::new(SnapshotStore::open(":memory:").unwrap());
    let orchestrator = Orchestrator::new(test_config(), store, provider);

    let result = orchestrator
        .compute_snapshot("integration-league", 2025, 2, false)
        .await;
    assert!(result.is_err());
}
