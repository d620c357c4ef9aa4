// Snapshot orchestrator: decides between serving a fresh cached snapshot,
// recomputing, and falling back to stale data when recomputation fails.

use crate::config::Config;
use crate::ingest::DataProvider;
use crate::model::{LeagueSnapshot, SnapshotSource};
use crate::scoring;
use crate::store::{SnapshotStore, StoreError};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no data available for league {league_id} season {season} week {week}: {reason}")]
    NoDataAvailable {
        league_id: String,
        season: u16,
        week: u16,
        reason: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

type LeaseKey = (String, u16, u16);

pub struct Orchestrator {
    config: Config,
    store: Arc<SnapshotStore>,
    provider: Arc<dyn DataProvider>,
    /// One async lease per (league, season, week); at most one
    /// recomputation runs per key at a time.
    leases: Mutex<HashMap<LeaseKey, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(config: Config, store: Arc<SnapshotStore>, provider: Arc<dyn DataProvider>) -> Self {
        Orchestrator {
            config,
            store,
            provider,
            leases: Mutex::new(HashMap::new()),
        }
    }

    /// Sole entry point: produce the ranking snapshot for a (league,
    /// season, week).
    ///
    /// A snapshot younger than the freshness window is returned as-is
    /// (`fresh_cached`) unless `force_refresh` is set. Otherwise the data
    /// is refetched and rescored under a per-key lease and a bounded
    /// timeout; on failure the newest prior snapshot of any age is served
    /// with a warning (`cached_fallback`). Only a failure with no cached
    /// snapshot at all is an error.
    pub async fn compute_snapshot(
        &self,
        league_id: &str,
        season: u16,
        week: u16,
        force_refresh: bool,
    ) -> Result<LeagueSnapshot, EngineError> {
        if !force_refresh {
            if let Some(snapshot) = self.fresh_snapshot(league_id, season, week)? {
                info!(league_id, season, week, "serving fresh cached snapshot");
                return Ok(snapshot);
            }
        }

        let lease = self.lease_for(league_id, season, week).await;
        let _guard = lease.lock().await;

        // A concurrent caller may have finished the recomputation while we
        // waited on the lease; reuse its result.
        if !force_refresh {
            if let Some(snapshot) = self.fresh_snapshot(league_id, season, week)? {
                info!(league_id, season, week, "reusing snapshot computed while waiting");
                return Ok(snapshot);
            }
        }

        let timeout = Duration::from_secs(self.config.orchestrator.compute_timeout_secs);
        let computed = tokio::time::timeout(timeout, self.recompute(league_id, season, week)).await;

        match computed {
            Ok(Ok(snapshot)) => {
                self.store.insert(&snapshot)?;
                info!(league_id, season, week, "stored freshly calculated snapshot");
                Ok(snapshot)
            }
            Ok(Err(e)) => {
                warn!(league_id, season, week, error = %e, "recomputation failed, trying cache");
                self.fallback(league_id, season, week, format!("recomputation failed: {e}"))
            }
            Err(_) => {
                warn!(
                    league_id,
                    season,
                    week,
                    timeout_secs = self.config.orchestrator.compute_timeout_secs,
                    "recomputation timed out, trying cache"
                );
                self.fallback(
                    league_id,
                    season,
                    week,
                    format!(
                        "recomputation exceeded {}s timeout",
                        self.config.orchestrator.compute_timeout_secs
                    ),
                )
            }
        }
    }

    /// Latest snapshot if it is inside the freshness window, retagged as
    /// `fresh_cached`.
    fn fresh_snapshot(
        &self,
        league_id: &str,
        season: u16,
        week: u16,
    ) -> Result<Option<LeagueSnapshot>, EngineError> {
        let Some(mut snapshot) = self.store.latest(league_id, season, week)? else {
            return Ok(None);
        };
        let max_age = ChronoDuration::seconds(self.config.orchestrator.freshness_secs as i64);
        if Utc::now() - snapshot.calculated_at < max_age {
            snapshot.source = SnapshotSource::FreshCached;
            snapshot.warning = None;
            Ok(Some(snapshot))
        } else {
            Ok(None)
        }
    }

    /// Fetch and rescore. Runs inside the caller's timeout.
    async fn recompute(
        &self,
        league_id: &str,
        season: u16,
        week: u16,
    ) -> Result<LeagueSnapshot, crate::ingest::IngestError> {
        let data = self.provider.fetch(league_id, season, week).await?;
        let scored = scoring::score_league(&self.config, &data, season, week);
        Ok(LeagueSnapshot {
            league_id: league_id.to_string(),
            season,
            week,
            rankings: scored.rankings,
            gini_coefficient: scored.gini_coefficient,
            league_health: scored.league_health,
            calculated_at: Utc::now(),
            source: SnapshotSource::FreshCalculation,
            warning: None,
        })
    }

    /// Serve the newest prior snapshot of any age, tagged `cached_fallback`
    /// with a warning. No prior snapshot is the only hard failure.
    fn fallback(
        &self,
        league_id: &str,
        season: u16,
        week: u16,
        reason: String,
    ) -> Result<LeagueSnapshot, EngineError> {
        match self.store.latest(league_id, season, week)? {
            Some(mut snapshot) => {
                snapshot.source = SnapshotSource::CachedFallback;
                snapshot.warning = Some(format!("serving cached snapshot: {reason}"));
                Ok(snapshot)
            }
            None => Err(EngineError::NoDataAvailable {
                league_id: league_id.to_string(),
                season,
                week,
                reason,
            }),
        }
    }

    async fn lease_for(&self, league_id: &str, season: u16, week: u16) -> Arc<Mutex<()>> {
        let mut leases = self.leases.lock().await;
        leases
            .entry((league_id.to_string(), season, week))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
