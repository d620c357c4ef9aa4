// Configuration loading and parsing (config/engine.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Tolerance when checking that weight groups sum to 1.0.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// engine.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire engine.toml file.
#[derive(Debug, Clone, Deserialize)]
struct EngineFile {
    league: LeagueConfig,
    niv: NivConfig,
    niv_weights: NivWeights,
    lineup: LineupConfig,
    cpr_weights: CprWeights,
    orchestrator: OrchestratorConfig,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub league_id: String,
    pub season: u16,
    pub num_teams: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NivConfig {
    /// How many recent weeks feed the recency sub-score.
    pub recency_window: usize,
}

/// NIV sub-score weights. Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Deserialize)]
pub struct NivWeights {
    pub recency: f64,
    pub consistency: f64,
    pub explosiveness: f64,
    pub market: f64,
    pub health: f64,
}

impl NivWeights {
    pub fn sum(&self) -> f64 {
        self.recency + self.consistency + self.explosiveness + self.market + self.health
    }
}

/// How starter/bench NIV values are collapsed into SLI and BSI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineupAggregate {
    Mean,
    Sum,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineupConfig {
    pub aggregate: LineupAggregate,
    /// Bench NIV contributes less per unit than starter NIV.
    pub bench_discount: f64,
}

/// CPR composition weights. The four index weights must sum to 1.0;
/// `zion_penalty` and `mix_adjustment` are separate coefficients.
#[derive(Debug, Clone, Deserialize)]
pub struct CprWeights {
    pub sli: f64,
    pub bsi: f64,
    pub ingram: f64,
    pub alvarado: f64,
    pub zion_penalty: f64,
    pub mix_adjustment: f64,
}

impl CprWeights {
    pub fn index_sum(&self) -> f64 {
        self.sli + self.bsi + self.ingram + self.alvarado
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Snapshots younger than this are served without recomputation.
    pub freshness_secs: u64,
    /// Hard bound on one recomputation; exceeding it falls back to cache.
    pub compute_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub stat_lines: String,
    pub rosters: String,
    pub draft_picks: String,
    pub matchups: String,
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub niv: NivConfig,
    pub niv_weights: NivWeights,
    pub lineup: LineupConfig,
    pub cpr_weights: CprWeights,
    pub orchestrator: OrchestratorConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/engine.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let engine_path = base_dir.join("config").join("engine.toml");
    let engine_text = read_file(&engine_path)?;
    let file: EngineFile = toml::from_str(&engine_text).map_err(|e| ConfigError::ParseError {
        path: engine_path.clone(),
        source: e,
    })?;

    let config = Config {
        league: file.league,
        niv: file.niv,
        niv_weights: file.niv_weights,
        lineup: file.lineup,
        cpr_weights: file.cpr_weights,
        orchestrator: file.orchestrator,
        db_path: file.database.path,
        data_paths: file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure `config/engine.toml` exists by copying it from `defaults/` when
/// missing. Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let source = defaults_dir.join("engine.toml");
    let target = config_dir.join("engine.toml");
    let mut copied = Vec::new();

    if source.exists() && !target.exists() {
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!(
                "failed to copy {} to {}: {e}",
                source.display(),
                target.display()
            ),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying defaults first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.num_teams == 0 {
        return Err(ConfigError::ValidationError {
            field: "league.num_teams".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.niv.recency_window == 0 {
        return Err(ConfigError::ValidationError {
            field: "niv.recency_window".into(),
            message: "must be greater than 0".into(),
        });
    }

    let nw = &config.niv_weights;
    let niv_fields: &[(&str, f64)] = &[
        ("niv_weights.recency", nw.recency),
        ("niv_weights.consistency", nw.consistency),
        ("niv_weights.explosiveness", nw.explosiveness),
        ("niv_weights.market", nw.market),
        ("niv_weights.health", nw.health),
    ];
    for (name, val) in niv_fields {
        if *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be >= 0, got {val}"),
            });
        }
    }
    if (nw.sum() - 1.0).abs() > WEIGHT_SUM_EPSILON {
        return Err(ConfigError::ValidationError {
            field: "niv_weights".into(),
            message: format!("must sum to 1.0, got {}", nw.sum()),
        });
    }

    let cw = &config.cpr_weights;
    let cpr_fields: &[(&str, f64)] = &[
        ("cpr_weights.sli", cw.sli),
        ("cpr_weights.bsi", cw.bsi),
        ("cpr_weights.ingram", cw.ingram),
        ("cpr_weights.alvarado", cw.alvarado),
        ("cpr_weights.zion_penalty", cw.zion_penalty),
    ];
    for (name, val) in cpr_fields {
        if *val < 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be >= 0, got {val}"),
            });
        }
    }
    if (cw.index_sum() - 1.0).abs() > WEIGHT_SUM_EPSILON {
        return Err(ConfigError::ValidationError {
            field: "cpr_weights".into(),
            message: format!(
                "sli + bsi + ingram + alvarado must sum to 1.0, got {}",
                cw.index_sum()
            ),
        });
    }
    if !(0.0..=1.0).contains(&cw.mix_adjustment) {
        return Err(ConfigError::ValidationError {
            field: "cpr_weights.mix_adjustment".into(),
            message: format!("must be between 0.0 and 1.0 inclusive, got {}", cw.mix_adjustment),
        });
    }

    let discount = config.lineup.bench_discount;
    if !(0.0..=1.0).contains(&discount) {
        return Err(ConfigError::ValidationError {
            field: "lineup.bench_discount".into(),
            message: format!("must be between 0.0 and 1.0 inclusive, got {discount}"),
        });
    }

    if config.orchestrator.freshness_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "orchestrator.freshness_secs".into(),
            message: "must be greater than 0".into(),
        });
    }
    if config.orchestrator.compute_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "orchestrator.compute_timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
