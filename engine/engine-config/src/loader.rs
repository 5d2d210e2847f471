//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TABULA_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a crate directory)
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the TABULA_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// Unreadable or malformed files fall back to the built-in defaults with a
/// warning; environment overrides are applied either way.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, usize, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(raw) = std::env::var($key) {
            match raw.parse() {
                Ok(v) => $config.$section.$field = v,
                Err(_) => warn!("Ignoring {}={}: not a valid value", $key, raw),
            }
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: TABULA_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.env_id, "TABULA_COMMON_ENV_ID");
    env_override!(config, common.data_dir, "TABULA_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "TABULA_COMMON_LOG_LEVEL");

    // Training
    env_override!(config, training.num_iter, "TABULA_TRAINING_NUM_ITER", parse);
    env_override!(
        config,
        training.buffer_size,
        "TABULA_TRAINING_BUFFER_SIZE",
        parse
    );
    env_override!(
        config,
        training.num_episode,
        "TABULA_TRAINING_NUM_EPISODE",
        parse
    );
    env_override!(
        config,
        training.num_epoch,
        "TABULA_TRAINING_NUM_EPOCH",
        parse
    );
    env_override!(
        config,
        training.batch_size,
        "TABULA_TRAINING_BATCH_SIZE",
        parse
    );
    env_override!(
        config,
        training.learning_rate,
        "TABULA_TRAINING_LEARNING_RATE",
        parse
    );
    env_override!(config, training.seed, "TABULA_TRAINING_SEED", parse);
    env_override!(
        config,
        training.temp_threshold,
        "TABULA_TRAINING_TEMP_THRESHOLD",
        parse
    );
    env_override!(
        config,
        training.late_temperature,
        "TABULA_TRAINING_LATE_TEMPERATURE",
        parse
    );

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "TABULA_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.alpha, "TABULA_MCTS_ALPHA", parse);
    env_override!(config, mcts.temperature, "TABULA_MCTS_TEMPERATURE", parse);

    // Evaluation
    env_override!(
        config,
        evaluation.num_game,
        "TABULA_EVALUATION_NUM_GAME",
        parse
    );
    env_override!(
        config,
        evaluation.r_thresh,
        "TABULA_EVALUATION_R_THRESH",
        parse
    );
    env_override!(config, evaluation.benchmark, "TABULA_EVALUATION_BENCHMARK");
    env_override!(
        config,
        evaluation.benchmark_games,
        "TABULA_EVALUATION_BENCHMARK_GAMES",
        parse
    );

    config
}
