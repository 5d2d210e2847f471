//! Command-line configuration for the trainer
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::self_play::SelfPlayConfig;
use crate::trainer::{Benchmark, TrainerSettings};

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_env_id() -> String {
    CENTRAL_CONFIG.common.env_id.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_num_iter() -> u32 {
    CENTRAL_CONFIG.training.num_iter
}

fn default_buffer_size() -> usize {
    CENTRAL_CONFIG.training.buffer_size
}

fn default_num_episode() -> u32 {
    CENTRAL_CONFIG.training.num_episode
}

fn default_num_epoch() -> u32 {
    CENTRAL_CONFIG.training.num_epoch
}

fn default_batch_size() -> usize {
    CENTRAL_CONFIG.training.batch_size
}

fn default_learning_rate() -> f32 {
    CENTRAL_CONFIG.training.learning_rate as f32
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.training.seed
}

fn default_temp_threshold() -> u32 {
    CENTRAL_CONFIG.training.temp_threshold
}

fn default_late_temperature() -> f32 {
    CENTRAL_CONFIG.training.late_temperature as f32
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_alpha() -> f32 {
    CENTRAL_CONFIG.mcts.alpha as f32
}

fn default_temperature() -> f32 {
    CENTRAL_CONFIG.mcts.temperature as f32
}

fn default_num_game() -> u32 {
    CENTRAL_CONFIG.evaluation.num_game
}

fn default_r_thresh() -> f32 {
    CENTRAL_CONFIG.evaluation.r_thresh as f32
}

fn default_benchmark() -> String {
    CENTRAL_CONFIG.evaluation.benchmark.clone()
}

fn default_benchmark_games() -> u32 {
    CENTRAL_CONFIG.evaluation.benchmark_games
}

/// Predictors the binary knows how to build.
pub const PREDICTORS: [&str; 2] = ["linear", "uniform"];

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "tabula-trainer")]
#[command(about = "Tabula trainer - self-play, training and promotion loop")]
#[command(
    long_about = "Runs rounds of parallel MCTS self-play, trains a candidate predictor on
the replay buffer, and promotes it when it beats the incumbent in the arena.

Configuration is loaded from config.toml with TABULA_* environment variable
overrides. CLI arguments take highest priority."
)]
pub struct Config {
    /// Environment ID to train (e.g., tictactoe, reversi)
    #[arg(long, default_value_t = default_env_id())]
    pub env_id: String,

    /// Directory for trainer_stats.json
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Number of promotion rounds
    #[arg(long, default_value_t = default_num_iter())]
    pub num_iter: u32,

    /// Replay buffer capacity in examples
    #[arg(long, default_value_t = default_buffer_size())]
    pub buffer_size: usize,

    /// Self-play episodes per round
    #[arg(long, default_value_t = default_num_episode())]
    pub num_episode: u32,

    /// Training epochs per round
    #[arg(long, default_value_t = default_num_epoch())]
    pub num_epoch: u32,

    /// Mini-batch size
    #[arg(long, default_value_t = default_batch_size())]
    pub batch_size: usize,

    /// Optimizer learning rate
    #[arg(long, default_value_t = default_learning_rate())]
    pub learning_rate: f32,

    /// Seed for initialization, self-play and shuffling
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Move number after which self-play switches to --late-temperature (0 to disable)
    #[arg(long, default_value_t = default_temp_threshold())]
    pub temp_threshold: u32,

    /// Root temperature once --temp-threshold is reached
    #[arg(long, default_value_t = default_late_temperature())]
    pub late_temperature: f32,

    /// Number of MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// Exploration coefficient
    #[arg(long, default_value_t = default_alpha())]
    pub alpha: f32,

    /// Self-play root temperature (0 for greedy)
    #[arg(long, default_value_t = default_temperature())]
    pub temperature: f32,

    /// Arena games per seating when gating a candidate
    #[arg(long, default_value_t = default_num_game())]
    pub num_game: u32,

    /// Promote when the candidate's score is strictly greater than this
    #[arg(long, default_value_t = default_r_thresh(), allow_negative_numbers = true)]
    pub r_thresh: f32,

    /// Baseline after each round (none, random, alphabeta, initial)
    #[arg(long, default_value_t = default_benchmark())]
    pub benchmark: String,

    /// Benchmark games per seating
    #[arg(long, default_value_t = default_benchmark_games())]
    pub benchmark_games: u32,

    /// Predictor to train (linear, uniform)
    #[arg(long, default_value = "linear")]
    pub predictor: String,

    /// Render arena games at debug level
    #[arg(long)]
    pub verbose: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.env_id.is_empty() {
            return Err(anyhow!("env_id cannot be empty"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        if self.buffer_size == 0 {
            return Err(anyhow!("buffer_size must be greater than 0"));
        }

        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }

        if self.num_simulations == 0 {
            return Err(anyhow!("num_simulations must be greater than 0"));
        }

        if self.num_game == 0 {
            return Err(anyhow!("num_game must be greater than 0"));
        }

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(anyhow!("learning_rate must be a positive number"));
        }

        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(anyhow!("alpha must be a non-negative number"));
        }

        if !(self.temperature >= 0.0 && self.late_temperature >= 0.0) {
            return Err(anyhow!("temperatures must be non-negative"));
        }

        if !(-1.0..1.0).contains(&self.r_thresh) {
            return Err(anyhow!("r_thresh must be in [-1, 1), got {}", self.r_thresh));
        }

        let benchmark = self.benchmark()?;
        if benchmark != Benchmark::None && self.benchmark_games == 0 {
            return Err(anyhow!(
                "benchmark_games must be greater than 0 when benchmark is '{}'",
                benchmark
            ));
        }

        if !PREDICTORS.contains(&self.predictor.as_str()) {
            return Err(anyhow!(
                "unknown predictor '{}', expected one of {}",
                self.predictor,
                PREDICTORS.join(", ")
            ));
        }

        Ok(())
    }

    pub fn benchmark(&self) -> Result<Benchmark> {
        self.benchmark.parse::<Benchmark>().map_err(|e| anyhow!(e))
    }

    /// Data directory as a path
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Search settings for self-play.
    pub fn self_play_mcts(&self) -> MctsConfig {
        MctsConfig::default()
            .with_simulations(self.num_simulations)
            .with_alpha(self.alpha)
            .with_temperature(self.temperature)
    }

    /// Search settings for arena games. Arena play is always greedy.
    pub fn eval_mcts(&self) -> MctsConfig {
        self.self_play_mcts().with_temperature(0.0)
    }

    pub fn trainer_settings(&self) -> Result<TrainerSettings> {
        Ok(TrainerSettings {
            num_iter: self.num_iter,
            num_episode: self.num_episode,
            num_epoch: self.num_epoch,
            batch_size: self.batch_size,
            num_game: self.num_game,
            r_thresh: self.r_thresh,
            buffer_size: self.buffer_size,
            self_play: SelfPlayConfig::new(self.self_play_mcts())
                .with_temperature_schedule(self.temp_threshold, self.late_temperature),
            eval_mcts: self.eval_mcts(),
            benchmark: self.benchmark()?,
            benchmark_games: self.benchmark_games,
            seed: self.seed,
            verbose: self.verbose,
        })
    }
}
