//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::{Deserialize, Serialize};

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_env_id() -> String {
    defaults::env_id().into()
}
fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_num_iter() -> u32 {
    defaults::num_iter()
}
fn d_buffer_size() -> usize {
    defaults::buffer_size()
}
fn d_num_episode() -> u32 {
    defaults::num_episode()
}
fn d_num_epoch() -> u32 {
    defaults::num_epoch()
}
fn d_batch_size() -> usize {
    defaults::batch_size()
}
fn d_lr() -> f64 {
    defaults::learning_rate()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_temp_threshold() -> u32 {
    defaults::temp_threshold()
}
fn d_late_temperature() -> f64 {
    defaults::late_temperature()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_alpha() -> f64 {
    defaults::alpha()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_num_game() -> u32 {
    defaults::num_game()
}
fn d_r_thresh() -> f64 {
    defaults::r_thresh()
}
fn d_benchmark() -> String {
    defaults::benchmark().into()
}
fn d_benchmark_games() -> u32 {
    defaults::benchmark_games()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Settings shared by every component
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_env_id")]
    pub env_id: String,
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            env_id: defaults::env_id().into(),
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// Self-play and optimisation settings for the promotion loop
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    #[serde(default = "d_num_iter")]
    pub num_iter: u32,
    #[serde(default = "d_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "d_num_episode")]
    pub num_episode: u32,
    #[serde(default = "d_num_epoch")]
    pub num_epoch: u32,
    #[serde(default = "d_batch_size")]
    pub batch_size: usize,
    #[serde(default = "d_lr")]
    pub learning_rate: f64,
    #[serde(default = "d_seed")]
    pub seed: u64,
    /// Moves played at `mcts.temperature` before switching to `late_temperature`.
    /// Zero disables the schedule.
    #[serde(default = "d_temp_threshold")]
    pub temp_threshold: u32,
    #[serde(default = "d_late_temperature")]
    pub late_temperature: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_iter: defaults::num_iter(),
            buffer_size: defaults::buffer_size(),
            num_episode: defaults::num_episode(),
            num_epoch: defaults::num_epoch(),
            batch_size: defaults::batch_size(),
            learning_rate: defaults::learning_rate(),
            seed: defaults::seed(),
            temp_threshold: defaults::temp_threshold(),
            late_temperature: defaults::late_temperature(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_alpha")]
    pub alpha: f64,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            alpha: defaults::alpha(),
            temperature: defaults::temperature(),
        }
    }
}

/// Arena gate and benchmark configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Games per seating in the promotion gate.
    #[serde(default = "d_num_game")]
    pub num_game: u32,
    #[serde(default = "d_r_thresh")]
    pub r_thresh: f64,
    /// Baseline the incumbent is measured against: none, random, alphabeta
    /// or initial.
    #[serde(default = "d_benchmark")]
    pub benchmark: String,
    #[serde(default = "d_benchmark_games")]
    pub benchmark_games: u32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            num_game: defaults::num_game(),
            r_thresh: defaults::r_thresh(),
            benchmark: defaults::benchmark().into(),
            benchmark_games: defaults::benchmark_games(),
        }
    }
}
