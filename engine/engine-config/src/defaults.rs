//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary agrees on
//! the same baseline without needing the file at runtime.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    training: TrainingDefaults,
    mcts: MctsDefaults,
    evaluation: EvaluationDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    env_id: String,
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct TrainingDefaults {
    num_iter: u32,
    buffer_size: usize,
    num_episode: u32,
    num_epoch: u32,
    batch_size: usize,
    learning_rate: f64,
    seed: u64,
    temp_threshold: u32,
    late_temperature: f64,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    alpha: f64,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct EvaluationDefaults {
    num_game: u32,
    r_thresh: f64,
    benchmark: String,
    benchmark_games: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn env_id() -> &'static str {
    &DEFAULTS.common.env_id
}
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Training
pub fn num_iter() -> u32 {
    DEFAULTS.training.num_iter
}
pub fn buffer_size() -> usize {
    DEFAULTS.training.buffer_size
}
pub fn num_episode() -> u32 {
    DEFAULTS.training.num_episode
}
pub fn num_epoch() -> u32 {
    DEFAULTS.training.num_epoch
}
pub fn batch_size() -> usize {
    DEFAULTS.training.batch_size
}
pub fn learning_rate() -> f64 {
    DEFAULTS.training.learning_rate
}
pub fn seed() -> u64 {
    DEFAULTS.training.seed
}
pub fn temp_threshold() -> u32 {
    DEFAULTS.training.temp_threshold
}
pub fn late_temperature() -> f64 {
    DEFAULTS.training.late_temperature
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn alpha() -> f64 {
    DEFAULTS.mcts.alpha
}
pub fn temperature() -> f64 {
    DEFAULTS.mcts.temperature
}

// Evaluation
pub fn num_game() -> u32 {
    DEFAULTS.evaluation.num_game
}
pub fn r_thresh() -> f64 {
    DEFAULTS.evaluation.r_thresh
}
pub fn benchmark() -> &'static str {
    &DEFAULTS.evaluation.benchmark
}
pub fn benchmark_games() -> u32 {
    DEFAULTS.evaluation.benchmark_games
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        // Just accessing these will verify the TOML parses correctly
        assert_eq!(env_id(), "tictactoe");
        assert_eq!(data_dir(), "./data");
        assert_eq!(log_level(), "info");
    }

    #[test]
    fn test_training_defaults() {
        assert_eq!(num_iter(), 20);
        assert_eq!(buffer_size(), 30000);
        assert_eq!(num_episode(), 500);
        assert_eq!(num_epoch(), 100);
        assert_eq!(batch_size(), 100);
        assert!((learning_rate() - 0.002).abs() < f64::EPSILON);
        assert_eq!(temp_threshold(), 0);
    }

    #[test]
    fn test_mcts_defaults() {
        assert_eq!(num_simulations(), 10);
        assert!((alpha() - 0.1).abs() < f64::EPSILON);
        assert!((temperature() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_evaluation_defaults() {
        assert_eq!(num_game(), 100);
        assert!(r_thresh().abs() < f64::EPSILON);
        assert_eq!(benchmark(), "initial");
        assert_eq!(benchmark_games(), 20);
    }
}
