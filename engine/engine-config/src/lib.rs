//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! by the engine crates and the trainer binary.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`TABULA_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! TABULA_<SECTION>_<KEY>=value
//!
//! Examples:
//!     TABULA_COMMON_ENV_ID=reversi
//!     TABULA_COMMON_DATA_DIR=/data
//!     TABULA_TRAINING_NUM_ITER=50
//!     TABULA_MCTS_NUM_SIMULATIONS=100
//!     TABULA_EVALUATION_R_THRESH=0.1
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;
