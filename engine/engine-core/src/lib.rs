//! Core traits and types for the Tabula game engine
//!
//! This crate provides the fundamental abstractions shared by games, the
//! search engine and the trainer:
//! - `Board`, `Player`, `StateKey`: immutable position values and their identity
//! - `Game`: object-safe rules oracle for two-player zero-sum board games
//! - `GameMetadata`: display and sizing information about a game
//! - `Registry`: static registration of games by env id

pub mod board;
pub mod game;
pub mod game_utils;
pub mod metadata;
pub mod registry;

// Re-export main types for convenience
pub use board::{Board, Player, StateKey};
pub use game::{Game, GameError};
pub use game_utils::{calculate_reward, Outcome};
pub use metadata::GameMetadata;
pub use registry::{
    clear_registry, create_game, is_registered, list_registered_games, register_game, GameFactory,
};
