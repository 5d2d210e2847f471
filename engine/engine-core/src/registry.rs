//! Static game registry
//!
//! This module provides a thread-safe registry that maps an env id to a
//! factory, so binaries can pick a game by name at runtime.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::game::Game;

/// Factory function type for creating game instances
pub type GameFactory = fn() -> Box<dyn Game>;

/// Thread-safe registry mapping env_id to game factory functions
static REGISTRY: Lazy<Mutex<HashMap<String, GameFactory>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn registry() -> MutexGuard<'static, HashMap<String, GameFactory>> {
    // The map is never left half-updated, so a poisoned lock is still usable.
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Register a game with the global registry
///
/// Registering the same env id twice replaces the earlier factory.
///
/// # Arguments
///
/// * `env_id` - Unique environment identifier (e.g., "tictactoe")
/// * `factory` - Function that creates new instances of the game
///
/// # Example
///
/// ```rust
/// # use engine_core::registry::*;
/// # use engine_core::{Board, Game, GameError, GameMetadata, Player};
/// #
/// # #[derive(Debug)]
/// # struct MyGame;
/// # impl Game for MyGame {
/// #     fn metadata(&self) -> GameMetadata { GameMetadata::new("my_game", "My Game") }
/// #     fn initial_board(&self) -> Board { Board::new(1, 1) }
/// #     fn action_size(&self) -> usize { 1 }
/// #     fn is_legal(&self, _: &Board, _: Player, _: usize) -> bool { false }
/// #     fn next_state(&self, _: &Board, player: Player, action: usize)
/// #         -> Result<(Board, Player), GameError> {
/// #         Err(GameError::IllegalAction { action, player })
/// #     }
/// #     fn is_terminal(&self, _: &Board, _: Player) -> bool { true }
/// #     fn reward(&self, _: &Board, _: Player) -> f32 { 0.0 }
/// # }
///
/// fn my_game_factory() -> Box<dyn Game> {
///     Box::new(MyGame)
/// }
///
/// register_game("my_game".to_string(), my_game_factory);
/// assert!(is_registered("my_game"));
/// ```
pub fn register_game(env_id: String, factory: GameFactory) {
    let mut registry = registry();
    if registry.contains_key(&env_id) {
        warn!(env_id = %env_id, "Overriding existing game registration");
    }
    registry.insert(env_id, factory);
}

/// Create a new game instance by env_id
///
/// # Returns
///
/// Returns `Some(game)` if the env_id is registered, `None` otherwise.
pub fn create_game(env_id: &str) -> Option<Box<dyn Game>> {
    let registry = registry();
    match registry.get(env_id) {
        Some(factory) => Some(factory()),
        None => {
            warn!(env_id = %env_id, "Attempted to create unregistered game");
            None
        }
    }
}

/// Get list of all registered environment IDs, sorted
pub fn list_registered_games() -> Vec<String> {
    let mut games: Vec<String> = registry().keys().cloned().collect();
    games.sort();
    games
}

/// Check if a game is registered
pub fn is_registered(env_id: &str) -> bool {
    registry().contains_key(env_id)
}

/// Clear all registered games (mainly for testing)
pub fn clear_registry() {
    registry().clear();
}

/// Convenience macro for registering games that implement `Default`
///
/// # Example
///
/// ```ignore
/// register_game!(TicTacToe, "tictactoe");
/// ```
#[macro_export]
macro_rules! register_game {
    ($game_type:ty, $env_id:expr) => {{
        fn factory() -> Box<dyn $crate::game::Game> {
            Box::new(<$game_type>::default())
        }
        $crate::registry::register_game($env_id.to_string(), factory);
    }};
}
