//! Game registration for the Tabula engine
//!
//! This crate provides a single initialization point for registering all
//! available games with the engine-core registry.
//!
//! # Usage
//!
//! ```rust
//! use engine_games::register_all_games;
//!
//! // Call once at startup - safe to call multiple times
//! register_all_games();
//! assert!(engine_core::is_registered("tictactoe"));
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Register all available games with the engine-core registry.
///
/// This function uses `std::sync::Once` to ensure registration only
/// happens once, even if called multiple times. Safe to call from
/// multiple threads.
///
/// Currently registers:
/// - TicTacToe (`"tictactoe"`, `"tictactoe4"`)
/// - Reversi (`"reversi"`, `"reversi6"`, `"reversi8"`)
pub fn register_all_games() {
    INIT.call_once(|| {
        games_tictactoe::register_tictactoe();
        games_reversi::register_reversi();
    });
}

// Re-export individual registration functions for advanced use cases
pub use games_reversi::register_reversi;
pub use games_tictactoe::register_tictactoe;
