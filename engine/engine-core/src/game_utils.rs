//! Shared utilities for two-player game implementations
//!
//! This module provides common functionality used across multiple game implementations
//! to reduce code duplication and ensure consistent behavior.

use crate::board::{Board, Player};

/// Result of judging a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Play continues.
    Ongoing,
    /// The given player has won.
    Win(Player),
    /// Finished without a winner.
    Draw,
}

impl Outcome {
    pub fn is_finished(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// Calculate reward for a two-player zero-sum game.
///
/// # Arguments
/// * `outcome` - Judged result of the position
/// * `perspective` - The player the reward is reported for
///
/// # Returns
/// * `1.0` if `perspective` won
/// * `-1.0` if `perspective` lost
/// * `0.0` for draws or ongoing games
///
/// # Example
/// ```
/// use engine_core::game_utils::{calculate_reward, Outcome};
/// use engine_core::Player;
///
/// assert_eq!(calculate_reward(Outcome::Win(Player::One), Player::One), 1.0);
/// assert_eq!(calculate_reward(Outcome::Win(Player::One), Player::Two), -1.0);
/// assert_eq!(calculate_reward(Outcome::Draw, Player::One), 0.0);
/// assert_eq!(calculate_reward(Outcome::Ongoing, Player::Two), 0.0);
/// ```
#[inline]
pub fn calculate_reward(outcome: Outcome, perspective: Player) -> f32 {
    match outcome {
        Outcome::Win(winner) if winner == perspective => 1.0,
        Outcome::Win(_) => -1.0,
        Outcome::Draw | Outcome::Ongoing => 0.0,
    }
}

/// Stones owned by `player` minus stones owned by the opponent.
pub fn stone_difference(board: &Board, player: Player) -> i32 {
    board
        .cells()
        .iter()
        .map(|&c| (c * player.sign()) as i32)
        .sum()
}

/// Outcome decided by who holds more stones.
pub fn majority_outcome(board: &Board) -> Outcome {
    match stone_difference(board, Player::One) {
        d if d > 0 => Outcome::Win(Player::One),
        d if d < 0 => Outcome::Win(Player::Two),
        _ => Outcome::Draw,
    }
}
