//! Head-to-head evaluation between two policies.
//!
//! The arena owns the true board and whose turn it is; policies only ever see
//! the canonical board for the side to move. Any illegal answer ends the
//! evaluation with an error.

use engine_core::{Game, GameError, Player};
use thiserror::Error;
use tracing::{debug, error};

use crate::policy::{Policy, PolicyError};

/// Errors that abort an arena run.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("Policy '{policy}' chose illegal action {action} for {player}")]
    IllegalAction {
        policy: String,
        action: usize,
        player: Player,
    },

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Number of games must be greater than 0")]
    NoGames,
}

/// Plays games between two policies on one game.
pub struct Arena<'a> {
    game: &'a dyn Game,
    verbose: bool,
}

impl<'a> Arena<'a> {
    pub fn new(game: &'a dyn Game) -> Self {
        Self {
            game,
            verbose: false,
        }
    }

    /// Render every position at `debug` level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Play one game from the initial position. `first` moves first.
    ///
    /// Returns the final reward from `first`'s perspective.
    pub fn play_game(
        &self,
        first: &mut dyn Policy,
        second: &mut dyn Policy,
    ) -> Result<f32, ArenaError> {
        let first_player = self.game.first_player();
        let mut board = self.game.initial_board();
        let mut player = first_player;
        let mut turn = 0u32;

        while !self.game.is_terminal(&board, player) {
            let policy: &mut dyn Policy = if player == first_player {
                &mut *first
            } else {
                &mut *second
            };

            let canonical = self.game.canonical_form(&board, player);
            let action = policy.act(&canonical)?;

            if !self.game.is_legal(&board, player, action) {
                error!(
                    policy = policy.name(),
                    action,
                    %player,
                    "Illegal action in arena"
                );
                return Err(ArenaError::IllegalAction {
                    policy: policy.name().to_string(),
                    action,
                    player,
                });
            }

            let (next_board, next_player) = self.game.next_state(&board, player, action)?;
            board = next_board;
            player = next_player;
            turn += 1;

            if self.verbose {
                debug!(
                    turn,
                    action,
                    "{}\n{}",
                    policy.name(),
                    self.game.render(&board)
                );
            }
        }

        let reward = self.game.reward(&board, player);
        let reward = if player == first_player {
            reward
        } else {
            -reward
        };

        if self.verbose {
            debug!(turns = turn, reward, "Game over");
        }

        Ok(reward)
    }

    /// Play `n` fresh games with `first` always moving first and return the
    /// mean reward from `first`'s perspective. Both policies are reset before
    /// every game.
    pub fn play_games(
        &self,
        first: &mut dyn Policy,
        second: &mut dyn Policy,
        n: u32,
    ) -> Result<f32, ArenaError> {
        if n == 0 {
            return Err(ArenaError::NoGames);
        }

        let mut total = 0.0;
        for _ in 0..n {
            first.reset();
            second.reset();
            total += self.play_game(first, second)?;
        }

        let mean = total / n as f32;
        debug!(
            first = first.name(),
            second = second.name(),
            games = n,
            mean,
            "Arena series finished"
        );
        Ok(mean)
    }

    /// Mean reward differential of `a` over `b`, playing `n` games in each
    /// seating: `(r_ab - r_ba) / 2`, in `[-1, 1]`.
    pub fn evaluate_symmetric(
        &self,
        a: &mut dyn Policy,
        b: &mut dyn Policy,
        n: u32,
    ) -> Result<f32, ArenaError> {
        let r_ab = self.play_games(a, b, n)?;
        let r_ba = self.play_games(b, a, n)?;
        Ok((r_ab - r_ba) / 2.0)
    }
}
