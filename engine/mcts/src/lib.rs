//! Monte Carlo Tree Search (MCTS) for AlphaZero-style self-play.
//!
//! This crate provides a game-agnostic search that works with any game
//! implementing the `engine-core` [`Game`](engine_core::Game) trait, plus the
//! predictors that guide it.
//!
//! # Overview
//!
//! Statistics are kept per *state*, not per tree node: every position is
//! identified by its [`StateKey`](engine_core::StateKey) (board + side to
//! move), so transpositions share one entry. Each simulation:
//!
//! 1. **Terminal**: returns the game reward for the side to move
//! 2. **Expansion**: the first visit to a state calls the predictor once on
//!    the canonical board and returns the predicted value
//! 3. **Selection**: otherwise picks the legal action maximising
//!    `Q[a] + alpha * sqrt(sum N) / (1 + N[a])`
//! 4. **Backup**: folds the child's value into the running mean, negated only
//!    when the side to move changes
//!
//! # Usage
//!
//! ```rust
//! use engine_core::Game;
//! use games_tictactoe::TicTacToe;
//! use mcts::{argmax, Mcts, MctsConfig, UniformPredictor};
//!
//! let game = TicTacToe::new(3);
//! let predictor = UniformPredictor::new(game.action_size());
//! let mut search = Mcts::new(&game, &predictor, MctsConfig::for_testing());
//!
//! let board = game.initial_board();
//! let policy = search.get_action_prob(&board).unwrap();
//! let action = argmax(&policy).unwrap();
//! assert!(game.is_legal(&board, engine_core::Player::One, action));
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Simulations per `get_action_prob` call
//! - `alpha`: Exploration weight in the selection bound
//! - `temperature`: Sharpness of the visit distribution (0.0 = greedy)
//!
//! # Predictors
//!
//! - [`UniformPredictor`]: uniform prior, neutral value
//! - [`LinearPredictor`]: one-layer softmax/tanh model trained with Adam

pub mod config;
pub mod linear;
pub mod node;
pub mod predictor;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::MctsConfig;
pub use linear::LinearPredictor;
pub use node::NodeStats;
pub use predictor::{
    policy_divergence, Experience, LossReport, Prediction, Predictor, PredictorError,
    UniformPredictor, POLICY_LOSS_EPS,
};
pub use search::{argmax, sample_action, Mcts, SearchError, SearchStats};
pub use tree::{StatsTable, TableStats};
