//! Self-play training loop for Tabula.
//!
//! A training run repeats promotion rounds:
//!
//! 1. **Collect**: parallel self-play episodes with the incumbent predictor
//!    feed a bounded FIFO [`ExperienceBuffer`]
//! 2. **Train**: a copy of the incumbent takes `num_epoch` passes of
//!    shuffled mini-batches over the buffer
//! 3. **Gate**: the copy plays the incumbent in the [`Arena`] from both
//!    seats; the symmetric score decides promotion against `r_thresh`
//! 4. **Benchmark**: optionally, the incumbent plays a fixed baseline
//!
//! # Usage
//!
//! ```rust,no_run
//! use games_tictactoe::TicTacToe;
//! use mcts::LinearPredictor;
//! use trainer::{Trainer, TrainerSettings};
//!
//! let game = TicTacToe::new(3);
//! let predictor = LinearPredictor::new(9, 9, 0.01, 42);
//! let mut trainer = Trainer::new(&game, predictor, TrainerSettings::default()).unwrap();
//! let reports = trainer.run().unwrap();
//! println!("promotions: {}", reports.iter().filter(|r| r.promoted).count());
//! ```

pub mod arena;
pub mod config;
pub mod policy;
pub mod replay;
pub mod self_play;
pub mod stats;
pub mod trainer;

pub use arena::{Arena, ArenaError};
pub use config::Config;
pub use policy::{AlphaBetaPolicy, HumanPolicy, MctsPolicy, Policy, PolicyError, RandomPolicy};
pub use replay::{ExperienceBuffer, ReplayError, SharedExperienceBuffer};
pub use self_play::{play_episode, Episode, SelfPlayConfig};
pub use stats::{RoundReport, TrainerStats, TrainerStatsSnapshot, STATS_FILE};
pub use trainer::{Benchmark, Trainer, TrainerError, TrainerSettings};
