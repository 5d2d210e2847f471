//! The promotion loop.
//!
//! Each round collects self-play games from the incumbent into the replay
//! buffer, trains a copy of the incumbent on the buffer, and lets the copy
//! play the incumbent in the arena. The copy replaces the incumbent only when
//! its symmetric score beats `r_thresh`.

use std::fmt;
use std::str::FromStr;

use engine_core::Game;
use mcts::{LossReport, MctsConfig, Predictor, PredictorError, SearchError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::arena::{Arena, ArenaError};
use crate::policy::{AlphaBetaPolicy, MctsPolicy, RandomPolicy};
use crate::replay::{ReplayError, SharedExperienceBuffer};
use crate::self_play::{play_episode, SelfPlayConfig};
use crate::stats::{RoundReport, TrainerStats};

/// Errors that abort training.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("Invalid trainer settings: {0}")]
    InvalidSettings(String),

    #[error("Self-play failed: {0}")]
    Search(#[from] SearchError),

    #[error("Predictor error: {0}")]
    Predictor(#[from] PredictorError),

    #[error("Arena error: {0}")]
    Arena(#[from] ArenaError),

    #[error("Replay buffer error: {0}")]
    Replay(#[from] ReplayError),
}

/// Baseline the incumbent is measured against after each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Benchmark {
    /// No benchmark games
    None,
    /// Uniformly random legal moves
    Random,
    /// Perfect play by exhaustive search; only practical on small games
    AlphaBeta,
    /// The untrained predictor the run started from
    #[default]
    Initial,
}

impl FromStr for Benchmark {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Benchmark::None),
            "random" => Ok(Benchmark::Random),
            "alphabeta" | "alpha_beta" | "alpha-beta" => Ok(Benchmark::AlphaBeta),
            "initial" => Ok(Benchmark::Initial),
            other => Err(format!(
                "unknown benchmark '{}' (expected none, random, alphabeta or initial)",
                other
            )),
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Benchmark::None => "none",
            Benchmark::Random => "random",
            Benchmark::AlphaBeta => "alphabeta",
            Benchmark::Initial => "initial",
        };
        f.write_str(name)
    }
}

/// Knobs for a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerSettings {
    /// Promotion rounds to run
    pub num_iter: u32,
    /// Self-play episodes per round
    pub num_episode: u32,
    /// Passes over the buffer per round
    pub num_epoch: u32,
    pub batch_size: usize,
    /// Games per seating when gating a candidate
    pub num_game: u32,
    /// Promote when the gate score is strictly greater than this
    pub r_thresh: f32,
    /// Replay buffer capacity in examples
    pub buffer_size: usize,
    pub self_play: SelfPlayConfig,
    /// Search settings for arena play (gate and benchmark)
    pub eval_mcts: MctsConfig,
    pub benchmark: Benchmark,
    /// Games per seating against the benchmark
    pub benchmark_games: u32,
    pub seed: u64,
    /// Render arena games at debug level
    pub verbose: bool,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            num_iter: 20,
            num_episode: 500,
            num_epoch: 100,
            batch_size: 100,
            num_game: 100,
            r_thresh: 0.0,
            buffer_size: 30000,
            self_play: SelfPlayConfig::new(MctsConfig::for_training()),
            eval_mcts: MctsConfig::for_evaluation(),
            benchmark: Benchmark::Initial,
            benchmark_games: 20,
            seed: 42,
            verbose: false,
        }
    }
}

impl TrainerSettings {
    pub fn validate(&self) -> Result<(), TrainerError> {
        let invalid = |msg: &str| Err(TrainerError::InvalidSettings(msg.to_string()));

        if self.batch_size == 0 {
            return invalid("batch_size must be greater than 0");
        }
        if self.buffer_size == 0 {
            return invalid("buffer_size must be greater than 0");
        }
        if self.num_game == 0 {
            return invalid("num_game must be greater than 0");
        }
        if self.benchmark != Benchmark::None && self.benchmark_games == 0 {
            return invalid("benchmark_games must be greater than 0 when a benchmark is set");
        }
        if self.self_play.mcts.num_simulations == 0 || self.eval_mcts.num_simulations == 0 {
            return invalid("num_simulations must be greater than 0");
        }
        Ok(())
    }
}

/// Drives self-play, training, gating and promotion for one game.
pub struct Trainer<'a, P: Predictor + Clone> {
    game: &'a dyn Game,
    incumbent: P,
    /// Snapshot of the starting predictor for the `initial` benchmark
    initial: P,
    buffer: SharedExperienceBuffer,
    settings: TrainerSettings,
    rng: ChaCha20Rng,
    stats: TrainerStats,
}

impl<'a, P: Predictor + Clone> Trainer<'a, P> {
    pub fn new(game: &'a dyn Game, predictor: P, settings: TrainerSettings) -> Result<Self, TrainerError> {
        settings.validate()?;

        Ok(Self {
            game,
            initial: predictor.clone(),
            incumbent: predictor,
            buffer: SharedExperienceBuffer::new(settings.buffer_size)?,
            rng: ChaCha20Rng::seed_from_u64(settings.seed),
            stats: TrainerStats::new(&game.metadata().env_id),
            settings,
        })
    }

    /// Replace the stats sink, e.g. with one that persists to disk.
    pub fn with_stats(mut self, stats: TrainerStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn incumbent(&self) -> &P {
        &self.incumbent
    }

    pub fn initial(&self) -> &P {
        &self.initial
    }

    pub fn buffer(&self) -> &SharedExperienceBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> &TrainerStats {
        &self.stats
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    /// Play `num_episode` self-play games with the incumbent in parallel and
    /// append their examples to the buffer. Returns the number of examples
    /// added.
    ///
    /// Episode seeds come from the trainer's generator, so the set of games
    /// is reproducible; the order in which episodes land in the buffer is not.
    pub fn collect(&mut self) -> Result<usize, TrainerError> {
        let seeds: Vec<u64> = (0..self.settings.num_episode)
            .map(|_| self.rng.gen())
            .collect();

        let game = self.game;
        let predictor = &self.incumbent;
        let config = &self.settings.self_play;
        let buffer = &self.buffer;
        let stats = &self.stats;

        let added: usize = seeds
            .into_par_iter()
            .map(|seed| -> Result<usize, TrainerError> {
                let mut rng = ChaCha20Rng::seed_from_u64(seed);
                let episode = play_episode(game, predictor, config, &mut rng)?;
                let moves = episode.moves();
                stats.record_episode(moves, episode.reward);
                buffer.extend(episode.examples)?;
                Ok(moves)
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .sum();

        debug!(added, buffer_len = self.buffer.len()?, "Self-play collection finished");
        Ok(added)
    }

    /// Train a copy of the incumbent for `num_epoch` passes over the buffer.
    ///
    /// Returns the candidate and the sample-weighted average loss of each
    /// epoch. An empty buffer yields the unchanged copy and empty reports.
    pub fn train_candidate(&mut self) -> Result<(P, Vec<LossReport>), TrainerError> {
        let mut candidate = self.incumbent.clone();
        let buffer = self.buffer.lock()?;
        let mut losses = Vec::with_capacity(self.settings.num_epoch as usize);

        for epoch in 0..self.settings.num_epoch {
            let mut epoch_loss = LossReport::default();
            for batch in buffer.shuffled_batches(self.settings.batch_size, &mut self.rng)? {
                let report = candidate.train_step(&batch)?;
                epoch_loss.merge(&report);
            }
            debug!(
                epoch,
                policy_loss = epoch_loss.policy_loss,
                value_loss = epoch_loss.value_loss,
                "Epoch finished"
            );
            losses.push(epoch_loss);
        }

        Ok((candidate, losses))
    }

    /// Symmetric arena score of `candidate` against the incumbent, in
    /// `[-1, 1]`. Both sides search with `eval_mcts` and a fresh tree per
    /// game.
    pub fn gate(&self, candidate: &P) -> Result<f32, TrainerError> {
        let arena = Arena::new(self.game).with_verbose(self.settings.verbose);
        let eval = &self.settings.eval_mcts;

        let mut challenger = MctsPolicy::new(self.game, candidate, eval.clone()).with_name("candidate");
        let mut incumbent =
            MctsPolicy::new(self.game, &self.incumbent, eval.clone()).with_name("incumbent");

        Ok(arena.evaluate_symmetric(&mut challenger, &mut incumbent, self.settings.num_game)?)
    }

    /// Adopt `candidate` when `score` strictly exceeds `r_thresh`.
    pub fn promote(&mut self, candidate: P, score: f32) -> bool {
        if score > self.settings.r_thresh {
            self.incumbent = candidate;
            true
        } else {
            false
        }
    }

    /// Symmetric score of the incumbent against the configured baseline, or
    /// `None` when benchmarking is off.
    pub fn benchmark(&mut self) -> Result<Option<f32>, TrainerError> {
        let games = self.settings.benchmark_games;
        let arena = Arena::new(self.game).with_verbose(self.settings.verbose);
        let eval = self.settings.eval_mcts.clone();
        let seed: u64 = self.rng.gen();

        let mut incumbent =
            MctsPolicy::new(self.game, &self.incumbent, eval.clone()).with_name("incumbent");

        let score = match self.settings.benchmark {
            Benchmark::None => return Ok(None),
            Benchmark::Random => {
                let mut baseline = RandomPolicy::new(self.game, seed);
                arena.evaluate_symmetric(&mut incumbent, &mut baseline, games)?
            }
            Benchmark::AlphaBeta => {
                let mut baseline = AlphaBetaPolicy::new(self.game);
                arena.evaluate_symmetric(&mut incumbent, &mut baseline, games)?
            }
            Benchmark::Initial => {
                let mut baseline = MctsPolicy::new(self.game, &self.initial, eval).with_name("initial");
                arena.evaluate_symmetric(&mut incumbent, &mut baseline, games)?
            }
        };

        Ok(Some(score))
    }

    /// One full round: collect, train, gate, promote, benchmark.
    pub fn run_round(&mut self, round: u32) -> Result<RoundReport, TrainerError> {
        let examples_added = self.collect()?;
        let buffer_len = self.buffer.len()?;

        let (candidate, epoch_losses) = self.train_candidate()?;
        let gate_score = self.gate(&candidate)?;
        let promoted = self.promote(candidate, gate_score);
        let benchmark_score = self.benchmark()?;

        let report = RoundReport {
            round,
            episodes: self.settings.num_episode,
            examples_added,
            buffer_len,
            epoch_losses,
            gate_score,
            promoted,
            benchmark_score,
        };

        match (report.final_loss(), benchmark_score) {
            (Some(loss), Some(bench)) => info!(
                round,
                buffer_len,
                loss = loss.total(),
                gate_score,
                promoted,
                benchmark = %self.settings.benchmark,
                bench,
                "Round finished"
            ),
            (Some(loss), None) => info!(
                round,
                buffer_len,
                loss = loss.total(),
                gate_score,
                promoted,
                "Round finished"
            ),
            _ => info!(round, buffer_len, gate_score, promoted, "Round finished"),
        }

        self.stats.record_round(&report);
        Ok(report)
    }

    /// Run `num_iter` rounds, writing stats after each.
    pub fn run(&mut self) -> Result<Vec<RoundReport>, TrainerError> {
        self.run_with(|_| {})
    }

    /// Like [`run`](Self::run), calling `on_round` once each round's stats
    /// are written.
    pub fn run_with<F>(&mut self, mut on_round: F) -> Result<Vec<RoundReport>, TrainerError>
    where
        F: FnMut(&RoundReport),
    {
        let mut reports = Vec::with_capacity(self.settings.num_iter as usize);
        for round in 1..=self.settings.num_iter {
            let report = self.run_round(round)?;
            self.stats.write_stats();
            on_round(&report);
            reports.push(report);
        }
        Ok(reports)
    }
}
