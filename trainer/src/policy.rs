//! Decision policies for arena play.
//!
//! Every policy is handed the canonical board (the side to move owns the `+1`
//! stones) and answers with an action index.

use std::collections::HashMap;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use engine_core::{Board, Game, GameError, Player, StateKey};
use mcts::{argmax, Mcts, MctsConfig, Predictor, SearchError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Errors raised while a policy chooses a move.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Input closed before a legal move was entered")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for action selection policies.
pub trait Policy {
    /// Select an action for the side to move on a canonical board.
    fn act(&mut self, board: &Board) -> Result<usize, PolicyError>;

    /// Forget any per-game state. Called before every arena game.
    fn reset(&mut self) {}

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Uniformly random legal moves from a seeded generator.
#[derive(Debug)]
pub struct RandomPolicy<'a> {
    game: &'a dyn Game,
    rng: ChaCha20Rng,
}

impl<'a> RandomPolicy<'a> {
    pub fn new(game: &'a dyn Game, seed: u64) -> Self {
        Self {
            game,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy<'_> {
    fn act(&mut self, board: &Board) -> Result<usize, PolicyError> {
        let legal = self.game.legal_actions(board, Player::One);
        legal
            .choose(&mut self.rng)
            .copied()
            .ok_or(PolicyError::NoLegalMoves)
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Most visited action of a search engine.
///
/// The engine keeps its statistics across the moves of one game and drops
/// them on `reset`.
pub struct MctsPolicy<'a, P: Predictor + ?Sized> {
    mcts: Mcts<'a, P>,
    name: String,
}

impl<'a, P: Predictor + ?Sized> MctsPolicy<'a, P> {
    pub fn new(game: &'a dyn Game, predictor: &'a P, config: MctsConfig) -> Self {
        Self {
            mcts: Mcts::new(game, predictor, config),
            name: "mcts".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn mcts(&self) -> &Mcts<'a, P> {
        &self.mcts
    }
}

impl<P: Predictor + ?Sized> Policy for MctsPolicy<'_, P> {
    fn act(&mut self, board: &Board) -> Result<usize, PolicyError> {
        let policy = self.mcts.get_action_prob(board)?;
        argmax(&policy).ok_or(PolicyError::NoLegalMoves)
    }

    fn reset(&mut self) {
        self.mcts.reset();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Moves typed by a person, one action index per line.
///
/// Anything that is not a legal action index gets a message and another
/// prompt.
pub struct HumanPolicy<'a, R, W> {
    game: &'a dyn Game,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> HumanPolicy<'a, R, W> {
    pub fn new(game: &'a dyn Game, input: R, output: W) -> Self {
        Self {
            game,
            input,
            output,
        }
    }
}

impl<'a> HumanPolicy<'a, StdinLock<'static>, Stdout> {
    /// Read moves from stdin and prompt on stdout.
    pub fn stdin(game: &'a dyn Game) -> Self {
        Self::new(game, io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Policy for HumanPolicy<'_, R, W> {
    fn act(&mut self, board: &Board) -> Result<usize, PolicyError> {
        let legal = self.game.legal_actions(board, Player::One);
        if legal.is_empty() {
            return Err(PolicyError::NoLegalMoves);
        }

        let symbol = self.game.metadata().symbol(Player::One.sign());
        loop {
            write!(self.output, "Move for {} {:?}: ", symbol, legal)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(PolicyError::InputClosed);
            }

            match line.trim().parse::<usize>() {
                Ok(action) if legal.contains(&action) => return Ok(action),
                _ => writeln!(self.output, "'{}' is not a legal move", line.trim())?,
            }
        }
    }

    fn name(&self) -> &str {
        "human"
    }
}

/// Exhaustive negamax with alpha-beta pruning: perfect play for games small
/// enough to solve.
///
/// Exact values are cached by state, so repeated calls over one game (or many
/// games) only search each position once.
#[derive(Debug)]
pub struct AlphaBetaPolicy<'a> {
    game: &'a dyn Game,
    cache: HashMap<StateKey, f32>,
    nodes: u64,
}

impl<'a> AlphaBetaPolicy<'a> {
    pub fn new(game: &'a dyn Game) -> Self {
        Self {
            game,
            cache: HashMap::new(),
            nodes: 0,
        }
    }

    /// Positions visited since construction.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Game-theoretic value of `(board, player)` for `player`.
    pub fn value(&mut self, board: &Board, player: Player) -> Result<f32, GameError> {
        self.negamax(board, player, f32::NEG_INFINITY, f32::INFINITY)
    }

    fn negamax(
        &mut self,
        board: &Board,
        player: Player,
        mut alpha: f32,
        beta: f32,
    ) -> Result<f32, GameError> {
        self.nodes += 1;

        if self.game.is_terminal(board, player) {
            return Ok(self.game.reward(board, player));
        }

        let key = self.game.state_key(board, player);
        if let Some(&value) = self.cache.get(&key) {
            return Ok(value);
        }

        let alpha_orig = alpha;
        let mut best = f32::NEG_INFINITY;

        for action in self.game.legal_actions(board, player) {
            let (next_board, next_player) = self.game.next_state(board, player, action)?;

            // Same mover after a pass: same window, same sign
            let score = if next_player == player {
                self.negamax(&next_board, next_player, alpha, beta)?
            } else {
                -self.negamax(&next_board, next_player, -beta, -alpha)?
            };

            best = best.max(score);
            alpha = alpha.max(best);
            if alpha >= beta {
                break;
            }
        }

        // Only values strictly inside the window are exact
        if best > alpha_orig && best < beta {
            self.cache.insert(key, best);
        }

        Ok(best)
    }
}

impl Policy for AlphaBetaPolicy<'_> {
    fn act(&mut self, board: &Board) -> Result<usize, PolicyError> {
        let player = Player::One;
        let mut best: Option<(usize, f32)> = None;
        let mut alpha = f32::NEG_INFINITY;

        for action in self.game.legal_actions(board, player) {
            let (next_board, next_player) = self.game.next_state(board, player, action)?;
            let score = if next_player == player {
                self.negamax(&next_board, next_player, alpha, f32::INFINITY)?
            } else {
                -self.negamax(&next_board, next_player, f32::NEG_INFINITY, -alpha)?
            };

            if best.map_or(true, |(_, b)| score > b) {
                best = Some((action, score));
                alpha = score;
            }
        }

        best.map(|(action, _)| action)
            .ok_or(PolicyError::NoLegalMoves)
    }

    fn name(&self) -> &str {
        "alphabeta"
    }
}
