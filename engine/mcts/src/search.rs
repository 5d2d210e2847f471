//! MCTS search implementation.
//!
//! Each simulation walks from the root by recursion:
//! 1. Terminal: return the game reward for the side to move
//! 2. Expansion: the first visit to a state calls the predictor once and
//!    returns its value
//! 3. Selection: otherwise pick the legal action with the highest bound
//! 4. Backup: fold the child's value (negated when the mover changes) into
//!    the running mean for that action

use engine_core::{Board, Game, GameError, Player};
use rand::Rng;
use thiserror::Error;
use tracing::trace;

use crate::config::MctsConfig;
use crate::node::NodeStats;
use crate::predictor::{Predictor, PredictorError};
use crate::tree::{StatsTable, TableStats};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Predictor error: {0}")]
    Predictor(#[from] PredictorError),

    #[error("Predictor returned {actual} priors for an action space of {expected}")]
    PolicySize { expected: usize, actual: usize },

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Counters describing the work done since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Completed root-to-leaf simulations.
    pub simulations: u64,
    /// Predictor calls, one per expanded state.
    pub expansions: u64,
    /// Simulations that ended on a terminal position.
    pub terminal_hits: u64,
}

/// Search engine bound to one game and one predictor.
///
/// Statistics live only as long as this value; create one per self-play
/// episode or arena seat, or call [`Mcts::reset`] between games.
pub struct Mcts<'a, P: Predictor + ?Sized> {
    game: &'a dyn Game,
    predictor: &'a P,
    config: MctsConfig,
    table: StatsTable,
    stats: SearchStats,
    action_size: usize,
}

impl<'a, P: Predictor + ?Sized> Mcts<'a, P> {
    pub fn new(game: &'a dyn Game, predictor: &'a P, config: MctsConfig) -> Self {
        Self {
            game,
            predictor,
            action_size: game.action_size(),
            config,
            table: StatsTable::new(),
            stats: SearchStats::default(),
        }
    }

    /// Run one simulation from `(board, player)` and return its value from
    /// `player`'s perspective.
    pub fn search(&mut self, board: &Board, player: Player) -> Result<f32, SearchError> {
        if self.game.is_terminal(board, player) {
            self.stats.terminal_hits += 1;
            return Ok(self.game.reward(board, player));
        }

        let key = self.game.state_key(board, player);
        let action = match self.table.get(&key) {
            Some(node) => self.select_action(node, board, player)?,
            None => {
                let canonical = self.game.canonical_form(board, player);
                let prediction = self.predictor.predict(&canonical)?;
                if prediction.policy.len() != self.action_size {
                    return Err(SearchError::PolicySize {
                        expected: self.action_size,
                        actual: prediction.policy.len(),
                    });
                }
                self.table.insert(key, NodeStats::new(prediction.policy));
                self.stats.expansions += 1;
                trace!(value = prediction.value, states = self.table.len(), "Expanded state");
                return Ok(prediction.value);
            }
        };

        let (next_board, next_player) = self.game.next_state(board, player, action)?;
        let child_value = self.search(&next_board, next_player)?;

        // A pass hands the move back to the same side, so the value keeps its sign.
        let value = if next_player != player {
            -child_value
        } else {
            child_value
        };

        let node = self.table.get_mut(&key).ok_or_else(|| {
            SearchError::InvalidState("statistics missing for an expanded state".to_string())
        })?;
        node.update(action, value);
        trace!(action, value, visits = node.n[action], "Backed up");

        Ok(value)
    }

    /// Strictly-greater scan over legal actions in ascending order, so the
    /// first action wins ties.
    fn select_action(
        &self,
        node: &NodeStats,
        board: &Board,
        player: Player,
    ) -> Result<usize, SearchError> {
        let total_visits_sqrt = (node.total_visits() as f32).sqrt();
        let mut best: Option<usize> = None;
        let mut best_score = f32::NEG_INFINITY;

        for action in 0..self.action_size {
            if !self.game.is_legal(board, player, action) {
                continue;
            }
            let score = node.ucb_score(action, total_visits_sqrt, self.config.alpha);
            if best.is_none() || score > best_score {
                best = Some(action);
                best_score = score;
            }
        }

        best.ok_or(SearchError::NoLegalMoves)
    }

    /// Run `num_simulations` searches from a canonical `board` (the side to
    /// move owns the `+1` stones) and return the visit distribution over the
    /// full action space.
    ///
    /// Illegal actions always get probability zero. With a temperature below
    /// `1e-6` the result is one-hot on the most visited action.
    pub fn get_action_prob(&mut self, board: &Board) -> Result<Vec<f32>, SearchError> {
        let player = Player::One;
        let legal = self.game.legal_actions(board, player);
        if legal.is_empty() || self.game.is_terminal(board, player) {
            return Err(SearchError::NoLegalMoves);
        }

        for _ in 0..self.config.num_simulations.max(1) {
            self.search(board, player)?;
            self.stats.simulations += 1;
        }

        let key = self.game.state_key(board, player);
        let policy = self
            .table
            .visit_policy(&key, &legal, self.action_size, self.config.temperature)
            .ok_or_else(|| SearchError::InvalidState("root was never expanded".to_string()))?;

        trace!(
            simulations = self.config.num_simulations,
            states = self.table.len(),
            "Search complete"
        );

        Ok(policy)
    }

    /// Forget all statistics. The next search re-expands from scratch.
    pub fn reset(&mut self) {
        self.table.clear();
        self.stats = SearchStats::default();
    }

    /// Statistics for `(board, player)`, if that state was expanded.
    pub fn node(&self, board: &Board, player: Player) -> Option<&NodeStats> {
        self.table.get(&self.game.state_key(board, player))
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Summary of the statistics table.
    pub fn table_stats(&self) -> TableStats {
        self.table.stats()
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Change the root temperature, e.g. for a late-game schedule.
    pub fn set_temperature(&mut self, temperature: f32) {
        self.config.temperature = temperature;
    }
}

/// Sample an action from a probability distribution.
pub fn sample_action<R: Rng>(policy: &[f32], rng: &mut R) -> Result<usize, SearchError> {
    let r: f32 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &p) in policy.iter().enumerate() {
        cumsum += p;
        if p > 0.0 && r < cumsum {
            return Ok(i);
        }
    }

    // Fallback to last non-zero action (handles floating point issues)
    for (i, &p) in policy.iter().enumerate().rev() {
        if p > 0.0 {
            return Ok(i);
        }
    }

    Err(SearchError::NoLegalMoves)
}

/// Index of the largest probability, first one on ties.
pub fn argmax(policy: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &p) in policy.iter().enumerate() {
        if best.map_or(true, |(_, b)| p > b) {
            best = Some((i, p));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{Prediction, UniformPredictor};
    use engine_core::GameMetadata;
    use games_tictactoe::TicTacToe;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Uniform predictor that counts its calls.
    struct CountingPredictor {
        inner: UniformPredictor,
        value: f32,
        calls: AtomicUsize,
    }

    impl CountingPredictor {
        fn new(action_size: usize, value: f32) -> Self {
            Self {
                inner: UniformPredictor::new(action_size),
                value,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Predictor for CountingPredictor {
        fn predict(&self, board: &Board) -> Result<Prediction, PredictorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut prediction = self.inner.predict(board)?;
            prediction.value = self.value;
            Ok(prediction)
        }
    }

    /// One-cell race: action 0 ends the game, the owner of cell 0 wins.
    /// Action 1 is a "pass" that keeps the same mover on the board but
    /// marks cell 1, and is only allowed once per side.
    #[derive(Debug)]
    struct PassGame;

    impl Game for PassGame {
        fn metadata(&self) -> GameMetadata {
            GameMetadata::new("pass_game", "Pass Game")
                .with_board(3, 1)
                .with_actions(2)
                .with_passes(true)
        }

        fn initial_board(&self) -> Board {
            Board::new(1, 3)
        }

        fn action_size(&self) -> usize {
            2
        }

        fn is_legal(&self, board: &Board, player: Player, action: usize) -> bool {
            match action {
                0 => board.cell(0) == 0,
                1 => board.cell(0) == 0 && board.cell(1) != player.sign(),
                _ => false,
            }
        }

        fn next_state(
            &self,
            board: &Board,
            player: Player,
            action: usize,
        ) -> Result<(Board, Player), GameError> {
            if !self.is_legal(board, player, action) {
                return Err(GameError::IllegalAction { action, player });
            }
            match action {
                0 => Ok((board.with_stone(0, player.sign()), player.opponent())),
                _ => Ok((board.with_stone(1, player.sign()), player)),
            }
        }

        fn is_terminal(&self, board: &Board, _player: Player) -> bool {
            board.cell(0) != 0
        }

        fn reward(&self, board: &Board, player: Player) -> f32 {
            (board.cell(0) * player.sign()) as f32
        }
    }

    #[test]
    fn test_terminal_search_returns_reward_without_stats() {
        let game = TicTacToe::default();
        let predictor = CountingPredictor::new(9, 0.0);
        let mut mcts = Mcts::new(&game, &predictor, MctsConfig::for_testing());

        // X has the top row, O to move
        let board = Board::from_cells(3, 3, vec![1, 1, 1, -1, -1, 0, 0, 0, 0]).unwrap();

        assert_eq!(mcts.search(&board, Player::Two).unwrap(), -1.0);
        assert_eq!(mcts.search(&board, Player::One).unwrap(), 1.0);
        assert_eq!(predictor.calls(), 0);
        assert_eq!(mcts.table_stats().states, 0);
        assert_eq!(mcts.stats().terminal_hits, 2);
    }

    #[test]
    fn test_first_visit_expands_once_with_zero_stats() {
        let game = TicTacToe::default();
        let predictor = CountingPredictor::new(9, 0.25);
        let mut mcts = Mcts::new(&game, &predictor, MctsConfig::for_testing());
        let board = game.initial_board();

        let value = mcts.search(&board, Player::One).unwrap();

        assert_eq!(value, 0.25);
        assert_eq!(predictor.calls(), 1);
        let node = mcts.node(&board, Player::One).unwrap();
        assert_eq!(node.n, vec![0; 9]);
        assert_eq!(node.q, vec![0.0; 9]);
        assert!((node.p[0] - 1.0 / 9.0).abs() < 1e-6);

        // Second visit selects, expands one child and backs its value up
        let value = mcts.search(&board, Player::One).unwrap();
        assert_eq!(predictor.calls(), 2);
        assert_eq!(value, -0.25);
        assert_eq!(mcts.stats().expansions, 2);
    }

    #[test]
    fn test_each_state_expanded_once() {
        let game = TicTacToe::default();
        let predictor = CountingPredictor::new(9, 0.0);
        let mut mcts = Mcts::new(&game, &predictor, MctsConfig::for_testing().with_simulations(300));

        mcts.get_action_prob(&game.initial_board()).unwrap();

        // One predictor call per distinct expanded state, never more
        assert_eq!(predictor.calls(), mcts.table_stats().states);
        assert_eq!(predictor.calls() as u64, mcts.stats().expansions);
    }

    #[test]
    fn test_first_legal_action_wins_ties() {
        let game = TicTacToe::default();
        let predictor = UniformPredictor::new(9);
        let mut mcts = Mcts::new(&game, &predictor, MctsConfig::for_testing());

        // Cells 0 and 1 taken; the first legal action is 2
        let board = Board::from_cells(3, 3, vec![1, -1, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        mcts.search(&board, Player::One).unwrap();
        mcts.search(&board, Player::One).unwrap();

        let node = mcts.node(&board, Player::One).unwrap();
        assert_eq!(node.n[2], 1);
        assert_eq!(node.total_visits(), 1);
    }

    #[test]
    fn test_value_negated_when_mover_changes() {
        let game = PassGame;
        let predictor = CountingPredictor::new(2, 0.0);
        let config = MctsConfig::for_testing().with_alpha(0.0);
        let mut mcts = Mcts::new(&game, &predictor, config);
        let board = game.initial_board();

        mcts.search(&board, Player::One).unwrap(); // expand root
        // Action 0 (first on ties) wins immediately; the child is terminal
        // with reward -1 for Player::Two, which becomes +1 for the root.
        let value = mcts.search(&board, Player::One).unwrap();

        assert_eq!(value, 1.0);
        let node = mcts.node(&board, Player::One).unwrap();
        assert_eq!(node.n[0], 1);
        assert_eq!(node.q[0], 1.0);
    }

    #[test]
    fn test_value_kept_when_mover_repeats() {
        let game = PassGame;
        let predictor = CountingPredictor::new(2, 0.5);
        let config = MctsConfig::for_testing().with_alpha(0.0);
        let mut mcts = Mcts::new(&game, &predictor, config);

        // Make the pass look better than the immediate win.
        let board = game.initial_board();
        mcts.search(&board, Player::One).unwrap();
        {
            let key = game.state_key(&board, Player::One);
            let node = mcts.table.get_mut(&key).unwrap();
            node.q[0] = -0.9;
        }

        // Selects the pass; the successor (same mover) is fresh and the
        // predictor's 0.5 comes back without a sign flip.
        let value = mcts.search(&board, Player::One).unwrap();
        assert_eq!(value, 0.5);

        let node = mcts.node(&board, Player::One).unwrap();
        assert_eq!(node.n[1], 1);
        assert_eq!(node.q[1], 0.5);
    }

    #[test]
    fn test_action_prob_sums_to_one_and_masks_illegal() {
        let game = TicTacToe::default();
        let predictor = UniformPredictor::new(9);
        let mut mcts = Mcts::new(
            &game,
            &predictor,
            MctsConfig::for_testing().with_temperature(1.0),
        );

        let board = Board::from_cells(3, 3, vec![1, -1, 0, 0, 1, 0, 0, 0, -1]).unwrap();
        let probs = mcts.get_action_prob(&board).unwrap();

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for a in [0, 1, 4, 8] {
            assert_eq!(probs[a], 0.0, "occupied cell {} got probability", a);
        }
        assert_eq!(mcts.stats().simulations, 50);
    }

    #[test]
    fn test_zero_temperature_is_one_hot() {
        let game = TicTacToe::default();
        let predictor = UniformPredictor::new(9);
        let mut mcts = Mcts::new(
            &game,
            &predictor,
            MctsConfig::for_testing().with_temperature(0.0),
        );

        let probs = mcts.get_action_prob(&game.initial_board()).unwrap();
        assert!(probs.iter().all(|p| p.is_finite()));
        assert_eq!(probs.iter().filter(|&&p| p == 1.0).count(), 1);
        assert_eq!(probs.iter().filter(|&&p| p == 0.0).count(), 8);
    }

    #[test]
    fn test_finds_winning_move() {
        // X | X | _
        // O | O | _
        // _ | _ | _
        let game = TicTacToe::default();
        let predictor = UniformPredictor::new(9);
        let config = MctsConfig::for_testing()
            .with_simulations(200)
            .with_temperature(0.0);
        let mut mcts = Mcts::new(&game, &predictor, config);

        let board = Board::from_cells(3, 3, vec![1, 1, 0, -1, -1, 0, 0, 0, 0]).unwrap();
        let probs = mcts.get_action_prob(&board).unwrap();

        assert_eq!(argmax(&probs), Some(2));
        let root = mcts.node(&board, Player::One).unwrap();
        assert!((root.q[2] - 1.0).abs() < 1e-6, "winning move should back up +1");
    }

    #[test]
    fn test_reset_is_idempotent() {
        let game = TicTacToe::default();
        let predictor = CountingPredictor::new(9, 0.0);
        let mut mcts = Mcts::new(&game, &predictor, MctsConfig::for_testing());
        let board = game.initial_board();

        mcts.get_action_prob(&board).unwrap();
        assert!(mcts.table_stats().states > 0);

        mcts.reset();
        mcts.reset();
        assert_eq!(mcts.table_stats().states, 0);
        assert_eq!(mcts.stats(), SearchStats::default());

        let calls = predictor.calls();
        mcts.search(&board, Player::One).unwrap();
        assert_eq!(predictor.calls(), calls + 1, "root must be re-expanded");
        assert_eq!(mcts.node(&board, Player::One).unwrap().n, vec![0; 9]);
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let game = TicTacToe::default();
        let predictor = UniformPredictor::new(9);
        let mut mcts = Mcts::new(&game, &predictor, MctsConfig::for_testing());

        let full = Board::from_cells(3, 3, vec![1, -1, 1, -1, 1, -1, -1, 1, -1]).unwrap();
        assert!(matches!(
            mcts.get_action_prob(&full),
            Err(SearchError::NoLegalMoves)
        ));
    }

    #[test]
    fn test_malformed_prediction_is_an_error() {
        let game = TicTacToe::default();
        let predictor = UniformPredictor::new(4);
        let mut mcts = Mcts::new(&game, &predictor, MctsConfig::for_testing());

        assert!(matches!(
            mcts.search(&game.initial_board(), Player::One),
            Err(SearchError::PolicySize {
                expected: 9,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_sample_action() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let policy = vec![0.0, 0.5, 0.3, 0.2, 0.0];

        // Sample many times and check distribution
        let mut counts = [0u32; 5];
        for _ in 0..1000 {
            let action = sample_action(&policy, &mut rng).unwrap();
            counts[action] += 1;
        }

        // Action 0 and 4 should never be selected
        assert_eq!(counts[0], 0);
        assert_eq!(counts[4], 0);

        // Action 1 should be most common (~500), action 2 (~300), action 3 (~200)
        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[3]);

        assert!(sample_action(&[0.0, 0.0], &mut rng).is_err());
    }

    #[test]
    fn test_argmax_first_on_ties() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
