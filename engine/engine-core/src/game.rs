//! Game trait: the rules oracle consulted by search, self-play and the arena.
//!
//! Implementations are pure functions of `(board, player)`. They hold only
//! configuration (board size and the like), never per-game state, so a single
//! instance can be shared across threads.

use thiserror::Error;

use crate::board::{Board, Player, StateKey};
use crate::metadata::GameMetadata;

/// Errors raised by game rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("Illegal action {action} for {player}")]
    IllegalAction { action: usize, player: Player },

    #[error("Action {action} out of range (action space has {size} actions)")]
    ActionOutOfRange { action: usize, size: usize },

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Capability not implemented: {capability}")]
    Unimplemented { capability: &'static str },
}

/// Rules of a deterministic two-player zero-sum game.
///
/// Actions are integers in `0..action_size()`. The player to move travels
/// with the board: most games alternate movers, but `next_state` may return
/// the same player again (a pass by the opponent).
///
/// # Example
///
/// ```rust
/// use engine_core::{Board, Game, GameError, GameMetadata, Player};
///
/// /// First to move wins immediately.
/// #[derive(Debug)]
/// struct OneMove;
///
/// impl Game for OneMove {
///     fn metadata(&self) -> GameMetadata {
///         GameMetadata::new("one_move", "One Move").with_board(1, 1).with_actions(1)
///     }
///     fn initial_board(&self) -> Board {
///         Board::new(1, 1)
///     }
///     fn action_size(&self) -> usize {
///         1
///     }
///     fn is_legal(&self, board: &Board, _player: Player, action: usize) -> bool {
///         action == 0 && board.cell(0) == 0
///     }
///     fn next_state(
///         &self,
///         board: &Board,
///         player: Player,
///         action: usize,
///     ) -> Result<(Board, Player), GameError> {
///         if !self.is_legal(board, player, action) {
///             return Err(GameError::IllegalAction { action, player });
///         }
///         Ok((board.with_stone(0, player.sign()), player.opponent()))
///     }
///     fn is_terminal(&self, board: &Board, _player: Player) -> bool {
///         board.is_full()
///     }
///     fn reward(&self, board: &Board, player: Player) -> f32 {
///         (board.cell(0) * player.sign()) as f32
///     }
/// }
///
/// let game = OneMove;
/// let (board, next) = game.next_state(&game.initial_board(), Player::One, 0).unwrap();
/// assert!(game.is_terminal(&board, next));
/// assert_eq!(game.reward(&board, Player::One), 1.0);
/// ```
pub trait Game: Send + Sync + std::fmt::Debug {
    /// Display and sizing information.
    fn metadata(&self) -> GameMetadata;

    /// Registry identifier.
    fn env_id(&self) -> String {
        self.metadata().env_id
    }

    /// Starting position.
    fn initial_board(&self) -> Board;

    /// Side that moves first from [`Game::initial_board`].
    fn first_player(&self) -> Player {
        Player::One
    }

    /// Number of actions, legal or not.
    fn action_size(&self) -> usize;

    /// Whether `player` may play `action` on `board`.
    fn is_legal(&self, board: &Board, player: Player, action: usize) -> bool;

    /// Legal actions in ascending order.
    fn legal_actions(&self, board: &Board, player: Player) -> Vec<usize> {
        (0..self.action_size())
            .filter(|&a| self.is_legal(board, player, a))
            .collect()
    }

    /// Apply `action` and return the successor board and the side to move.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalAction`] (or `ActionOutOfRange`) when the
    /// action is not legal for `player`.
    fn next_state(
        &self,
        board: &Board,
        player: Player,
        action: usize,
    ) -> Result<(Board, Player), GameError>;

    /// Whether the game is over with `player` to move.
    fn is_terminal(&self, board: &Board, player: Player) -> bool;

    /// Final outcome from `player`'s perspective: `1.0` win, `-1.0` loss,
    /// `0.0` draw. Only meaningful on terminal positions.
    fn reward(&self, board: &Board, player: Player) -> f32;

    /// Board as seen by `player`, whose stones become `+1`.
    fn canonical_form(&self, board: &Board, player: Player) -> Board {
        board.canonical(player)
    }

    /// Hashable identity of `(board, player)`.
    fn state_key(&self, board: &Board, player: Player) -> StateKey {
        StateKey::new(board, player)
    }

    /// `(height, width)` of the playing grid.
    fn board_shape(&self) -> Result<(usize, usize), GameError> {
        Err(GameError::Unimplemented {
            capability: "board_shape",
        })
    }

    /// Human-readable board with this game's stone symbols, used by verbose
    /// arena logging.
    fn render(&self, board: &Board) -> String {
        let metadata = self.metadata();
        let mut out = String::with_capacity(board.len() + board.rows());
        for row in 0..board.rows() {
            if row > 0 {
                out.push('\n');
            }
            for col in 0..board.cols() {
                out.push(metadata.symbol(board.get(row, col)));
            }
        }
        out
    }
}
