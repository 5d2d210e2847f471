//! n-in-a-row TicTacToe for the Tabula engine
//!
//! An `n x n` board where the first player to fill a complete row, column or
//! main diagonal wins. The classic 3x3 game is registered as `"tictactoe"`
//! and the 4x4 variant as `"tictactoe4"`.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{create_game, Player};
//! use games_tictactoe::register_tictactoe;
//!
//! // Register the game with the global registry
//! register_tictactoe();
//!
//! let game = create_game("tictactoe").expect("tictactoe should be registered");
//! let board = game.initial_board();
//! let (board, next) = game.next_state(&board, Player::One, 4).unwrap();
//! assert_eq!(next, Player::Two);
//! assert_eq!(board.cell(4), 1);
//! ```

use engine_core::game_utils::{calculate_reward, Outcome};
use engine_core::{register_game, Board, Game, GameError, GameMetadata, Player};

/// Register TicTacToe variants with the global game registry
///
/// Call this function once at startup to make `"tictactoe"` (3x3) and
/// `"tictactoe4"` (4x4) available via `create_game`.
pub fn register_tictactoe() {
    register_game("tictactoe".to_string(), || Box::new(TicTacToe::new(3)));
    register_game("tictactoe4".to_string(), || Box::new(TicTacToe::new(4)));
}

/// TicTacToe rules on an `n x n` board
#[derive(Debug, Clone)]
pub struct TicTacToe {
    n: usize,
    /// Every winning line as flat cell indices: rows, columns, both diagonals
    lines: Vec<Vec<usize>>,
}

impl TicTacToe {
    /// Create the game for an `n x n` board
    pub fn new(n: usize) -> Self {
        let mut lines = Vec::with_capacity(2 * n + 2);
        for r in 0..n {
            lines.push((0..n).map(|c| r * n + c).collect());
        }
        for c in 0..n {
            lines.push((0..n).map(|r| r * n + c).collect());
        }
        lines.push((0..n).map(|i| i * n + i).collect());
        lines.push((0..n).map(|i| i * n + (n - 1 - i)).collect());
        Self { n, lines }
    }

    /// Side length of the board
    pub fn size(&self) -> usize {
        self.n
    }

    /// Judge a board: a full line wins, a full board without one is a draw
    pub fn judge(&self, board: &Board) -> Outcome {
        let n = self.n as i32;
        for line in &self.lines {
            let sum: i32 = line.iter().map(|&i| board.cell(i) as i32).sum();
            if sum == n {
                return Outcome::Win(Player::One);
            }
            if sum == -n {
                return Outcome::Win(Player::Two);
            }
        }

        if board.is_full() {
            Outcome::Draw
        } else {
            Outcome::Ongoing
        }
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Game for TicTacToe {
    fn metadata(&self) -> GameMetadata {
        let env_id = if self.n == 3 {
            "tictactoe".to_string()
        } else {
            format!("tictactoe{}", self.n)
        };
        GameMetadata::new(env_id, "Tic-Tac-Toe")
            .with_board(self.n, self.n)
            .with_actions(self.n * self.n)
            .with_symbols('X', 'O')
            .with_description(format!("Get {} in a row to win!", self.n))
    }

    fn initial_board(&self) -> Board {
        Board::new(self.n, self.n)
    }

    fn action_size(&self) -> usize {
        self.n * self.n
    }

    fn is_legal(&self, board: &Board, _player: Player, action: usize) -> bool {
        action < self.action_size() && board.cell(action) == 0
    }

    fn next_state(
        &self,
        board: &Board,
        player: Player,
        action: usize,
    ) -> Result<(Board, Player), GameError> {
        if action >= self.action_size() {
            return Err(GameError::ActionOutOfRange {
                action,
                size: self.action_size(),
            });
        }
        if board.cell(action) != 0 {
            return Err(GameError::IllegalAction { action, player });
        }
        Ok((board.with_stone(action, player.sign()), player.opponent()))
    }

    fn is_terminal(&self, board: &Board, _player: Player) -> bool {
        self.judge(board).is_finished()
    }

    fn reward(&self, board: &Board, player: Player) -> f32 {
        calculate_reward(self.judge(board), player)
    }

    fn board_shape(&self) -> Result<(usize, usize), GameError> {
        Ok((self.n, self.n))
    }
}

#[cfg(test)]
mod tests;
