//! Reversi (Othello) for the Tabula engine
//!
//! Played on an even `n x n` board. A stone must bracket at least one
//! straight line of opposing stones, which are then flipped. A side with no
//! legal placement passes, so the same player can move twice in a row. The
//! game ends when the side to move has no placement; the side holding more
//! stones wins.
//!
//! Registered variants: `"reversi"` (4x4), `"reversi6"` (6x6), `"reversi8"` (8x8).
//!
//! # Board Layout
//!
//! Actions are row-major cell indices. The 4x4 opening:
//! ```text
//! . . . .
//! . O X .
//! . X O .
//! . . . .
//! ```

use engine_core::game_utils::{calculate_reward, majority_outcome};
use engine_core::{register_game, Board, Game, GameError, GameMetadata, Player};

/// The eight compass directions as (row, col) steps
const DIRECTIONS: [(isize, isize); 8] = [
    (0, 1),
    (-1, 0),
    (0, -1),
    (1, 0),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// Register Reversi variants with the global game registry
pub fn register_reversi() {
    register_game("reversi".to_string(), || Box::new(Reversi::new(4)));
    register_game("reversi6".to_string(), || Box::new(Reversi::new(6)));
    register_game("reversi8".to_string(), || Box::new(Reversi::new(8)));
}

/// Reversi rules on an `n x n` board
#[derive(Debug, Clone)]
pub struct Reversi {
    n: usize,
}

impl Reversi {
    /// Create the game for an `n x n` board.
    ///
    /// # Panics
    ///
    /// Panics if `n` is odd or smaller than 4: the opening needs a centred
    /// 2x2 square with room to play around it.
    pub fn new(n: usize) -> Self {
        assert!(n >= 4 && n % 2 == 0, "reversi board size must be even and >= 4");
        Self { n }
    }

    /// Side length of the board
    pub fn size(&self) -> usize {
        self.n
    }

    /// Opposing stones flipped if `player` plays `action`. Empty when the
    /// placement is illegal.
    pub fn flips(&self, board: &Board, player: Player, action: usize) -> Vec<usize> {
        if action >= self.n * self.n || board.cell(action) != 0 {
            return Vec::new();
        }

        let own = player.sign();
        let row = (action / self.n) as isize;
        let col = (action % self.n) as isize;
        let mut flips = Vec::new();

        for (dr, dc) in DIRECTIONS {
            let mut run = Vec::new();
            let (mut r, mut c) = (row + dr, col + dc);

            // Walk over opposing stones
            while board.contains(r, c) && board.get(r as usize, c as usize) == -own {
                run.push(board.index(r as usize, c as usize));
                r += dr;
                c += dc;
            }

            // Bracketed by one of ours
            if !run.is_empty() && board.contains(r, c) && board.get(r as usize, c as usize) == own
            {
                flips.extend(run);
            }
        }

        flips
    }

    /// Whether `player` has no legal placement.
    pub fn must_pass(&self, board: &Board, player: Player) -> bool {
        (0..self.n * self.n).all(|a| self.flips(board, player, a).is_empty())
    }
}

impl Default for Reversi {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Game for Reversi {
    fn metadata(&self) -> GameMetadata {
        let env_id = if self.n == 4 {
            "reversi".to_string()
        } else {
            format!("reversi{}", self.n)
        };
        GameMetadata::new(env_id, "Reversi")
            .with_board(self.n, self.n)
            .with_actions(self.n * self.n)
            .with_symbols('B', 'W')
            .with_passes(true)
            .with_description("Bracket opposing stones to flip them; hold the majority at the end.")
    }

    fn initial_board(&self) -> Board {
        let half = self.n / 2;
        let board = Board::new(self.n, self.n);
        let ours = [
            board.index(half, half - 1),
            board.index(half - 1, half),
        ];
        let theirs = [
            board.index(half, half),
            board.index(half - 1, half - 1),
        ];
        board.with_stones(&ours, 1).with_stones(&theirs, -1)
    }

    fn action_size(&self) -> usize {
        self.n * self.n
    }

    fn is_legal(&self, board: &Board, player: Player, action: usize) -> bool {
        !self.flips(board, player, action).is_empty()
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
        let flips = self.flips(board, player, action);
        if flips.is_empty() {
            return Err(GameError::IllegalAction { action, player });
        }

        let next = board
            .with_stone(action, player.sign())
            .with_stones(&flips, player.sign());

        // If the opponent cannot reply, the mover goes again.
        let next_player = if self.must_pass(&next, player.opponent()) {
            player
        } else {
            player.opponent()
        };
        Ok((next, next_player))
    }

    fn is_terminal(&self, board: &Board, player: Player) -> bool {
        // `next_state` already skipped the opponent if they had to pass, so a
        // stuck mover means neither side can play.
        self.must_pass(board, player)
    }

    fn reward(&self, board: &Board, player: Player) -> f32 {
        calculate_reward(majority_outcome(board), player)
    }

    fn board_shape(&self) -> Result<(usize, usize), GameError> {
        Ok((self.n, self.n))
    }
}
