//! Shared position types for two-player board games.
//!
//! A `Board` is an immutable grid of stones: `+1` for the first player,
//! `-1` for the second player and `0` for an empty cell. Games never mutate
//! a board in place; every move produces a new value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::GameError;

/// One of the two sides of a zero-sum game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Moves first, owns the `+1` stones.
    One,
    /// Moves second, owns the `-1` stones.
    Two,
}

impl Player {
    /// The other side.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Stone value owned by this player (`+1` or `-1`).
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            Player::One => 1,
            Player::Two => -1,
        }
    }

    /// Inverse of [`Player::sign`]. Returns `None` for `0` and any other value.
    pub fn from_sign(sign: i8) -> Option<Player> {
        match sign {
            1 => Some(Player::One),
            -1 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player 1"),
            Player::Two => write!(f, "player 2"),
        }
    }
}

/// Row-major grid of stones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<i8>,
}

impl Board {
    /// Create an empty board.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Build a board from row-major cell values.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidBoard`] when the cell count does not match
    /// the dimensions or a cell holds anything other than `-1`, `0` or `1`.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<i8>) -> Result<Self, GameError> {
        if cells.len() != rows * cols {
            return Err(GameError::InvalidBoard(format!(
                "expected {} cells for a {}x{} board, got {}",
                rows * cols,
                rows,
                cols,
                cells.len()
            )));
        }
        if let Some(bad) = cells.iter().find(|c| !(-1..=1).contains(*c)) {
            return Err(GameError::InvalidBoard(format!("invalid cell value {bad}")));
        }
        Ok(Self { rows, cols, cells })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major cell values.
    #[inline]
    pub fn cells(&self) -> &[i8] {
        &self.cells
    }

    /// Flat index of `(row, col)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Whether `(row, col)` lies on the board. Takes signed coordinates so
    /// callers can step off the edge while walking a direction.
    #[inline]
    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i8 {
        self.cells[self.index(row, col)]
    }

    #[inline]
    pub fn cell(&self, index: usize) -> i8 {
        self.cells[index]
    }

    /// Return a copy of this board with `cells[index]` set to `stone`.
    pub fn with_stone(&self, index: usize, stone: i8) -> Board {
        let mut next = self.clone();
        next.cells[index] = stone;
        next
    }

    /// Return a copy with every listed cell set to `stone`.
    pub fn with_stones(&self, indices: &[usize], stone: i8) -> Board {
        let mut next = self.clone();
        for &i in indices {
            next.cells[i] = stone;
        }
        next
    }

    /// Swap the colour of every stone.
    pub fn flipped(&self) -> Board {
        Board {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(|c| -c).collect(),
        }
    }

    /// The board as seen by `player`: their stones become `+1`.
    pub fn canonical(&self, player: Player) -> Board {
        match player {
            Player::One => self.clone(),
            Player::Two => self.flipped(),
        }
    }

    /// Number of cells holding `stone`.
    pub fn count(&self, stone: i8) -> usize {
        self.cells.iter().filter(|&&c| c == stone).count()
    }

    /// Whether every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != 0)
    }

    /// Cell values as predictor input features.
    pub fn features(&self) -> Vec<f32> {
        self.cells.iter().map(|&c| c as f32).collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let symbol = match self.get(row, col) {
                    1 => 'X',
                    -1 => 'O',
                    _ => '.',
                };
                write!(f, "{symbol}")?;
            }
            if row + 1 < self.rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Identity of a `(board, player to move)` pair.
///
/// Equality is structural over every cell plus the player, so two keys are
/// equal exactly when the positions are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    board: Board,
    player: Player,
}

impl StateKey {
    pub fn new(board: &Board, player: Player) -> Self {
        Self {
            board: board.clone(),
            player,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> Player {
        self.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_player_sign_roundtrip() {
        assert_eq!(Player::One.sign(), 1);
        assert_eq!(Player::Two.sign(), -1);
        assert_eq!(Player::from_sign(1), Some(Player::One));
        assert_eq!(Player::from_sign(-1), Some(Player::Two));
        assert_eq!(Player::from_sign(0), None);
        assert_eq!(Player::One.opponent(), Player::Two);
        assert_eq!(Player::Two.opponent().opponent(), Player::Two);
    }

    #[test]
    fn test_from_cells_validates() {
        assert!(Board::from_cells(2, 2, vec![0, 1, -1, 0]).is_ok());
        assert!(matches!(
            Board::from_cells(2, 2, vec![0, 1, -1]),
            Err(GameError::InvalidBoard(_))
        ));
        assert!(matches!(
            Board::from_cells(1, 2, vec![0, 2]),
            Err(GameError::InvalidBoard(_))
        ));
    }

    #[test]
    fn test_canonical_form() {
        let board = Board::from_cells(1, 3, vec![1, -1, 0]).unwrap();
        assert_eq!(board.canonical(Player::One), board);
        assert_eq!(board.canonical(Player::Two).cells(), &[-1, 1, 0]);
        assert_eq!(board.flipped().flipped(), board);
    }

    #[test]
    fn test_with_stone_leaves_original_untouched() {
        let board = Board::new(3, 3);
        let next = board.with_stone(4, 1);
        assert_eq!(board.cell(4), 0);
        assert_eq!(next.cell(4), 1);
        assert_eq!(next.get(1, 1), 1);
        assert_eq!(next.count(1), 1);
        assert_eq!(next.count(0), 8);
    }

    #[test]
    fn test_contains() {
        let board = Board::new(4, 4);
        assert!(board.contains(0, 0));
        assert!(board.contains(3, 3));
        assert!(!board.contains(-1, 0));
        assert!(!board.contains(0, 4));
    }

    #[test]
    fn test_display() {
        let board = Board::from_cells(2, 2, vec![1, 0, 0, -1]).unwrap();
        assert_eq!(board.to_string(), "X.\n.O");
    }

    #[test]
    fn test_state_keys_distinguish_player_and_cells() {
        let a = Board::from_cells(1, 2, vec![1, 0]).unwrap();
        let b = Board::from_cells(1, 2, vec![0, 1]).unwrap();

        let mut keys = HashSet::new();
        keys.insert(StateKey::new(&a, Player::One));
        keys.insert(StateKey::new(&a, Player::Two));
        keys.insert(StateKey::new(&b, Player::One));
        keys.insert(StateKey::new(&a.clone(), Player::One));

        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_state_keys_distinguish_shapes() {
        // Same cell values, different geometry.
        let wide = Board::from_cells(1, 4, vec![0; 4]).unwrap();
        let square = Board::from_cells(2, 2, vec![0; 4]).unwrap();
        assert_ne!(
            StateKey::new(&wide, Player::One),
            StateKey::new(&square, Player::One)
        );
    }
}
