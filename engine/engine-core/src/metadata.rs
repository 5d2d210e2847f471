//! Game metadata for logging and predictor sizing

use serde::{Deserialize, Serialize};

/// Static description of a game.
///
/// Predictors size their inputs and outputs from `feature_size` and
/// `num_actions`; verbose arena logs render boards with `player_symbols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    /// Environment identifier (e.g., "tictactoe", "reversi6")
    pub env_id: String,

    /// Human-readable display name (e.g., "Tic-Tac-Toe", "Reversi")
    pub display_name: String,

    pub board_width: usize,
    pub board_height: usize,

    /// Size of the action space, legal or not
    pub num_actions: usize,

    /// Length of the predictor feature vector produced by `Board::features`
    pub feature_size: usize,

    /// Symbols for the first and second player's stones
    pub player_symbols: [char; 2],

    /// Whether a side can be forced to pass (the same player moves twice)
    pub allows_pass: bool,

    pub description: String,
}

impl GameMetadata {
    pub fn new(env_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            env_id: env_id.into(),
            display_name: display_name.into(),
            board_width: 0,
            board_height: 0,
            num_actions: 0,
            feature_size: 0,
            player_symbols: ['X', 'O'],
            allows_pass: false,
            description: String::new(),
        }
    }

    /// Set the grid size. The feature size follows at one value per cell.
    pub fn with_board(mut self, width: usize, height: usize) -> Self {
        self.board_width = width;
        self.board_height = height;
        self.feature_size = width * height;
        self
    }

    pub fn with_actions(mut self, num_actions: usize) -> Self {
        self.num_actions = num_actions;
        self
    }

    pub fn with_symbols(mut self, first: char, second: char) -> Self {
        self.player_symbols = [first, second];
        self
    }

    pub fn with_passes(mut self, allows_pass: bool) -> Self {
        self.allows_pass = allows_pass;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn board_size(&self) -> usize {
        self.board_width * self.board_height
    }

    /// Display character for a cell value: `+1`, `-1` or empty.
    pub fn symbol(&self, stone: i8) -> char {
        match stone {
            1 => self.player_symbols[0],
            -1 => self.player_symbols[1],
            _ => '.',
        }
    }
}
