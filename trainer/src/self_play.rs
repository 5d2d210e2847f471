//! Self-play episode generation.
//!
//! One episode plays a full game with a fresh search engine on both sides,
//! recording `(canonical board, visit distribution)` at every turn. Outcomes
//! are only known once the game ends, so each record carries the mover's
//! sign and is resolved against the final reward afterwards.

use engine_core::{Board, Game, Player};
use mcts::{sample_action, Experience, Mcts, MctsConfig, Predictor, SearchError};
use rand::Rng;
use tracing::{debug, trace};

/// Settings for one self-play episode.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfPlayConfig {
    pub mcts: MctsConfig,

    /// Moves played at `mcts.temperature` before switching to
    /// `late_temperature`. Zero keeps one temperature for the whole game.
    pub temp_threshold: u32,

    pub late_temperature: f32,
}

impl SelfPlayConfig {
    pub fn new(mcts: MctsConfig) -> Self {
        Self {
            mcts,
            temp_threshold: 0,
            late_temperature: 0.0,
        }
    }

    pub fn with_temperature_schedule(mut self, threshold: u32, late_temperature: f32) -> Self {
        self.temp_threshold = threshold;
        self.late_temperature = late_temperature;
        self
    }

    /// Root temperature for the move with zero-based index `move_index`.
    pub fn temperature_at(&self, move_index: u32) -> f32 {
        if self.temp_threshold > 0 && move_index >= self.temp_threshold {
            self.late_temperature
        } else {
            self.mcts.temperature
        }
    }
}

/// A finished self-play game.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// One example per move, in play order.
    pub examples: Vec<Experience>,

    /// Final reward from the first mover's perspective.
    pub reward: f32,
}

impl Episode {
    pub fn moves(&self) -> usize {
        self.examples.len()
    }
}

/// Record awaiting the final outcome.
struct PendingExample {
    board: Board,
    policy: Vec<f32>,
    /// `+1.0` if the first mover was to move, `-1.0` otherwise.
    sign: f32,
}

/// Play one game from the initial position with `predictor` guiding both
/// sides, sampling every move from the search distribution.
pub fn play_episode<P, R>(
    game: &dyn Game,
    predictor: &P,
    config: &SelfPlayConfig,
    rng: &mut R,
) -> Result<Episode, SearchError>
where
    P: Predictor + ?Sized,
    R: Rng,
{
    let mut search = Mcts::new(game, predictor, config.mcts.clone());
    let first_player = game.first_player();

    let mut board = game.initial_board();
    let mut player = first_player;
    let mut pending = Vec::new();
    let mut move_index = 0u32;

    while !game.is_terminal(&board, player) {
        search.set_temperature(config.temperature_at(move_index));

        let canonical = game.canonical_form(&board, player);
        let policy = search.get_action_prob(&canonical)?;
        let action = sample_action(&policy, rng)?;
        trace!(move_index, action, %player, "Self-play move");

        pending.push(PendingExample {
            board: canonical,
            policy,
            sign: if player == first_player { 1.0 } else { -1.0 },
        });

        let (next_board, next_player) = game.next_state(&board, player, action)?;
        board = next_board;
        player = next_player;
        move_index += 1;
    }

    let reward = first_mover_reward(game, &board, player, first_player);
    let examples = pending
        .into_iter()
        .map(|p| Experience {
            board: p.board,
            policy: p.policy,
            value: p.sign * reward,
        })
        .collect::<Vec<_>>();

    let stats = search.stats();
    debug!(
        moves = examples.len(),
        reward,
        expansions = stats.expansions,
        "Episode finished"
    );

    Ok(Episode { examples, reward })
}

/// Terminal reward seen from `first_player`, whoever is to move at the end.
fn first_mover_reward(game: &dyn Game, board: &Board, to_move: Player, first_player: Player) -> f32 {
    let reward = game.reward(board, to_move);
    if to_move == first_player {
        reward
    } else {
        -reward
    }
}
