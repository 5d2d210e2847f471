//! Tabula play - one game against the computer from the terminal
//!
//! Moves are typed as action indices. The arena renders every position, so
//! logging stays at debug level unless RUST_LOG says otherwise.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use engine_core::{create_game, list_registered_games};
use mcts::{MctsConfig, UniformPredictor};
use tracing::info;

use trainer::{Arena, HumanPolicy, MctsPolicy, Policy, RandomPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Opponent {
    Random,
    Mcts,
}

#[derive(Parser, Debug)]
#[command(name = "tabula-play")]
#[command(about = "Play a Tabula game against a random or MCTS opponent")]
struct Args {
    /// Environment ID to play (e.g., tictactoe, reversi)
    #[arg(long, default_value = "tictactoe")]
    env_id: String,

    /// Who plays the other side
    #[arg(long, value_enum, default_value_t = Opponent::Random)]
    opponent: Opponent,

    /// MCTS simulations per move for the mcts opponent
    #[arg(long, default_value_t = 200)]
    num_simulations: u32,

    /// Let the opponent move first
    #[arg(long)]
    second: bool,

    /// Seed for the random opponent
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().without_time().with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.num_simulations == 0 {
        return Err(anyhow!("num_simulations must be greater than 0"));
    }
    init_tracing();

    engine_games::register_all_games();
    let game = create_game(&args.env_id).ok_or_else(|| {
        anyhow!(
            "unknown env_id '{}', registered games: {}",
            args.env_id,
            list_registered_games().join(", ")
        )
    })?;

    let predictor = UniformPredictor::new(game.action_size());
    let mut opponent: Box<dyn Policy + '_> = match args.opponent {
        Opponent::Random => Box::new(RandomPolicy::new(game.as_ref(), args.seed)),
        Opponent::Mcts => Box::new(MctsPolicy::new(
            game.as_ref(),
            &predictor,
            MctsConfig::for_evaluation().with_simulations(args.num_simulations),
        )),
    };
    let mut human = HumanPolicy::stdin(game.as_ref());

    println!("{}", game.render(&game.initial_board()));

    let arena = Arena::new(game.as_ref()).with_verbose(true);
    let reward = if args.second {
        -arena.play_game(opponent.as_mut(), &mut human)?
    } else {
        arena.play_game(&mut human, opponent.as_mut())?
    };

    let outcome = if reward > 0.0 {
        "You win"
    } else if reward < 0.0 {
        "You lose"
    } else {
        "Draw"
    };
    info!(reward, opponent = opponent.name(), "{}", outcome);
    Ok(())
}
