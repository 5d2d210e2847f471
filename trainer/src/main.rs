//! Tabula trainer - self-play training binary
//!
//! Runs `num_iter` promotion rounds for one registered game:
//! 1. Plays parallel MCTS self-play episodes with the incumbent predictor
//! 2. Trains a candidate on the replay buffer
//! 3. Promotes the candidate when it beats the incumbent in the arena
//! 4. Writes `<data_dir>/trainer_stats.json` after every round

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_core::{create_game, list_registered_games, Game};
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{LinearPredictor, Predictor, UniformPredictor};
use tracing::{error, info};

use trainer::{Config, Trainer, TrainerStats};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn run<P: Predictor + Clone>(config: &Config, game: &dyn Game, predictor: P) -> Result<()> {
    let settings = config.trainer_settings()?;
    let num_iter = settings.num_iter;
    let stats = TrainerStats::new(&config.env_id).with_data_dir(&config.data_path());
    let mut trainer = Trainer::new(game, predictor, settings)?.with_stats(stats);

    // Progress bar over rounds (only when stderr is a TTY)
    let progress = if num_iter > 0 && std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        let pb = ProgressBar::new(num_iter as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rounds ({eta})")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let reports = trainer.run_with(|_| {
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    })?;

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    let snapshot = trainer.stats().snapshot();
    info!(
        rounds = reports.len(),
        promotions = snapshot.promotions,
        episodes = snapshot.episodes,
        avg_episode_length = snapshot.avg_episode_length,
        runtime_seconds = snapshot.runtime_seconds,
        "Training finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    eprintln!("Trainer starting...");

    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    engine_games::register_all_games();
    let game = create_game(&config.env_id).ok_or_else(|| {
        anyhow!(
            "unknown env_id '{}', registered games: {}",
            config.env_id,
            list_registered_games().join(", ")
        )
    })?;
    let metadata = game.metadata();

    info!(
        env_id = %metadata.env_id,
        predictor = %config.predictor,
        num_iter = config.num_iter,
        num_episode = config.num_episode,
        num_simulations = config.num_simulations,
        "Starting training"
    );

    let result = match config.predictor.as_str() {
        "uniform" => run(&config, game.as_ref(), UniformPredictor::new(game.action_size())),
        _ => run(
            &config,
            game.as_ref(),
            LinearPredictor::for_game(&metadata, config.learning_rate, config.seed),
        ),
    };

    match result {
        Ok(()) => {
            info!("Trainer completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Trainer failed: {}", e);
            Err(e)
        }
    }
}
