//! End-to-end promotion rounds with a trainable predictor.

use engine_core::{create_game, Game};
use games_tictactoe::TicTacToe;
use mcts::{LinearPredictor, MctsConfig};
use trainer::{
    Benchmark, SelfPlayConfig, Trainer, TrainerSettings, TrainerStats, TrainerStatsSnapshot,
    STATS_FILE,
};

fn settings(r_thresh: f32) -> TrainerSettings {
    TrainerSettings {
        num_iter: 1,
        num_episode: 6,
        num_epoch: 3,
        batch_size: 16,
        num_game: 1,
        r_thresh,
        buffer_size: 500,
        self_play: SelfPlayConfig::new(MctsConfig::for_training().with_simulations(10)),
        eval_mcts: MctsConfig::for_evaluation().with_simulations(10),
        benchmark: Benchmark::None,
        benchmark_games: 0,
        seed: 11,
        verbose: false,
    }
}

fn predictor(game: &dyn Game) -> LinearPredictor {
    LinearPredictor::for_game(&game.metadata(), 0.05, 1)
}

#[test]
fn permissive_threshold_always_promotes() {
    let game = TicTacToe::new(3);
    let mut trainer = Trainer::new(&game, predictor(&game), settings(-2.0)).unwrap();

    let report = trainer.run_round(1).unwrap();

    assert!(report.promoted);
    assert!(trainer.incumbent().steps() > 0);
    assert_ne!(trainer.incumbent(), trainer.initial());
}

#[test]
fn promotion_adopts_the_trained_candidate() {
    let game = TicTacToe::new(3);
    let mut trainer = Trainer::new(&game, predictor(&game), settings(-2.0)).unwrap();

    trainer.collect().unwrap();
    let (candidate, _) = trainer.train_candidate().unwrap();
    let trained = candidate.clone();
    assert_ne!(&trained, trainer.incumbent());

    let score = trainer.gate(&candidate).unwrap();
    assert!(trainer.promote(candidate, score));
    assert_eq!(trainer.incumbent(), &trained);
}

#[test]
fn unreachable_threshold_keeps_incumbent() {
    let game = TicTacToe::new(3);
    let mut s = settings(2.0);
    s.num_iter = 2;
    let mut trainer = Trainer::new(&game, predictor(&game), s).unwrap();
    let before = trainer.incumbent().clone();

    let reports = trainer.run().unwrap();

    assert!(reports.iter().all(|r| !r.promoted));
    assert_eq!(trainer.incumbent(), &before);
    assert_eq!(trainer.incumbent(), trainer.initial());
    assert_eq!(trainer.incumbent().steps(), 0);
}

#[test]
fn score_equal_to_threshold_does_not_promote() {
    let game = TicTacToe::new(3);
    let mut trainer = Trainer::new(&game, predictor(&game), settings(0.25)).unwrap();
    let before = trainer.incumbent().clone();

    trainer.collect().unwrap();
    let (candidate, losses) = trainer.train_candidate().unwrap();
    assert_eq!(losses.len(), 3);
    let trained = candidate.clone();
    assert_ne!(trained, before);

    assert!(!trainer.promote(candidate.clone(), 0.25));
    assert_eq!(trainer.incumbent(), &before);

    assert!(trainer.promote(candidate, 0.5));
    assert_eq!(trainer.incumbent(), &trained);
}

#[test]
fn training_lowers_loss_within_a_round() {
    let game = TicTacToe::new(3);
    let mut s = settings(0.0);
    s.num_epoch = 20;
    let mut trainer = Trainer::new(&game, predictor(&game), s).unwrap();

    let report = trainer.run_round(1).unwrap();
    let first = report.epoch_losses.first().unwrap().total();
    let last = report.final_loss().unwrap().total();
    assert!(last < first, "loss went from {first} to {last}");
}

#[test]
fn buffer_stays_within_capacity_across_rounds() {
    let game = TicTacToe::new(3);
    let mut s = settings(0.0);
    s.num_iter = 3;
    s.buffer_size = 15;
    let mut trainer = Trainer::new(&game, predictor(&game), s).unwrap();

    let reports = trainer.run().unwrap();

    assert_eq!(reports.len(), 3);
    for report in &reports {
        assert!(report.examples_added >= 6 * 5);
        assert_eq!(report.buffer_len, 15);
    }
}

#[test]
fn benchmarks_report_scores() {
    let game = TicTacToe::new(3);

    for benchmark in [Benchmark::Random, Benchmark::AlphaBeta, Benchmark::Initial] {
        let mut s = settings(0.0);
        s.benchmark = benchmark;
        s.benchmark_games = 2;
        let mut trainer = Trainer::new(&game, predictor(&game), s).unwrap();

        let score = trainer.benchmark().unwrap().unwrap();
        assert!((-1.0..=1.0).contains(&score), "{benchmark}: {score}");
        match benchmark {
            Benchmark::AlphaBeta => assert!(score <= 0.0),
            Benchmark::Initial => assert_eq!(score, 0.0),
            _ => {}
        }
    }

    let mut trainer = Trainer::new(&game, predictor(&game), settings(0.0)).unwrap();
    assert_eq!(trainer.benchmark().unwrap(), None);
}

#[test]
fn stats_snapshot_written_each_round() {
    let dir = tempfile::tempdir().unwrap();
    let game = TicTacToe::new(3);
    let mut s = settings(-2.0);
    s.num_iter = 2;
    let stats = TrainerStats::new("tictactoe").with_data_dir(dir.path());
    let mut trainer = Trainer::new(&game, predictor(&game), s).unwrap().with_stats(stats);

    trainer.run().unwrap();

    let text = std::fs::read_to_string(dir.path().join(STATS_FILE)).unwrap();
    let snapshot: TrainerStatsSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(snapshot.env_id, "tictactoe");
    assert_eq!(snapshot.episodes, 12);
    assert_eq!(snapshot.rounds.len(), 2);
    assert_eq!(snapshot.promotions, 2);
    assert_eq!(
        snapshot.first_mover_wins + snapshot.second_mover_wins + snapshot.draws,
        12
    );
}

#[test]
fn reversi_round_runs() {
    engine_games::register_all_games();
    let game = create_game("reversi").unwrap();
    let mut s = settings(0.0);
    s.num_episode = 2;
    s.num_epoch = 1;
    let mut trainer = Trainer::new(game.as_ref(), predictor(game.as_ref()), s).unwrap();

    let report = trainer.run_round(1).unwrap();
    assert!(report.examples_added > 0);
    assert!((-1.0..=1.0).contains(&report.gate_score));
}
