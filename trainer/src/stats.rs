//! Trainer statistics tracking and persistence.
//!
//! Episode counters are updated lock-free from parallel self-play workers;
//! round reports are appended once per round. A JSON snapshot is written to
//! `<data_dir>/trainer_stats.json` for external dashboards.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, warn};

use mcts::LossReport;

/// File name of the JSON snapshot inside the data directory.
pub const STATS_FILE: &str = "trainer_stats.json";

/// Outcome of one promotion round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// One-based round number.
    pub round: u32,
    /// Self-play episodes played this round.
    pub episodes: u32,
    /// Examples added to the buffer this round.
    pub examples_added: usize,
    /// Buffer size after collection.
    pub buffer_len: usize,
    /// Average training losses per epoch.
    pub epoch_losses: Vec<LossReport>,
    /// Candidate's symmetric differential against the incumbent.
    pub gate_score: f32,
    pub promoted: bool,
    /// Incumbent's differential against the configured baseline, if any.
    pub benchmark_score: Option<f32>,
}

impl RoundReport {
    /// Losses of the final epoch, if training ran.
    pub fn final_loss(&self) -> Option<&LossReport> {
        self.epoch_losses.last()
    }
}

/// Aggregated trainer statistics, designed for lock-free episode updates.
#[derive(Debug)]
pub struct TrainerStats {
    env_id: String,
    /// Completed self-play episodes
    episodes: AtomicU32,
    /// Moves across all episodes
    total_moves: AtomicU64,
    /// Episodes won by the first mover
    first_mover_wins: AtomicU32,
    /// Episodes won by the second mover
    second_mover_wins: AtomicU32,
    draws: AtomicU32,
    promotions: AtomicU32,
    rounds: Mutex<Vec<RoundReport>>,
    start_time: Instant,
    /// Where snapshots go; `None` keeps stats in memory only
    stats_path: Option<PathBuf>,
}

/// Serializable stats for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerStatsSnapshot {
    pub env_id: String,
    pub episodes: u32,
    pub total_moves: u64,
    pub avg_episode_length: f64,
    pub first_mover_wins: u32,
    pub second_mover_wins: u32,
    pub draws: u32,
    pub promotions: u32,
    pub rounds: Vec<RoundReport>,
    pub runtime_seconds: f64,
    pub timestamp: u64,
}

impl TrainerStats {
    /// Create an in-memory stats tracker.
    pub fn new(env_id: &str) -> Self {
        Self {
            env_id: env_id.to_string(),
            episodes: AtomicU32::new(0),
            total_moves: AtomicU64::new(0),
            first_mover_wins: AtomicU32::new(0),
            second_mover_wins: AtomicU32::new(0),
            draws: AtomicU32::new(0),
            promotions: AtomicU32::new(0),
            rounds: Mutex::new(Vec::new()),
            start_time: Instant::now(),
            stats_path: None,
        }
    }

    /// Persist snapshots under `data_dir`, creating it if needed.
    pub fn with_data_dir(mut self, data_dir: &Path) -> Self {
        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory {}: {}", data_dir.display(), e);
        }
        self.stats_path = Some(data_dir.join(STATS_FILE));
        self
    }

    /// Record a finished self-play episode.
    pub fn record_episode(&self, moves: usize, first_mover_reward: f32) {
        self.episodes.fetch_add(1, Ordering::Relaxed);
        self.total_moves.fetch_add(moves as u64, Ordering::Relaxed);

        if first_mover_reward > 0.0 {
            self.first_mover_wins.fetch_add(1, Ordering::Relaxed);
        } else if first_mover_reward < 0.0 {
            self.second_mover_wins.fetch_add(1, Ordering::Relaxed);
        } else {
            self.draws.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a finished round.
    pub fn record_round(&self, report: &RoundReport) {
        if report.promoted {
            self.promotions.fetch_add(1, Ordering::Relaxed);
        }
        self.rounds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> TrainerStatsSnapshot {
        let episodes = self.episodes.load(Ordering::Relaxed);
        let total_moves = self.total_moves.load(Ordering::Relaxed);

        let avg_episode_length = if episodes > 0 {
            total_moves as f64 / episodes as f64
        } else {
            0.0
        };

        TrainerStatsSnapshot {
            env_id: self.env_id.clone(),
            episodes,
            total_moves,
            avg_episode_length,
            first_mover_wins: self.first_mover_wins.load(Ordering::Relaxed),
            second_mover_wins: self.second_mover_wins.load(Ordering::Relaxed),
            draws: self.draws.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            rounds: self
                .rounds
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            runtime_seconds: self.start_time.elapsed().as_secs_f64(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to JSON file (atomic write-then-rename).
    ///
    /// Failures are logged and otherwise ignored.
    pub fn write_stats(&self) {
        let Some(stats_path) = &self.stats_path else {
            return;
        };

        let json = match serde_json::to_string_pretty(&self.snapshot()) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize trainer stats: {}", e);
                return;
            }
        };

        // Write to temp file then rename (atomic on most filesystems)
        let temp_path = stats_path.with_extension("json.tmp");
        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write trainer stats: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp stats file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, stats_path) {
            warn!("Failed to rename stats file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote trainer stats to {}", stats_path.display());
    }

    pub fn stats_path(&self) -> Option<&Path> {
        self.stats_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(round: u32, promoted: bool) -> RoundReport {
        RoundReport {
            round,
            episodes: 4,
            examples_added: 30,
            buffer_len: 30,
            epoch_losses: vec![LossReport {
                policy_loss: 1.5,
                value_loss: 0.5,
                samples: 30,
            }],
            gate_score: 0.25,
            promoted,
            benchmark_score: None,
        }
    }

    #[test]
    fn test_record_episode_outcomes() {
        let stats = TrainerStats::new("tictactoe");
        stats.record_episode(5, 1.0);
        stats.record_episode(6, -1.0);
        stats.record_episode(9, 0.0);
        stats.record_episode(7, 1.0);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.episodes, 4);
        assert_eq!(snapshot.total_moves, 27);
        assert!((snapshot.avg_episode_length - 6.75).abs() < 1e-9);
        assert_eq!(snapshot.first_mover_wins, 2);
        assert_eq!(snapshot.second_mover_wins, 1);
        assert_eq!(snapshot.draws, 1);
    }

    #[test]
    fn test_record_round_counts_promotions() {
        let stats = TrainerStats::new("tictactoe");
        stats.record_round(&report(1, true));
        stats.record_round(&report(2, false));
        stats.record_round(&report(3, true));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.promotions, 2);
        assert_eq!(snapshot.rounds.len(), 3);
        assert_eq!(snapshot.rounds[1].round, 2);
    }

    #[test]
    fn test_write_stats_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let stats = TrainerStats::new("reversi").with_data_dir(&data_dir);
        stats.record_episode(10, -1.0);
        stats.record_round(&report(1, false));

        stats.write_stats();

        let path = stats.stats_path().unwrap();
        assert_eq!(path, data_dir.join(STATS_FILE));
        let text = std::fs::read_to_string(path).unwrap();
        let parsed: TrainerStatsSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.env_id, "reversi");
        assert_eq!(parsed.episodes, 1);
        assert_eq!(parsed.rounds, vec![report(1, false)]);
        assert!(!data_dir.join("trainer_stats.json.tmp").exists());
    }

    #[test]
    fn test_in_memory_stats_do_not_write() {
        let stats = TrainerStats::new("tictactoe");
        assert!(stats.stats_path().is_none());
        stats.write_stats();
    }

    #[test]
    fn test_final_loss() {
        let mut r = report(1, false);
        assert_eq!(r.final_loss().unwrap().samples, 30);
        r.epoch_losses.clear();
        assert!(r.final_loss().is_none());
    }
}
