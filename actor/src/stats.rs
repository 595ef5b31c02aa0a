//! Self-play statistics tracking and persistence.
//!
//! Counts finished games by outcome, turns played and search effort.
//! A JSON snapshot is written next to the game records after every game.

use games_arimaa::Player;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

/// Aggregated actor statistics, designed for lock-free updates.
#[derive(Debug)]
pub struct ActorStats {
    games_completed: AtomicU32,
    gold_wins: AtomicU32,
    silver_wins: AtomicU32,
    /// Games cut off by the turn limit
    unfinished: AtomicU32,
    total_turns: AtomicU64,
    searches: AtomicU64,
    playouts: AtomicU64,
    /// Wall-clock search time (milliseconds)
    search_ms: AtomicU64,
    start_time: Instant,
    stats_path: String,
}

/// Serializable stats for JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActorStatsSnapshot {
    pub games_completed: u32,
    pub gold_wins: u32,
    pub silver_wins: u32,
    pub unfinished: u32,
    pub total_turns: u64,
    pub avg_game_length: f64,
    pub searches: u64,
    pub playouts: u64,
    pub avg_playouts_per_search: f64,
    pub playouts_per_second: f64,
    pub runtime_seconds: f64,
    pub timestamp: u64,
}

impl ActorStats {
    pub fn new(data_dir: &str) -> Self {
        let stats_path = format!("{}/actor_stats.json", data_dir);

        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory: {}", e);
        }

        Self {
            games_completed: AtomicU32::new(0),
            gold_wins: AtomicU32::new(0),
            silver_wins: AtomicU32::new(0),
            unfinished: AtomicU32::new(0),
            total_turns: AtomicU64::new(0),
            searches: AtomicU64::new(0),
            playouts: AtomicU64::new(0),
            search_ms: AtomicU64::new(0),
            start_time: Instant::now(),
            stats_path,
        }
    }

    /// Record a game. `winner` is `None` for a game that did not finish.
    pub fn record_game(&self, turns: u32, winner: Option<Player>) {
        self.games_completed.fetch_add(1, Ordering::Relaxed);
        self.total_turns.fetch_add(turns as u64, Ordering::Relaxed);
        let counter = match winner {
            Some(Player::Gold) => &self.gold_wins,
            Some(Player::Silver) => &self.silver_wins,
            None => &self.unfinished,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the search effort spent on one game.
    pub fn record_search_stats(&self, searches: u32, playouts: u64, search_ms: u64) {
        self.searches.fetch_add(searches as u64, Ordering::Relaxed);
        self.playouts.fetch_add(playouts, Ordering::Relaxed);
        self.search_ms.fetch_add(search_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ActorStatsSnapshot {
        let games = self.games_completed.load(Ordering::Relaxed);
        let total_turns = self.total_turns.load(Ordering::Relaxed);
        let searches = self.searches.load(Ordering::Relaxed);
        let playouts = self.playouts.load(Ordering::Relaxed);
        let search_ms = self.search_ms.load(Ordering::Relaxed);

        let avg_game_length = if games > 0 {
            total_turns as f64 / games as f64
        } else {
            0.0
        };

        let avg_playouts_per_search = if searches > 0 {
            playouts as f64 / searches as f64
        } else {
            0.0
        };

        let playouts_per_second = if search_ms > 0 {
            playouts as f64 * 1000.0 / search_ms as f64
        } else {
            0.0
        };

        ActorStatsSnapshot {
            games_completed: games,
            gold_wins: self.gold_wins.load(Ordering::Relaxed),
            silver_wins: self.silver_wins.load(Ordering::Relaxed),
            unfinished: self.unfinished.load(Ordering::Relaxed),
            total_turns,
            avg_game_length,
            searches,
            playouts,
            avg_playouts_per_search,
            playouts_per_second,
            runtime_seconds: self.start_time.elapsed().as_secs_f64(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write the snapshot as JSON next to the game records. Failures are
    /// logged and otherwise ignored.
    pub fn write_stats(&self) {
        match self.try_write_stats() {
            Ok(()) => debug!("Wrote actor stats to {}", self.stats_path),
            Err(e) => warn!("Failed to write actor stats to {}: {}", self.stats_path, e),
        }
    }

    /// Serialize into `<path>.tmp`, then rename it over the stats file.
    fn try_write_stats(&self) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(&self.snapshot())?;
        let temp_path = format!("{}.tmp", self.stats_path);
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, &self.stats_path).inspect_err(|_| {
            let _ = fs::remove_file(&temp_path);
        })
    }

    pub fn stats_path(&self) -> &str {
        &self.stats_path
    }
}
