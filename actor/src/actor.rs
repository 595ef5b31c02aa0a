//! Self-play loop: two engines play full games against each other.
//!
//! Each game runs on the blocking pool. Shutdown raises the shared flag and
//! the stop handle of both engines; a search in progress ends at its next
//! playout boundary.

use anyhow::{anyhow, Result};
use games_arimaa::{Game, Player, Position};
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{Engine, MaterialEvaluator, SearchError, StopHandle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::stats::ActorStats;

/// The two engines of a self-play pairing.
pub struct Sides {
    gold: Engine,
    silver: Engine,
}

impl Sides {
    pub fn new(config: &Config) -> Self {
        let evaluator = Arc::new(MaterialEvaluator::new());
        let gold = Engine::new(config.uct_config(0), evaluator.clone())
            .with_time_manager(config.time_manager());
        let silver = Engine::new(config.uct_config(1), evaluator)
            .with_time_manager(config.time_manager());
        Self { gold, silver }
    }

    fn engine_mut(&mut self, player: Player) -> &mut Engine {
        match player {
            Player::Gold => &mut self.gold,
            Player::Silver => &mut self.silver,
        }
    }

    fn stop_handles(&self) -> [StopHandle; 2] {
        [self.gold.stop_handle(), self.silver.stop_handle()]
    }
}

/// How a single game went.
#[derive(Debug, Default)]
pub struct GameOutcome {
    /// Moves played, setup moves included
    pub turns: u32,
    pub winner: Option<Player>,
    pub record: Vec<String>,
    /// Cut short by a shutdown request
    pub interrupted: bool,
    pub searches: u32,
    pub playouts: u64,
    pub search_ms: u64,
}

/// Play one game from the empty board until it is decided, `max_turns`
/// moves have been played or `shutdown` is raised.
pub fn play_game(sides: &mut Sides, config: &Config, shutdown: &AtomicBool) -> Result<GameOutcome> {
    let mut game = Game::with_history(Position::new(), config.repetition_history);
    let mut outcome = GameOutcome::default();

    while !game.is_over() {
        if shutdown.load(Ordering::Relaxed) {
            outcome.interrupted = true;
            break;
        }
        if outcome.turns >= config.max_turns {
            debug!(turns = outcome.turns, "turn limit reached");
            break;
        }

        let side = game.position().side_to_move();
        let engine = sides.engine_mut(side);
        let best = match engine.search(game.position(), game.repetitions()) {
            Ok(best) => best,
            Err(SearchError::NoLegalMoves) => {
                info!(side = %side.side_char(), "no legal move, side to move loses");
                outcome.winner = Some(side.opponent());
                break;
            }
            Err(e) => return Err(anyhow!("search failed at turn {}: {}", outcome.turns, e)),
        };
        if let Some(stats) = engine.last_stats() {
            outcome.searches += 1;
            outcome.playouts += stats.playouts;
            outcome.search_ms += stats.elapsed.as_millis() as u64;
        }

        game.play_steps(&best.steps)
            .map_err(|e| anyhow!("engine produced an illegal move '{}': {}", best.notation, e))?;
        outcome.turns += 1;
        debug!(
            turn = outcome.turns,
            side = %side.side_char(),
            notation = %best.notation,
            visits = best.visits,
            value = best.value,
            "move played"
        );
    }

    if outcome.winner.is_none() {
        outcome.winner = game.position().winner();
    }
    outcome.record = game.record().to_vec();
    Ok(outcome)
}

/// Write a game record, one move per line, as `game-NNNNN.txt` under `dir`.
pub fn write_record(dir: &Path, game_number: u32, record: &[String]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| anyhow!("failed to create {}: {}", dir.display(), e))?;
    let path = dir.join(format!("game-{:05}.txt", game_number));
    let mut content = record.join("\n");
    content.push('\n');
    fs::write(&path, content).map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;
    Ok(path)
}

pub struct Actor {
    config: Config,
    stats: ActorStats,
    /// Taken out while a game is running on the blocking pool
    sides: Mutex<Option<Sides>>,
    stop_handles: [StopHandle; 2],
    games_played: AtomicU32,
    shutdown_signal: Arc<AtomicBool>,
}

impl Actor {
    pub fn new(config: Config) -> Result<Self> {
        let sides = Sides::new(&config);
        let stop_handles = sides.stop_handles();
        let stats = ActorStats::new(&config.data_dir);
        info!(
            explore_rate = config.explore_rate,
            mature_level = config.mature_level,
            knowledge = config.knowledge_in_playout,
            move_secs = config.move_secs,
            "Engines initialized"
        );

        Ok(Self {
            config,
            stats,
            sides: Mutex::new(Some(sides)),
            stop_handles,
            games_played: AtomicU32::new(0),
            shutdown_signal: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn stats(&self) -> &ActorStats {
        &self.stats
    }

    pub async fn run(&self) -> Result<()> {
        info!(
            games = self.config.games,
            max_turns = self.config.max_turns,
            data_dir = %self.config.data_dir,
            "Actor starting main loop"
        );

        // Progress bar for bounded runs, only when stderr is a TTY
        let progress = if self.config.games > 0
            && std::io::IsTerminal::is_terminal(&std::io::stderr())
        {
            let pb = ProgressBar::new(self.config.games as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        loop {
            if self.shutdown_signal.load(Ordering::Relaxed) {
                info!("Shutdown signal received, stopping actor");
                break;
            }

            let played = self.games_played.load(Ordering::Relaxed);
            if self.config.games > 0 && played >= self.config.games {
                info!("Reached requested games ({}), stopping", self.config.games);
                break;
            }

            let game_number = played + 1;
            let game_start = Instant::now();
            let outcome = match self.run_game().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Game {} failed: {}", game_number, e);
                    return Err(e);
                }
            };

            if outcome.interrupted {
                info!(
                    game = game_number,
                    turns = outcome.turns,
                    "Game interrupted, not recorded"
                );
                continue;
            }

            self.games_played.fetch_add(1, Ordering::Relaxed);
            self.stats.record_game(outcome.turns, outcome.winner);
            self.stats
                .record_search_stats(outcome.searches, outcome.playouts, outcome.search_ms);
            self.stats.write_stats();

            let winner = outcome
                .winner
                .map(|p| p.side_char().to_string())
                .unwrap_or_else(|| "-".into());
            debug!(
                game = game_number,
                turns = outcome.turns,
                winner = %winner,
                playouts = outcome.playouts,
                duration = game_start.elapsed().as_secs_f64(),
                "Game completed"
            );

            if !self.config.no_records {
                match write_record(&self.config.records_dir(), game_number, &outcome.record) {
                    Ok(path) => debug!("Wrote game record to {}", path.display()),
                    Err(e) => warn!("Failed to write game record: {}", e),
                }
            }

            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            if self.config.log_interval > 0 && game_number % self.config.log_interval == 0 {
                let log = || {
                    let snapshot = self.stats.snapshot();
                    info!(
                        games = snapshot.games_completed,
                        gold_wins = snapshot.gold_wins,
                        silver_wins = snapshot.silver_wins,
                        unfinished = snapshot.unfinished,
                        avg_game_length = format!("{:.1}", snapshot.avg_game_length),
                        playouts_per_second = format!("{:.0}", snapshot.playouts_per_second),
                        "Self-play progress"
                    );
                };
                match progress {
                    Some(ref pb) => pb.suspend(log),
                    None => log(),
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        info!(
            games = self.games_played.load(Ordering::Relaxed),
            "Actor stopped gracefully"
        );
        Ok(())
    }

    pub fn shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        for handle in &self.stop_handles {
            handle.request_stop();
        }
        info!("Shutdown signal set");
    }

    /// Move the engines onto the blocking pool for one game and take them back.
    async fn run_game(&self) -> Result<GameOutcome> {
        let mut sides = self
            .lock_sides()?
            .take()
            .ok_or_else(|| anyhow!("engines are already in use"))?;
        let config = self.config.clone();
        let shutdown = Arc::clone(&self.shutdown_signal);

        let (sides, result) = tokio::task::spawn_blocking(move || {
            let result = play_game(&mut sides, &config, &shutdown);
            (sides, result)
        })
        .await
        .map_err(|e| anyhow!("game task failed: {}", e))?;

        *self.lock_sides()? = Some(sides);
        result
    }

    fn lock_sides(&self) -> Result<std::sync::MutexGuard<'_, Option<Sides>>> {
        self.sides
            .lock()
            .map_err(|e| anyhow!("Engine lock poisoned: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    fn quick_config(data_dir: &str, max_turns: u32) -> Config {
        Config::parse_from([
            "actor",
            "--games",
            "1",
            "--max-turns",
            max_turns.to_string().as_str(),
            "--data-dir",
            data_dir,
            "--move-secs",
            "0.05",
            "--max-secs",
            "0",
            "--safety-margin-secs",
            "0",
            "--mature-level",
            "5",
            "--max-playout-length",
            "20",
            "--eval-after-length",
            "4",
            "--knowledge-in-playout",
            "false",
            "--seed",
            "9",
        ])
    }

    #[test]
    fn test_play_game_respects_turn_limit() {
        let dir = tempdir().unwrap();
        let config = quick_config(dir.path().to_str().unwrap(), 4);
        let mut sides = Sides::new(&config);

        let outcome = play_game(&mut sides, &config, &AtomicBool::new(false)).unwrap();
        assert_eq!(outcome.turns, 4);
        assert_eq!(outcome.winner, None);
        assert!(!outcome.interrupted);
        assert_eq!(outcome.record.len(), 4);
        assert!(outcome.record[0].starts_with("1g Ra1"));
        assert!(outcome.record[1].starts_with("1s ra8"));
        // Setup moves are answered without a search
        assert_eq!(outcome.searches, 2);
        assert!(outcome.playouts >= 2);
    }

    #[test]
    fn test_play_game_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let config = quick_config(dir.path().to_str().unwrap(), 4);
        let mut sides = Sides::new(&config);

        let outcome = play_game(&mut sides, &config, &AtomicBool::new(true)).unwrap();
        assert!(outcome.interrupted);
        assert_eq!(outcome.turns, 0);
        assert!(outcome.record.is_empty());
    }

    #[test]
    fn test_written_record_replays() {
        let dir = tempdir().unwrap();
        let config = quick_config(dir.path().to_str().unwrap(), 4);
        let mut sides = Sides::new(&config);
        let outcome = play_game(&mut sides, &config, &AtomicBool::new(false)).unwrap();

        let path = write_record(&config.records_dir(), 7, &outcome.record).unwrap();
        assert!(path.ends_with("games/game-00007.txt"));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        let replayed = Game::from_record(&lines).unwrap();
        assert_eq!(replayed.record(), outcome.record.as_slice());
    }

    #[tokio::test]
    async fn test_actor_runs_requested_games() {
        let dir = tempdir().unwrap();
        let config = quick_config(dir.path().to_str().unwrap(), 3);
        let records_dir = config.records_dir();
        let actor = Actor::new(config).unwrap();

        actor.run().await.unwrap();

        let snapshot = actor.stats().snapshot();
        assert_eq!(snapshot.games_completed, 1);
        assert_eq!(snapshot.unfinished, 1);
        assert_eq!(snapshot.total_turns, 3);
        assert!(Path::new(actor.stats().stats_path()).exists());
        assert!(records_dir.join("game-00001.txt").exists());
    }

    #[tokio::test]
    async fn test_shutdown_before_run_plays_nothing() {
        let dir = tempdir().unwrap();
        let config = quick_config(dir.path().to_str().unwrap(), 3);
        let actor = Actor::new(config).unwrap();

        actor.shutdown();
        actor.run().await.unwrap();
        assert_eq!(actor.stats().snapshot().games_completed, 0);
    }
}
