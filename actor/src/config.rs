//! Configuration for the self-play actor
//!
//! Defaults come from the central configuration (config.toml plus
//! `ARIMAA_<SECTION>_<KEY>` overrides). CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};
use engine_config::{load_config, CentralConfig};
use mcts::{TimeManager, UctConfig};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_games() -> u32 {
    CENTRAL_CONFIG.actor.games
}

fn default_max_turns() -> u32 {
    CENTRAL_CONFIG.actor.max_turns
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.actor.log_interval
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_explore_rate() -> f32 {
    CENTRAL_CONFIG.search.explore_rate
}

fn default_mature_level() -> u32 {
    CENTRAL_CONFIG.search.mature_level
}

fn default_max_playout_length() -> u32 {
    CENTRAL_CONFIG.search.max_playout_length
}

fn default_eval_after_length() -> u32 {
    CENTRAL_CONFIG.search.eval_after_length
}

fn default_knowledge() -> bool {
    CENTRAL_CONFIG.search.knowledge_in_playout
}

fn default_tournament_size() -> u32 {
    CENTRAL_CONFIG.search.knowledge_tournament_size
}

fn default_ignore_long() -> bool {
    CENTRAL_CONFIG.search.ignore_long_playouts
}

fn default_repetition_history() -> usize {
    CENTRAL_CONFIG.search.repetition_history
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.search.seed
}

fn default_move_secs() -> f64 {
    CENTRAL_CONFIG.time.move_secs
}

fn default_reserve_secs() -> f64 {
    CENTRAL_CONFIG.time.reserve_secs
}

fn default_max_secs() -> f64 {
    CENTRAL_CONFIG.time.max_secs
}

fn default_safety_margin() -> f64 {
    CENTRAL_CONFIG.time.safety_margin_secs
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "actor")]
#[command(about = "Arimaa self-play actor")]
#[command(
    long_about = "Plays full Arimaa games between two UCT engines, logs every move
and writes game records and running statistics to the data directory.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Games to play (0 plays until interrupted)
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Abandon a game still running after this many turns
    #[arg(long, default_value_t = default_max_turns())]
    pub max_turns: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Log a summary every N games (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,

    /// Directory for game records and the stats file
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Do not write game records
    #[arg(long)]
    pub no_records: bool,

    /// UCB1 exploration weight
    #[arg(long, default_value_t = default_explore_rate())]
    pub explore_rate: f32,

    /// Visits a leaf needs before it is expanded
    #[arg(long, default_value_t = default_mature_level())]
    pub mature_level: u32,

    /// Abandon playouts after twice this many turns
    #[arg(long, default_value_t = default_max_playout_length())]
    pub max_playout_length: u32,

    /// Score playouts with the evaluator after this many turns (0 = never)
    #[arg(long, default_value_t = default_eval_after_length())]
    pub eval_after_length: u32,

    #[arg(long, default_value_t = default_knowledge(), action = ArgAction::Set)]
    pub knowledge_in_playout: bool,

    #[arg(long, default_value_t = default_tournament_size())]
    pub knowledge_tournament_size: u32,

    #[arg(long, default_value_t = default_ignore_long(), action = ArgAction::Set)]
    pub ignore_long_playouts: bool,

    /// Capacity of the per-game repetition history
    #[arg(long, default_value_t = default_repetition_history())]
    pub repetition_history: usize,

    /// Search seed (0 seeds from entropy). Silver uses seed + 1.
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Thinking time per move in seconds
    #[arg(long, default_value_t = default_move_secs())]
    pub move_secs: f64,

    #[arg(long, default_value_t = default_reserve_secs())]
    pub reserve_secs: f64,

    /// Hard cap per move in seconds (0 = no cap)
    #[arg(long, default_value_t = default_max_secs())]
    pub max_secs: f64,

    #[arg(long, default_value_t = default_safety_margin())]
    pub safety_margin_secs: f64,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        if self.max_turns == 0 {
            return Err(anyhow!("max_turns must be greater than 0"));
        }

        if self.max_playout_length == 0 {
            return Err(anyhow!("max_playout_length must be greater than 0"));
        }

        if self.repetition_history == 0 {
            return Err(anyhow!("repetition_history must be greater than 0"));
        }

        if !self.explore_rate.is_finite() || self.explore_rate < 0.0 {
            return Err(anyhow!(
                "explore_rate must be a non-negative number, got {}",
                self.explore_rate
            ));
        }

        if !self.move_secs.is_finite() || self.move_secs <= 0.0 {
            return Err(anyhow!(
                "move_secs must be greater than 0, got {}",
                self.move_secs
            ));
        }

        for (name, value) in [
            ("reserve_secs", self.reserve_secs),
            ("max_secs", self.max_secs),
            ("safety_margin_secs", self.safety_margin_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!("{} must be a non-negative number, got {}", name, value));
            }
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Search parameters for one side. A fixed seed is offset by `side_offset`.
    pub fn uct_config(&self, side_offset: u64) -> UctConfig {
        let seed = match self.seed {
            0 => 0,
            seed => seed.wrapping_add(side_offset),
        };
        UctConfig {
            explore_rate: self.explore_rate,
            mature_level: self.mature_level,
            max_playout_length: self.max_playout_length,
            eval_after_length: self.eval_after_length,
            knowledge_in_playout: self.knowledge_in_playout,
            knowledge_tournament_size: self.knowledge_tournament_size,
            ignore_long_playouts: self.ignore_long_playouts,
            repetition_history: self.repetition_history,
            seed,
        }
    }

    pub fn time_manager(&self) -> TimeManager {
        TimeManager::from_config(
            self.move_secs,
            self.reserve_secs,
            self.max_secs,
            self.safety_margin_secs,
        )
    }

    /// Directory game records are written to
    pub fn records_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("games")
    }
}
