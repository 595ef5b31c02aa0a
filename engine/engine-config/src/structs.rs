//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_explore_rate() -> f32 {
    defaults::explore_rate()
}
fn d_mature_level() -> u32 {
    defaults::mature_level()
}
fn d_max_playout_length() -> u32 {
    defaults::max_playout_length()
}
fn d_eval_after_length() -> u32 {
    defaults::eval_after_length()
}
fn d_knowledge() -> bool {
    defaults::knowledge_in_playout()
}
fn d_tournament_size() -> u32 {
    defaults::knowledge_tournament_size()
}
fn d_ignore_long() -> bool {
    defaults::ignore_long_playouts()
}
fn d_repetition_history() -> usize {
    defaults::repetition_history()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_move_secs() -> f64 {
    defaults::move_secs()
}
fn d_reserve_secs() -> f64 {
    defaults::reserve_secs()
}
fn d_max_secs() -> f64 {
    defaults::max_secs()
}
fn d_safety_margin() -> f64 {
    defaults::safety_margin_secs()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_max_turns() -> u32 {
    defaults::max_turns()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub actor: ActorConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// UCT search parameters
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Weight of the exploration term in UCB1.
    #[serde(default = "d_explore_rate")]
    pub explore_rate: f32,
    /// Visits a leaf needs before it is expanded.
    #[serde(default = "d_mature_level")]
    pub mature_level: u32,
    /// Playouts are abandoned after twice this many turns.
    #[serde(default = "d_max_playout_length")]
    pub max_playout_length: u32,
    /// Turns after which a playout is scored by the evaluator (0 = never).
    #[serde(default = "d_eval_after_length")]
    pub eval_after_length: u32,
    #[serde(default = "d_knowledge")]
    pub knowledge_in_playout: bool,
    #[serde(default = "d_tournament_size")]
    pub knowledge_tournament_size: u32,
    #[serde(default = "d_ignore_long")]
    pub ignore_long_playouts: bool,
    /// Capacity of the repetition history kept per game.
    #[serde(default = "d_repetition_history")]
    pub repetition_history: usize,
    /// 0 seeds from entropy.
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            explore_rate: defaults::explore_rate(),
            mature_level: defaults::mature_level(),
            max_playout_length: defaults::max_playout_length(),
            eval_after_length: defaults::eval_after_length(),
            knowledge_in_playout: defaults::knowledge_in_playout(),
            knowledge_tournament_size: defaults::knowledge_tournament_size(),
            ignore_long_playouts: defaults::ignore_long_playouts(),
            repetition_history: defaults::repetition_history(),
            seed: defaults::seed(),
        }
    }
}

/// Per-move clock settings, in seconds
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimeConfig {
    #[serde(default = "d_move_secs")]
    pub move_secs: f64,
    #[serde(default = "d_reserve_secs")]
    pub reserve_secs: f64,
    /// Hard cap per move (0 = no cap).
    #[serde(default = "d_max_secs")]
    pub max_secs: f64,
    #[serde(default = "d_safety_margin")]
    pub safety_margin_secs: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            move_secs: defaults::move_secs(),
            reserve_secs: defaults::reserve_secs(),
            max_secs: defaults::max_secs(),
            safety_margin_secs: defaults::safety_margin_secs(),
        }
    }
}

/// Self-play actor configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ActorConfig {
    #[serde(default = "d_games")]
    pub games: u32,
    /// Games still running after this many turns are abandoned.
    #[serde(default = "d_max_turns")]
    pub max_turns: u32,
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            max_turns: defaults::max_turns(),
            log_interval: defaults::log_interval(),
        }
    }
}
