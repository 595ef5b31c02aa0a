//! Default configuration values loaded from config.defaults.toml.
//!
//! The file is embedded at compile time so the binary and the checked-in
//! defaults can never drift apart.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    search: SearchDefaults,
    time: TimeDefaults,
    actor: ActorDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct SearchDefaults {
    explore_rate: f32,
    mature_level: u32,
    max_playout_length: u32,
    eval_after_length: u32,
    knowledge_in_playout: bool,
    knowledge_tournament_size: u32,
    ignore_long_playouts: bool,
    repetition_history: usize,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct TimeDefaults {
    move_secs: f64,
    reserve_secs: f64,
    max_secs: f64,
    safety_margin_secs: f64,
}

#[derive(Debug, Deserialize)]
struct ActorDefaults {
    games: u32,
    max_turns: u32,
    log_interval: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Search
pub fn explore_rate() -> f32 {
    DEFAULTS.search.explore_rate
}
pub fn mature_level() -> u32 {
    DEFAULTS.search.mature_level
}
pub fn max_playout_length() -> u32 {
    DEFAULTS.search.max_playout_length
}
pub fn eval_after_length() -> u32 {
    DEFAULTS.search.eval_after_length
}
pub fn knowledge_in_playout() -> bool {
    DEFAULTS.search.knowledge_in_playout
}
pub fn knowledge_tournament_size() -> u32 {
    DEFAULTS.search.knowledge_tournament_size
}
pub fn ignore_long_playouts() -> bool {
    DEFAULTS.search.ignore_long_playouts
}
pub fn repetition_history() -> usize {
    DEFAULTS.search.repetition_history
}
pub fn seed() -> u64 {
    DEFAULTS.search.seed
}

// Time
pub fn move_secs() -> f64 {
    DEFAULTS.time.move_secs
}
pub fn reserve_secs() -> f64 {
    DEFAULTS.time.reserve_secs
}
pub fn max_secs() -> f64 {
    DEFAULTS.time.max_secs
}
pub fn safety_margin_secs() -> f64 {
    DEFAULTS.time.safety_margin_secs
}

// Actor
pub fn games() -> u32 {
    DEFAULTS.actor.games
}
pub fn max_turns() -> u32 {
    DEFAULTS.actor.max_turns
}
pub fn log_interval() -> u32 {
    DEFAULTS.actor.log_interval
}
