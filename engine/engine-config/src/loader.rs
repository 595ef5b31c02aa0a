//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::Path;
use tracing::{debug, info, warn};

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "ARIMAA_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration.
///
/// Searches for a config file in the following order:
/// 1. Path specified by the ARIMAA_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = Path::new(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_PATH_ENV, path.display());
            return load_from_path(path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path. An unreadable or malformed
/// file falls back to the defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparsable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: ARIMAA_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "ARIMAA_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "ARIMAA_COMMON_LOG_LEVEL");

    // Search
    env_override!(
        config,
        search.explore_rate,
        "ARIMAA_SEARCH_EXPLORE_RATE",
        parse
    );
    env_override!(
        config,
        search.mature_level,
        "ARIMAA_SEARCH_MATURE_LEVEL",
        parse
    );
    env_override!(
        config,
        search.max_playout_length,
        "ARIMAA_SEARCH_MAX_PLAYOUT_LENGTH",
        parse
    );
    env_override!(
        config,
        search.eval_after_length,
        "ARIMAA_SEARCH_EVAL_AFTER_LENGTH",
        parse
    );
    env_override!(
        config,
        search.knowledge_in_playout,
        "ARIMAA_SEARCH_KNOWLEDGE_IN_PLAYOUT",
        parse
    );
    env_override!(
        config,
        search.knowledge_tournament_size,
        "ARIMAA_SEARCH_KNOWLEDGE_TOURNAMENT_SIZE",
        parse
    );
    env_override!(
        config,
        search.ignore_long_playouts,
        "ARIMAA_SEARCH_IGNORE_LONG_PLAYOUTS",
        parse
    );
    env_override!(
        config,
        search.repetition_history,
        "ARIMAA_SEARCH_REPETITION_HISTORY",
        parse
    );
    env_override!(config, search.seed, "ARIMAA_SEARCH_SEED", parse);

    // Time
    env_override!(config, time.move_secs, "ARIMAA_TIME_MOVE_SECS", parse);
    env_override!(
        config,
        time.reserve_secs,
        "ARIMAA_TIME_RESERVE_SECS",
        parse
    );
    env_override!(config, time.max_secs, "ARIMAA_TIME_MAX_SECS", parse);
    env_override!(
        config,
        time.safety_margin_secs,
        "ARIMAA_TIME_SAFETY_MARGIN_SECS",
        parse
    );

    // Actor
    env_override!(config, actor.games, "ARIMAA_ACTOR_GAMES", parse);
    env_override!(config, actor.max_turns, "ARIMAA_ACTOR_MAX_TURNS", parse);
    env_override!(
        config,
        actor.log_interval,
        "ARIMAA_ACTOR_LOG_INTERVAL",
        parse
    );

    config
}
