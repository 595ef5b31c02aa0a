//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared by
//! the engine's binaries.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`ARIMAA_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! ARIMAA_<SECTION>_<KEY>=value
//!
//! Examples:
//!     ARIMAA_COMMON_LOG_LEVEL=debug
//!     ARIMAA_SEARCH_MATURE_LEVEL=40
//!     ARIMAA_SEARCH_KNOWLEDGE_IN_PLAYOUT=false
//!     ARIMAA_TIME_MOVE_SECS=10
//!     ARIMAA_ACTOR_GAMES=5
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_PATH_ENV, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
