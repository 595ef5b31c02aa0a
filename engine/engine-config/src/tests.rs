//! Tests for the configuration module.

use super::*;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.search.mature_level, 20);
    assert_eq!(config.time.safety_margin_secs, 0.2);
    assert_eq!(config.actor.games, 1);
    assert_eq!(config.actor.max_turns, 200);
}

#[test]
fn test_search_defaults() {
    let config = CentralConfig::default();
    assert!((config.search.explore_rate - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.search.max_playout_length, 100);
    assert_eq!(config.search.eval_after_length, 8);
    assert!(config.search.knowledge_in_playout);
    assert_eq!(config.search.knowledge_tournament_size, 3);
    assert!(!config.search.ignore_long_playouts);
    assert_eq!(config.search.repetition_history, 1024);
    assert_eq!(config.search.seed, 0);
}

#[test]
fn test_time_defaults() {
    let config = CentralConfig::default();
    assert!((config.time.move_secs - 3.0).abs() < f64::EPSILON);
    assert!((config.time.reserve_secs - 0.0).abs() < f64::EPSILON);
    assert!((config.time.max_secs - 0.0).abs() < f64::EPSILON);
}

#[test]
fn test_env_overrides() {
    std::env::set_var("ARIMAA_SEARCH_MATURE_LEVEL", "40");
    std::env::set_var("ARIMAA_SEARCH_KNOWLEDGE_IN_PLAYOUT", "false");
    std::env::set_var("ARIMAA_TIME_MOVE_SECS", "0.5");
    std::env::set_var("ARIMAA_COMMON_DATA_DIR", "/tmp/arimaa");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.search.mature_level, 40);
    assert!(!config.search.knowledge_in_playout);
    assert!((config.time.move_secs - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.common.data_dir, "/tmp/arimaa");

    std::env::remove_var("ARIMAA_SEARCH_MATURE_LEVEL");
    std::env::remove_var("ARIMAA_SEARCH_KNOWLEDGE_IN_PLAYOUT");
    std::env::remove_var("ARIMAA_TIME_MOVE_SECS");
    std::env::remove_var("ARIMAA_COMMON_DATA_DIR");
}

#[test]
fn test_unparsable_override_is_ignored() {
    std::env::set_var("ARIMAA_ACTOR_MAX_TURNS", "lots");
    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.actor.max_turns, 200);
    std::env::remove_var("ARIMAA_ACTOR_MAX_TURNS");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "debug"

[search]
explore_rate = 0.5
mature_level = 10
seed = 7

[time]
move_secs = 10.0
max_secs = 12.0

[actor]
games = 4
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "debug");
    assert!((config.search.explore_rate - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.search.mature_level, 10);
    assert_eq!(config.search.seed, 7);
    assert!((config.time.move_secs - 10.0).abs() < f64::EPSILON);
    assert!((config.time.max_secs - 12.0).abs() < f64::EPSILON);
    assert_eq!(config.actor.games, 4);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[search]
mature_level = 5
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.search.mature_level, 5);
    assert_eq!(config.search.max_playout_length, 100); // Default
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config.actor.max_turns, 200); // Default
}

#[test]
fn test_load_from_missing_path_falls_back() {
    let config = load_from_path(std::path::Path::new("/definitely/not/here.toml"));
    assert_eq!(config.search.knowledge_tournament_size, 3);
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.search.mature_level, cloned.search.mature_level);
    assert_eq!(config.common.log_level, cloned.common.log_level);
}
