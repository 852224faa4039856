//! Tests for engine configuration.

use std::io::Write;

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "fast_assert"

        [score_director]
        constraint_match_enabled = true

        [score_director.constraint_weights]
        "Room conflict" = "-1hard/0soft"
        "Room stability" = "0hard/-2soft"
    "#;

    let config = EngineConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FastAssert);
    assert!(config.score_director.constraint_match_enabled);
    assert_eq!(config.score_director.constraint_weights.len(), 2);
    assert_eq!(config.constraint_weight("Room stability"), Some("0hard/-2soft"));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        environment_mode: full_assert
        score_director:
          constraint_match_enabled: false
          constraint_weights:
            Room conflict: "-1hard/0soft"
    "#;

    let config = EngineConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
    assert!(config.environment_mode.is_fully_asserted());
    assert_eq!(config.constraint_weight("Room conflict"), Some("-1hard/0soft"));
}

#[test]
fn test_defaults_for_empty_document() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.environment_mode, EnvironmentMode::NonReproducible);
    assert!(!config.score_director.constraint_match_enabled);
    assert!(!config.environment_mode.is_asserted());
}

#[test]
fn test_builder() {
    let config = EngineConfig::new()
        .with_environment_mode(EnvironmentMode::Reproducible)
        .with_constraint_match_enabled(true)
        .with_constraint_weight("Overtime", "-3");

    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    assert!(config.score_director.constraint_match_enabled);
    assert_eq!(config.constraint_weight("Overtime"), Some("-3"));
    assert_eq!(config.constraint_weight("Undertime"), None);
}

#[test]
fn test_unknown_mode_is_rejected() {
    let err = EngineConfig::from_toml_str(r#"environment_mode = "turbo""#).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));

    let err: PlanwrightError = err.into();
    assert!(matches!(err, PlanwrightError::Config(_)));
}

#[test]
fn test_load_picks_format_by_extension() {
    let dir = std::env::temp_dir();
    let yaml_path = dir.join(format!("planwright-config-{}.yaml", std::process::id()));
    let toml_path = dir.join(format!("planwright-config-{}.toml", std::process::id()));

    std::fs::File::create(&yaml_path)
        .unwrap()
        .write_all(b"environment_mode: fast_assert\n")
        .unwrap();
    std::fs::File::create(&toml_path)
        .unwrap()
        .write_all(b"environment_mode = \"full_assert\"\n")
        .unwrap();

    assert_eq!(
        EngineConfig::load(&yaml_path).unwrap().environment_mode,
        EnvironmentMode::FastAssert
    );
    assert_eq!(
        EngineConfig::load(&toml_path).unwrap().environment_mode,
        EnvironmentMode::FullAssert
    );

    std::fs::remove_file(yaml_path).unwrap();
    std::fs::remove_file(toml_path).unwrap();
}

#[test]
fn test_missing_file_is_io_error() {
    let err = EngineConfig::load("/nonexistent/planwright/engine.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
