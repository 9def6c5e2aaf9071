//! Tests for the mrguard configuration system.

use std::sync::Mutex;
use std::time::Duration;

use mrguard_core::config::{CliOverrides, EnforcementFlags, GuardConfig};
use mrguard_core::errors::ConfigError;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

fn clear_mrguard_env_vars() {
    for key in [
        "MRGUARD_FALLBACK_BEHAVIOR_ENABLED",
        "MRGUARD_INCLUDE_MANUAL_TO_PIPELINE_COMPLETION",
        "MRGUARD_SAVE_POLICY_VIOLATION_DATA",
        "MRGUARD_ANNOUNCE_RESOLUTION",
        "MRGUARD_COMMENT_BOT_USERNAME",
        "MRGUARD_LOCK_TTL_MS",
        "MRGUARD_LOCK_SLEEP_MS",
        "MRGUARD_LOCK_RETRIES",
        "MRGUARD_DATABASE_PATH",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_four_layer_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_mrguard_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("mrguard.toml"),
        r#"
[enforcement]
save_policy_violation_data = false

[lock]
ttl_ms = 2000
retries = 5

[comment]
bot_username = "project-bot"
"#,
    )
    .unwrap();

    std::env::set_var("MRGUARD_LOCK_TTL_MS", "3000");

    let cli = CliOverrides {
        bot_username: Some("cli-bot".to_string()),
        ..Default::default()
    };

    let config = GuardConfig::load(dir.path(), Some(&cli)).unwrap();
    clear_mrguard_env_vars();

    // CLI beats project config
    assert_eq!(config.comment.effective_bot_username(), "cli-bot");
    // env beats project config
    assert_eq!(config.lock.effective_ttl(), Duration::from_millis(3000));
    // project config beats defaults
    assert_eq!(config.lock.effective_retries(), 5);
    assert!(!config.enforcement.flags().save_policy_violation_data);
    // untouched values keep defaults
    assert_eq!(config.lock.effective_sleep(), Duration::from_millis(100));
}

#[test]
fn test_defaults_without_files() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_mrguard_env_vars();

    let dir = tempdir();
    let config = GuardConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.comment.effective_bot_username(), "security-policy-bot");
    assert_eq!(config.comment.effective_max_violations(), 10);
    assert_eq!(config.lock.effective_ttl(), Duration::from_secs(10));
    assert_eq!(config.lock.max_wait(), Duration::from_millis(5000));
    assert_eq!(
        config.storage.effective_database_path(dir.path()),
        dir.path().join(".mrguard").join("mrguard.db")
    );
}

#[test]
fn test_default_enforcement_flags() {
    let flags = EnforcementFlags::default();
    assert!(flags.fallback_behavior_enabled);
    assert!(!flags.include_manual_to_pipeline_completion);
    assert!(flags.save_policy_violation_data);
    assert!(!flags.bulk_license_policy_creation);
    assert!(!flags.announce_resolution);
}

#[test]
fn test_invalid_toml_reports_parse_error() {
    let result = GuardConfig::from_toml("[lock\nttl_ms = ");
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = GuardConfig::from_toml(
        r#"
[lock]
sleep_ms = 10
future_option = "yes"

[something_else]
value = 1
"#,
    )
    .unwrap();
    assert_eq!(config.lock.effective_sleep(), Duration::from_millis(10));
}

#[test]
fn test_validation_rejects_zero_retries() {
    let config = GuardConfig::from_toml("[lock]\nretries = 0\n").unwrap();
    let err = GuardConfig::validate(&config).unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => assert_eq!(field, "lock.retries"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_validation_rejects_zero_sleep_and_blank_bot() {
    let config = GuardConfig::from_toml("[lock]\nsleep_ms = 0\n").unwrap();
    assert!(GuardConfig::validate(&config).is_err());

    let config = GuardConfig::from_toml("[comment]\nbot_username = \"  \"\n").unwrap();
    assert!(GuardConfig::validate(&config).is_err());
}

#[test]
fn test_toml_round_trip_preserves_values() {
    let config = GuardConfig::from_toml(
        r#"
[enforcement]
announce_resolution = true

[comment]
max_violations = 20
"#,
    )
    .unwrap();
    let serialized = config.to_toml().unwrap();
    let reparsed = GuardConfig::from_toml(&serialized).unwrap();
    assert!(reparsed.enforcement.flags().announce_resolution);
    assert_eq!(reparsed.comment.effective_max_violations(), 20);
}

#[test]
fn test_env_bool_ignores_garbage() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_mrguard_env_vars();

    std::env::set_var("MRGUARD_ANNOUNCE_RESOLUTION", "definitely");
    std::env::set_var("MRGUARD_INCLUDE_MANUAL_TO_PIPELINE_COMPLETION", "true");
    let dir = tempdir();
    let config = GuardConfig::load(dir.path(), None).unwrap();
    clear_mrguard_env_vars();

    let flags = config.enforcement.flags();
    assert!(!flags.announce_resolution);
    assert!(flags.include_manual_to_pipeline_completion);
}
