use keyed_task_queue::config::Config;
use keyed_task_queue::strategy::StrategyKind;
use std::env;
use std::fs;
use std::sync::Mutex;

// Mutex to ensure environment variable tests don't run in parallel
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_VARS: [&str; 5] = [
    "KEYED_QUEUE_CONFIG",
    "KEYED_QUEUE_KEY_CAPACITY",
    "KEYED_QUEUE_STRATEGY",
    "KEYED_QUEUE_KEYS",
    "KEYED_QUEUE_EXCLUDE_SOURCE",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_load_config_from_yaml() {
    let yaml_content = r#"
key_capacity: 16
strategy: "least"
keys:
  - "conn-a"
  - "conn-b"
exclude_source_on_auto_transform: false
"#;

    let filename = "test_keyed_yaml_1.yaml";
    fs::write(filename, yaml_content).unwrap();

    let config = Config::from_file("test_keyed_yaml_1").unwrap();

    assert_eq!(config.key_capacity, 16);
    assert_eq!(config.strategy, StrategyKind::Least);
    assert_eq!(config.keys, vec!["conn-a".to_string(), "conn-b".to_string()]);
    assert!(!config.exclude_source_on_auto_transform);

    // Cleanup
    fs::remove_file(filename).unwrap();
}

#[test]
fn test_load_config_from_toml() {
    let toml_content = r#"
key_capacity = 12
strategy = "round_robin"
keys = ["shard-1", "shard-2", "shard-3"]
"#;

    let filename = "test_keyed_toml_2.toml";
    fs::write(filename, toml_content).unwrap();

    let config = Config::from_file("test_keyed_toml_2").unwrap();

    assert_eq!(config.key_capacity, 12);
    assert_eq!(config.strategy, StrategyKind::RoundRobin);
    assert_eq!(config.keys.len(), 3);
    // missing fields fall back to defaults
    assert!(config.exclude_source_on_auto_transform);

    // Cleanup
    fs::remove_file(filename).unwrap();
}

#[test]
fn test_config_validation_fails_for_zero_capacity() {
    let yaml_content = r#"
key_capacity: 0
strategy: "least"
"#;

    let filename = "test_keyed_invalid_3.yaml";
    fs::write(filename, yaml_content).unwrap();

    let result = Config::from_file("test_keyed_invalid_3");
    assert!(result.is_err());

    // Cleanup
    fs::remove_file(filename).unwrap();
}

#[test]
fn test_config_fails_for_unknown_strategy() {
    let yaml_content = r#"
key_capacity: 4
strategy: "weighted"
"#;

    let filename = "test_keyed_invalid_4.yaml";
    fs::write(filename, yaml_content).unwrap();

    let result = Config::from_file("test_keyed_invalid_4");
    assert!(result.is_err());

    // Cleanup
    fs::remove_file(filename).unwrap();
}

#[test]
fn test_load_config_from_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("KEYED_QUEUE_KEY_CAPACITY", "20");
    env::set_var("KEYED_QUEUE_STRATEGY", "least");
    env::set_var("KEYED_QUEUE_KEYS", "a, b ,c,");
    env::set_var("KEYED_QUEUE_EXCLUDE_SOURCE", "false");

    let config = Config::from_env().unwrap();

    assert_eq!(config.key_capacity, 20);
    assert_eq!(config.strategy, StrategyKind::Least);
    assert_eq!(
        config.keys,
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    assert!(!config.exclude_source_on_auto_transform);

    clear_env();
}

#[test]
fn test_load_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    let config = Config::load().unwrap();

    assert_eq!(config.key_capacity, 100);
    assert_eq!(config.strategy, StrategyKind::RoundRobin);
    assert!(config.keys.is_empty());
}

#[test]
fn test_env_var_points_to_config_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    let yaml_content = r#"
key_capacity: 8
keys: ["only"]
"#;

    let filename = "test_keyed_override_5.yaml";
    fs::write(filename, yaml_content).unwrap();

    env::set_var("KEYED_QUEUE_CONFIG", "test_keyed_override_5");

    let config = Config::load().unwrap();
    assert_eq!(config.key_capacity, 8);
    assert_eq!(config.keys, vec!["only".to_string()]);

    // Cleanup
    clear_env();
    fs::remove_file(filename).unwrap();
}

#[test]
fn test_invalid_strategy_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("KEYED_QUEUE_STRATEGY", "random");

    let result = Config::from_env();
    assert!(result.is_err());
    // load surfaces the error instead of silently using defaults
    assert!(Config::load().is_err());

    clear_env();
}

#[test]
fn test_duplicate_keys_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("KEYED_QUEUE_KEYS", "a,b,a");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_partial_env_vars() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("KEYED_QUEUE_KEY_CAPACITY", "6");

    let config = Config::from_env().unwrap();

    assert_eq!(config.key_capacity, 6);
    assert_eq!(config.strategy, StrategyKind::RoundRobin);
    assert!(config.keys.is_empty());

    clear_env();
}
