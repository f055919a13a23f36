use keyed_task_queue::config::{Config, DEFAULT_KEY_CAPACITY};
use keyed_task_queue::queue::{Assignment, KeyedQueue};
use keyed_task_queue::strategy::StrategyKind;
use keyed_task_queue::QueueManager;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.key_capacity, DEFAULT_KEY_CAPACITY);
    assert_eq!(config.strategy, StrategyKind::RoundRobin);
    assert!(config.keys.is_empty());
    assert!(config.exclude_source_on_auto_transform);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.key_capacity = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.keys = vec!["a".to_string(), "b".to_string(), "a".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_custom_config() {
    let config = Config::new(8);
    assert_eq!(config.key_capacity, 8);
}

#[tokio::test]
async fn test_manager_from_config() {
    let mut config = Config::new(1);
    config.strategy = StrategyKind::Least;
    config.keys = vec!["x".to_string(), "y".to_string()];

    let manager = QueueManager::<u32, String>::from_config(&config).unwrap();
    assert_eq!(manager.capacity(), 1);
    assert_eq!(manager.strategy_name(), "least");
    assert_eq!(manager.keys().await, vec!["x".to_string(), "y".to_string()]);

    assert_eq!(manager.insert(1).await.unwrap(), Assignment::Key("x".to_string()));
    assert_eq!(manager.insert(2).await.unwrap(), Assignment::Key("y".to_string()));
    assert_eq!(manager.insert(3).await.unwrap(), Assignment::Global { position: 0 });
}

#[test]
fn test_manager_from_invalid_config() {
    let config = Config::new(0);
    assert!(QueueManager::<u32, String>::from_config(&config).is_err());
}
