//! Keyed Task Queue binary entry point

use keyed_task_queue::{Config, KeyedQueue, QueueManagerBuilder, Task, TaskPayload};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEMO_TASKS: usize = 12;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Keyed Task Queue");

    let mut config = Config::load()?;
    if config.keys.is_empty() {
        config.keys = (0..4).map(|i| format!("worker-{}", i)).collect();
    }
    config.validate()?;

    info!(
        "Initialized with {} keys, key capacity: {}, strategy: {}",
        config.keys.len(),
        config.key_capacity,
        config.strategy
    );

    let manager = QueueManagerBuilder::<Task, String>::from_config(&config)
        .after_push(|key: &String, task: &Task| {
            debug!(
                key = %key,
                task = %task.id,
                age_secs = task.age_seconds(),
                "Task pushed"
            );
        })
        .build()?;

    let mut tasks = Vec::with_capacity(DEMO_TASKS);
    for i in 0..DEMO_TASKS {
        let task = Task::new(TaskPayload::new(
            format!("task_type_{}", i % 3),
            serde_json::json!({ "seq": i }),
        ));
        let assignment = manager.insert(task.clone()).await?;
        info!("Task {} -> {:?}", task.id, assignment);
        tasks.push((assignment, task));
    }

    // Rebalance the first assigned task away from its key
    if let Some((from, task)) = tasks
        .iter()
        .find_map(|(assignment, task)| assignment.key().map(|key| (key.clone(), task)))
    {
        match manager.auto_transform_processing_data(&from, task).await {
            Ok(to) => info!("Rebalanced task {} from {} to {}", task.id, from, to),
            Err(e) => info!("Task {} stays on {}: {}", task.id, from, e),
        }
    }

    // Complete every task still held by a key, then let the overflow move in
    for key in manager.keys().await {
        for task in manager.processing_items(&key).await? {
            manager.delete(&key, &task).await?;
        }
    }
    let drained = manager.drain_global().await;
    info!("Moved {} tasks out of the global queue", drained.len());

    let mut lengths: Vec<_> = manager.processing_queue_lengths().await?.into_iter().collect();
    lengths.sort();
    for (key, len) in lengths {
        info!("{}: {} task(s)", key, len);
    }
    info!("Global queue: {} task(s)", manager.global_queue_len().await);

    Ok(())
}
