use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::{sync::Mutex, task::JoinHandle};

struct Scheduled {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Delays work until a key has been quiet for `delay`
///
/// Scheduling a key that already has a pending task aborts the earlier task
/// and starts the timer over, so only the last trigger in a burst runs. A task
/// drops its own entry when its timer fires.
#[derive(Clone)]
pub struct Debouncer<K> {
    delay: Duration,
    pending: Arc<Mutex<HashMap<K, Scheduled>>>,
    generations: Arc<AtomicU64>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Runs `task` after the delay unless `key` is scheduled again first
    pub async fn schedule<F, Fut>(&self, key: K, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.pending);
        let fired_key = key.clone();

        // Held across the spawn so the entry is in place before the task can look for it
        let mut pending = self.pending.lock().await;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = registry.lock().await;
                if pending
                    .get(&fired_key)
                    .is_some_and(|scheduled| scheduled.generation == generation)
                {
                    pending.remove(&fired_key);
                }
            }
            task().await;
        });

        if let Some(previous) = pending.insert(key, Scheduled { generation, handle }) {
            tracing::trace!("Superseded pending debounced task");
            previous.handle.abort();
        }
    }

    /// Cancels the pending task for `key`, returning whether one was still waiting
    pub async fn cancel(&self, key: &K) -> bool {
        match self.pending.lock().await.remove(key) {
            Some(scheduled) => {
                scheduled.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of tasks that have not fired yet
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }
}
