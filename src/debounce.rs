//! Per-key trailing debounce on the tokio runtime.
//!
//! Every `schedule` call re-arms the timer for its key: the previously pending
//! task is aborted and a fresh one sleeps for the full quiet period before
//! running. A burst of edits to one document therefore yields a single run.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct Debouncer {
    delay: Duration,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once `key` has been quiet for the configured delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|_, pending| !pending.is_finished());
        if let Some(previous) = tasks.insert(key.to_string(), handle) {
            previous.abort();
            debug!(key, "Re-armed debounce timer");
        }
    }

    /// Abort the pending task for `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &str) -> bool {
        match self.tasks.lock().remove(key) {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    /// Number of keys whose task has not yet completed.
    pub fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock();
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.len()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.get_mut().drain() {
            handle.abort();
        }
    }
}
