use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Minimum query length accepted from an input box.
pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Entry gate for user input: only trimmed queries of at least `min_len`
/// characters trigger a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTrigger {
    min_len: usize,
}

impl Default for SearchTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_LEN)
    }
}

impl SearchTrigger {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// The trimmed query if it qualifies, `None` otherwise.
    pub fn accept(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        (trimmed.chars().count() >= self.min_len).then(|| trimmed.to_string())
    }
}

/// Trailing-edge debounce: only the last action scheduled within `delay`
/// runs. An action that already started is never interrupted.
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    last: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            last: Mutex::new(None),
        }
    }

    /// Schedule `action`, superseding any action still waiting out its delay.
    pub fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) == mine {
                action.await;
            }
        });
        *self.last.lock() = Some(handle);
    }

    /// Wait for the most recently scheduled action to finish (or be skipped).
    pub async fn settle(&self) {
        let pending = self.last.lock().take();
        if let Some(handle) = pending {
            let _ = handle.await;
        }
    }
}
