//! Cancellable debounce with last-write-wins delivery
//!
//! Each `schedule` call supersedes the previous one: the pending timer task is
//! aborted and its generation retired, so a slow computation that finishes
//! after a newer input never reaches the receiver. Dropping the debouncer
//! cancels whatever is pending.
//!
//! The generation check and the send happen under the same lock that
//! `schedule` and `cancel` take, so a result retired by either is never sent.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// A computation result tagged with the generation that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounced<T> {
    pub generation: u64,
    pub value: T,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

pub struct Debouncer<T> {
    delay: Duration,
    slot: Arc<Mutex<Slot>>,
    results: mpsc::UnboundedSender<Debounced<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer and the receiver its results are delivered on
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<Debounced<T>>) {
        let (results, receiver) = mpsc::unbounded_channel();
        (Self::with_sender(delay, results), receiver)
    }

    /// Deliver into an existing channel
    ///
    /// Debouncers sharing one sender deliver in send order across all of them.
    pub fn with_sender(delay: Duration, results: mpsc::UnboundedSender<Debounced<T>>) -> Self {
        Self {
            delay,
            slot: Arc::new(Mutex::new(Slot::default())),
            results,
        }
    }

    /// Run `computation` after the quiet period unless superseded first
    ///
    /// Returns the generation assigned to this computation.
    pub fn schedule<F>(&self, computation: F) -> u64
    where
        F: Future<Output = T> + Send + 'static,
    {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        let generation = slot.generation;

        let shared = self.slot.clone();
        let results = self.results.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if shared.lock().generation != generation {
                return;
            }

            let value = computation.await;
            let slot = shared.lock();
            if slot.generation != generation {
                debug!("Discarding stale debounced result (generation {})", generation);
                return;
            }
            // Receiver gone means the consumer was torn down
            let _ = results.send(Debounced { generation, value });
        });

        if let Some(previous) = slot.pending.replace(handle) {
            previous.abort();
        }
        generation
    }
}

impl<T> Debouncer<T> {
    /// Retire the pending computation, if any
    pub fn cancel(&self) {
        let mut slot = self.slot.lock();
        slot.generation += 1;
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.slot.lock().generation
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::mpsc::error::TryRecvError;

    #[tokio::test(start_paused = true)]
    async fn test_rapid_inputs_deliver_only_the_last() {
        let (debouncer, mut results) = Debouncer::new(Duration::from_millis(300));
        let runs = Arc::new(AtomicU32::new(0));

        for value in 1..=3u32 {
            let runs = runs.clone();
            debouncer.schedule(async move {
                runs.fetch_add(1, Ordering::SeqCst);
                value * 10
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let delivered = results.recv().await.unwrap();
        assert_eq!(delivered.value, 30);
        assert_eq!(delivered.generation, 3);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(matches!(results.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_superseded_computation_is_discarded() {
        let (debouncer, mut results) = Debouncer::new(Duration::from_millis(50));

        debouncer.schedule(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "stale"
        });
        // Let the first timer fire so its computation is in flight
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(async { "fresh" });

        let delivered = results.recv().await.unwrap();
        assert_eq!(delivered.value, "fresh");

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(matches!(results.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_pending_result() {
        let (debouncer, mut results) = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule(async { 1u8 });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(matches!(results.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_tears_down_pending_work() {
        let (debouncer, mut results) = Debouncer::new(Duration::from_millis(300));
        debouncer.schedule(async { 1u8 });
        drop(debouncer);

        // All senders are gone once the aborted task is reaped
        assert_eq!(results.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_sender_delivers_in_send_order() {
        let (sender, mut results) = mpsc::unbounded_channel();
        let first = Debouncer::with_sender(Duration::from_millis(300), sender.clone());
        let second = Debouncer::with_sender(Duration::from_millis(100), sender);

        first.schedule(async { "first" });
        second.schedule(async { "second" });

        assert_eq!(results.recv().await.unwrap().value, "second");
        assert_eq!(results.recv().await.unwrap().value, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_advances_generation() {
        let (debouncer, _results) = Debouncer::<u8>::new(Duration::from_millis(300));
        assert_eq!(debouncer.schedule(async { 1 }), 1);
        debouncer.cancel();
        assert_eq!(debouncer.current_generation(), 2);
        assert_eq!(debouncer.schedule(async { 2 }), 3);
    }
}
