//! # Debouncer
//!
//! Single-slot cancellable delay. Each [`Debouncer::schedule`] cancels the
//! pending delay and starts a new one, so only the latest value ever fires.
//!
//! ```text
//!   input:   h ──40ms── ho ──60ms── hoo ─────────300ms─────────► fire("hoo")
//!            │          │           │
//!   slot:    [h] abort  [ho] abort  [hoo] ──────────────────────► sent
//! ```
//!
//! A timer can fire in the same instant it is cancelled: the value is then
//! already in the channel. Every fired value carries the generation it was
//! scheduled under and [`Debouncer::accept`] drops anything older than the
//! latest schedule or cancel.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// A value whose delay elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub generation: u64,
    pub value: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<Fired<T>>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Creates the debouncer and the receiver its values fire into.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<Fired<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer {
            delay,
            tx,
            pending: None,
            generation: 0,
        };
        (debouncer, rx)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces whatever is pending with `value`. Returns its generation.
    pub fn schedule(&mut self, value: T) -> u64 {
        self.cancel();

        let generation = self.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Fired { generation, value });
        }));

        trace!(generation, "Debounce scheduled");
        generation
    }

    /// Drops the pending value, if any. Values already fired become stale.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Whether a delay is running.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Unwraps a fired value if it is still the latest one.
    pub fn accept(&mut self, fired: Fired<T>) -> Option<T> {
        if fired.generation != self.generation {
            trace!(fired = fired.generation, current = self.generation, "Stale debounce dropped");
            return None;
        }
        self.pending = None;
        Some(fired.value)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_fires() {
        let (mut debouncer, mut rx) = Debouncer::new(DELAY);
        let start = Instant::now();

        debouncer.schedule("h");
        sleep(Duration::from_millis(40)).await;
        debouncer.schedule("ho");
        sleep(Duration::from_millis(60)).await;
        debouncer.schedule("hoo");

        let fired = rx.recv().await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(400));
        assert_eq!(debouncer.accept(fired), Some("hoo"));

        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (mut debouncer, mut rx) = Debouncer::new(DELAY);
        debouncer.schedule(1);
        assert!(debouncer.is_pending());

        debouncer.cancel();
        assert!(!debouncer.is_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_then_cancelled_is_stale() {
        let (mut debouncer, mut rx) = Debouncer::new(DELAY);
        debouncer.schedule("old");
        sleep(DELAY * 2).await;

        // fired, but not yet consumed when the input changed
        debouncer.cancel();
        let fired = rx.recv().await.unwrap();
        assert_eq!(debouncer.accept(fired), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_still_goes_through_channel() {
        let (mut debouncer, mut rx) = Debouncer::new(Duration::ZERO);
        let generation = debouncer.schedule("now");
        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.generation, generation);
        assert_eq!(debouncer.accept(fired), Some("now"));
    }
}
