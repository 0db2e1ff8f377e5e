//! Trailing-edge write debouncing.
//!
//! A [`Debouncer`] wraps one write target (a side's sleep number, one
//! actuator). Each [`push`](Debouncer::push) supersedes the pending value;
//! the action runs with the latest value once `delay` passes with no
//! further pushes. Superseded values are dropped, never sent.
//!
//! ```text
//!  push(a)   push(b)        push(c)
//!    │─────────│──────────────│──────── delay ────────► action(c)
//!    └ cancelled └ cancelled
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

type Action<T> = Arc<dyn Fn(T) -> BoxFuture<'static, ()> + Send + Sync>;

/// Debounced, fire-and-forget write for a single target.
///
/// Must be created inside a tokio runtime: each push spawns a timer task.
pub struct Debouncer<T> {
    delay: Duration,
    action: Action<T>,
    pending: Mutex<Option<CancellationToken>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            action: Arc::new(move |value| action(value).boxed()),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value with `value` and restart the timer.
    pub fn push(&self, value: T) {
        let token = CancellationToken::new();
        if let Some(previous) = self
            .pending
            .lock()
            .expect("debounce lock poisoned")
            .replace(token.clone())
        {
            trace!("superseding pending write");
            previous.cancel();
        }

        // The window starts now, not when the task is first polled.
        let deadline = Instant::now() + self.delay;
        let action = Arc::clone(&self.action);
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => action(value).await,
            }
        });
    }

    /// Drop the pending value, if any, without sending it.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().expect("debounce lock poisoned").take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use tokio::time;

    use super::*;

    fn recorder() -> (Arc<StdMutex<Vec<u32>>>, Debouncer<u32>) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&sent);
        let debouncer = Debouncer::new(Duration::from_secs(2), move |value| {
            let sink = Arc::clone(&sink);
            async move { sink.lock().unwrap().push(value) }
        });
        (sent, debouncer)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_sends_only_last_value() {
        let (sent, debouncer) = recorder();

        for value in [10, 20, 30, 40] {
            debouncer.push(value);
            time::advance(Duration::from_millis(500)).await;
        }
        assert!(sent.lock().unwrap().is_empty());

        time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(*sent.lock().unwrap(), vec![40]);
    }

    #[tokio::test(start_paused = true)]
    async fn not_sent_before_delay() {
        let (sent, debouncer) = recorder();

        debouncer.push(5);
        time::advance(Duration::from_millis(1999)).await;
        tokio::task::yield_now().await;
        assert!(sent.lock().unwrap().is_empty());

        time::advance(Duration::from_millis(1)).await;
        tokio::task::yield_now().await;
        assert_eq!(*sent.lock().unwrap(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_windows_send_separately() {
        let (sent, debouncer) = recorder();

        debouncer.push(1);
        time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;
        debouncer.push(2);
        time::advance(Duration::from_secs(3)).await;
        tokio::task::yield_now().await;

        assert_eq!(*sent.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn window_starts_at_push_even_if_task_runs_late() {
        let (sent, debouncer) = recorder();

        debouncer.push(7);
        // The timer task is first polled after the whole window has passed.
        time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        debouncer.push(8);
        tokio::task::yield_now().await;
        time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        assert_eq!(*sent.lock().unwrap(), vec![7, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_value() {
        let (sent, debouncer) = recorder();

        debouncer.push(1);
        debouncer.cancel();
        time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;

        assert!(sent.lock().unwrap().is_empty());
    }
}
