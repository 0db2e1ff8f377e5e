//! In-flight request coalescing.
//!
//! Concurrent reads of the same remote resource share one outstanding
//! future. The first caller for a key decides what request is made; every
//! caller that arrives before it settles observes the same result. The
//! entry is removed when the future settles, so the next call after that
//! starts a fresh fetch.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::trace;

/// Future handed to every caller of [`Coalescer::coalesce`] for one key.
pub type SharedFuture<T> = Shared<BoxFuture<'static, T>>;

struct Pending<T: Clone> {
    /// Distinguishes this request from a later one under the same key,
    /// so a settling future never removes its successor.
    id: u64,
    future: SharedFuture<T>,
}

/// Table of in-flight requests keyed by logical resource.
///
/// At most one entry exists per key. The factory runs while the key's
/// shard is locked, before anything is inserted: a panicking factory
/// leaves the table untouched.
pub struct Coalescer<K, T: Clone> {
    pending: Arc<DashMap<K, Pending<T>>>,
    next_id: AtomicU64,
}

impl<K, T> Default for Coalescer<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> Coalescer<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Join the in-flight request for `key`, or start one with `factory`.
    pub fn coalesce<F, Fut>(&self, key: K, factory: F) -> SharedFuture<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        match self.pending.entry(key.clone()) {
            Entry::Occupied(entry) => {
                trace!("joining in-flight request");
                entry.get().future.clone()
            }
            Entry::Vacant(entry) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let request = factory();
                let pending = Arc::clone(&self.pending);

                let future = async move {
                    let output = request.await;
                    pending.remove_if(&key, |_, p| p.id == id);
                    output
                }
                .boxed()
                .shared();

                entry.insert(Pending {
                    id,
                    future: future.clone(),
                });
                future
            }
        }
    }

    /// Number of keys with a request in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        result: Result<u32, String>,
    ) -> impl Future<Output = Result<u32, String>> + Send + 'static {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            result
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let coalescer: Coalescer<&str, Result<u32, String>> = Coalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = coalescer.coalesce("bed status", || counting_fetch(&calls, Ok(1)));
        let b = coalescer.coalesce("bed status", || counting_fetch(&calls, Ok(2)));
        let c = coalescer.coalesce("bed status", || counting_fetch(&calls, Ok(3)));

        let (a, b, c) = tokio::join!(a, b, c);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(1));
        assert_eq!(c, Ok(1));
    }

    #[tokio::test(start_paused = true)]
    async fn waiters_observe_the_same_failure() {
        let coalescer: Coalescer<&str, Result<u32, String>> = Coalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = coalescer.coalesce("pump", || counting_fetch(&calls, Err("boom".into())));
        let b = coalescer.coalesce("pump", || counting_fetch(&calls, Ok(7)));

        let (a, b) = tokio::join!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, Err("boom".to_string()));
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_keys_do_not_share() {
        let coalescer: Coalescer<u8, Result<u32, String>> = Coalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = coalescer.coalesce(1, || counting_fetch(&calls, Ok(1)));
        let b = coalescer.coalesce(2, || counting_fetch(&calls, Ok(2)));
        assert_eq!(coalescer.in_flight(), 2);

        let (a, b) = tokio::join!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!((a, b), (Ok(1), Ok(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_cleared_after_success() {
        let coalescer: Coalescer<&str, Result<u32, String>> = Coalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = coalescer
            .coalesce("bed status", || counting_fetch(&calls, Ok(1)))
            .await;
        assert_eq!(first, Ok(1));
        assert!(!coalescer.is_pending(&"bed status"));

        let second = coalescer
            .coalesce("bed status", || counting_fetch(&calls, Ok(2)))
            .await;
        assert_eq!(second, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_cleared_after_failure() {
        let coalescer: Coalescer<&str, Result<u32, String>> = Coalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = coalescer
            .coalesce("foundation", || counting_fetch(&calls, Err("down".into())))
            .await;
        assert!(first.is_err());
        assert_eq!(coalescer.in_flight(), 0);

        let second = coalescer
            .coalesce("foundation", || counting_fetch(&calls, Ok(5)))
            .await;
        assert_eq!(second, Ok(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn late_joiner_resolves_with_first_request() {
        let coalescer: Coalescer<&str, u32> = Coalescer::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<u32>();

        let mut first = tokio_test::task::spawn(
            coalescer.coalesce("pause mode", move || async move { rx.await.unwrap_or(0) }),
        );
        tokio_test::assert_pending!(first.poll());

        let mut late = tokio_test::task::spawn(coalescer.coalesce("pause mode", || async { 99 }));
        tokio_test::assert_pending!(late.poll());

        tx.send(4).unwrap();
        assert_eq!(tokio_test::assert_ready!(late.poll()), 4);
        assert_eq!(tokio_test::assert_ready!(first.poll()), 4);
        assert!(!coalescer.is_pending(&"pause mode"));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_factory_does_not_poison_key() {
        let coalescer: Coalescer<&str, Result<u32, String>> = Coalescer::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let result = catch_unwind(AssertUnwindSafe(|| {
            coalescer.coalesce("bed status", || -> std::future::Ready<Result<u32, String>> {
                panic!("factory failed before producing a future")
            })
        }));
        assert!(result.is_err());
        assert!(!coalescer.is_pending(&"bed status"));

        let next = coalescer
            .coalesce("bed status", || counting_fetch(&calls, Ok(9)))
            .await;
        assert_eq!(next, Ok(9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
