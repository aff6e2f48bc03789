//! Store - reducer dispatch over an Arc-swapped state cell.

// Allow expect on lock access - poisoning from a panicked writer is
// unrecoverable here, so expect() is the appropriate handling pattern.
#![allow(clippy::expect_used)]

use std::sync::{Arc, RwLock};

use strand_core::{Observer, SharedListener, Source, Subscription};

type Reducer<S, A> = Box<dyn Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync>;

struct StoreInner<S, A> {
    state: RwLock<Arc<S>>,
    reducer: Reducer<S, A>,
    observer: Observer,
}

/// Reducer-dispatch state container.
///
/// The state is an immutable `Arc<S>` owned exclusively by the store and
/// replaced wholesale on update; readers that captured a previous snapshot
/// keep a stable, internally consistent value. The reducer is a pure
/// function supplied at construction: return the input `Arc` to signal "no
/// change" (no notification), or a new `Arc` to swap and notify.
///
/// `Store` is a cheap handle over shared interior state; clones dispatch
/// into the same cell.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use strand_store::Store;
///
/// enum Action {
///     Increment,
///     Nothing,
/// }
///
/// let store = Store::new(0u32, |state: &Arc<u32>, action: &Action| match action {
///     Action::Increment => Arc::new(**state + 1),
///     // Same Arc back: no swap, no notification.
///     Action::Nothing => state.clone(),
/// });
///
/// store.dispatch(Action::Increment);
/// assert_eq!(*store.state(), 1);
/// ```
pub struct Store<S, A> {
    inner: Arc<StoreInner<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
{
    /// Create a store with an initial state and a pure reducer.
    pub fn new<R>(initial: S, reducer: R) -> Self
    where
        R: Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(Arc::new(initial)),
                reducer: Box::new(reducer),
                observer: Observer::new(),
            }),
        }
    }

    /// The current state snapshot.
    #[must_use]
    pub fn state(&self) -> Arc<S> {
        self.inner.state.read().expect("Store lock poisoned").clone()
    }

    /// Run the reducer and, if it produced a new `Arc`, swap the state and
    /// notify subscribers - all synchronously, before `dispatch` returns.
    ///
    /// The write lock is released before listeners run, so a listener may
    /// dispatch again; that nested dispatch is a fresh synchronous cycle
    /// with its own notification pass. A panic in the reducer or in a
    /// listener propagates to this caller - nothing is caught.
    pub fn dispatch(&self, action: A) {
        let swapped = {
            let mut state = self.inner.state.write().expect("Store lock poisoned");
            let next = (self.inner.reducer)(&state, &action);
            if Arc::ptr_eq(&next, &state) {
                false
            } else {
                *state = next;
                true
            }
        };

        if swapped {
            tracing::debug!("store state swapped, notifying subscribers");
            self.inner.observer.notify();
        } else {
            tracing::trace!("reducer returned current state, skipping notify");
        }
    }

    /// Register a change listener. The returned [`Subscription`] removes
    /// exactly this registration and is idempotent.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.observer.subscribe(listener)
    }
}

impl<S, A> Source for Store<S, A>
where
    S: Send + Sync + 'static,
{
    type Snapshot = Arc<S>;

    fn snapshot(&self) -> Arc<S> {
        self.state()
    }

    fn subscribe_listener(&self, listener: SharedListener) -> Subscription {
        self.inner.observer.subscribe_shared(listener)
    }
}

impl<S, A> std::fmt::Debug for Store<S, A>
where
    S: std::fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("state", &self.state()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum CounterAction {
        Increment,
        Add(u32),
        Noop,
    }

    fn counter_store() -> Store<u32, CounterAction> {
        Store::new(0u32, |state: &Arc<u32>, action: &CounterAction| {
            match action {
                CounterAction::Increment => Arc::new(**state + 1),
                CounterAction::Add(n) => Arc::new(**state + n),
                CounterAction::Noop => state.clone(),
            }
        })
    }

    #[test]
    fn test_dispatch_swaps_state_and_notifies() {
        let store = counter_store();
        let hits = Arc::new(AtomicUsize::new(0));

        {
            let hits = hits.clone();
            store.subscribe(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        store.dispatch(CounterAction::Increment);
        assert_eq!(*store.state(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        store.dispatch(CounterAction::Add(4));
        assert_eq!(*store.state(), 5);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_same_arc_back_means_no_notification() {
        let store = counter_store();
        let hits = Arc::new(AtomicUsize::new(0));

        {
            let hits = hits.clone();
            store.subscribe(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        let before = store.state();
        store.dispatch(CounterAction::Noop);
        store.dispatch(CounterAction::Noop);
        let after = store.state();

        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_two_subscribers_observe_identical_snapshots() {
        let store = counter_store();

        let seen_a: Arc<std::sync::Mutex<Vec<Arc<u32>>>> = Arc::default();
        let seen_b: Arc<std::sync::Mutex<Vec<Arc<u32>>>> = Arc::default();

        {
            let store = store.clone();
            let seen = seen_a.clone();
            store.clone().subscribe(move || {
                seen.lock().unwrap().push(store.state());
            });
        }
        {
            let store = store.clone();
            let seen = seen_b.clone();
            store.clone().subscribe(move || {
                seen.lock().unwrap().push(store.state());
            });
        }

        store.dispatch(CounterAction::Add(7));

        let a = seen_a.lock().unwrap();
        let b = seen_b.lock().unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert!(Arc::ptr_eq(&a[0], &b[0]));
        assert_eq!(*a[0], 7);
    }

    #[test]
    fn test_reentrant_dispatch_from_listener() {
        let store = counter_store();

        // On the first change, dispatch once more from inside the listener.
        {
            let store = store.clone();
            let fired = Arc::new(AtomicUsize::new(0));
            store.clone().subscribe(move || {
                if fired.fetch_add(1, Ordering::SeqCst) == 0 {
                    store.dispatch(CounterAction::Add(10));
                }
            });
        }

        store.dispatch(CounterAction::Increment);
        assert_eq!(*store.state(), 11);
    }

    #[test]
    fn test_unsubscribed_listener_stops_receiving() {
        let store = counter_store();
        let hits = Arc::new(AtomicUsize::new(0));

        let subscription = {
            let hits = hits.clone();
            store.subscribe(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        store.dispatch(CounterAction::Increment);
        subscription.unsubscribe();
        store.dispatch(CounterAction::Increment);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_captured_snapshot_is_stable_across_updates() {
        let store = counter_store();
        let before = store.state();

        store.dispatch(CounterAction::Add(100));

        assert_eq!(*before, 0);
        assert_eq!(*store.state(), 100);
    }
}
