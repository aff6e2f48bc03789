//! Observer - the pub/sub primitive behind every strand source.
//!
//! An [`Observer`] holds a set of listener callbacks and invokes them
//! synchronously when [`notify`](Observer::notify) is called. It knows
//! nothing about payloads; listeners re-read whatever snapshot they care
//! about after being woken.
//!
//! # Notification Semantics
//!
//! - Listeners run in registration order, on the calling thread.
//! - `notify` iterates a snapshot of the registration list taken at entry,
//!   so a listener that subscribes or unsubscribes (itself or others)
//!   mid-pass changes delivery for the *next* pass only.
//! - A panicking listener is not caught: it unwinds out of `notify` after
//!   every earlier listener in the pass has already run. Swallowing would
//!   hide state-consistency bugs.

// Allow expect on lock access - poisoning from a panicked writer is
// unrecoverable here, so expect() is the appropriate handling pattern.
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// A shareable listener callback.
pub type SharedListener = Arc<dyn Fn() + Send + Sync>;

/// One registered listener. The id makes every `subscribe` call an
/// independent registration even for clones of the same callback.
struct Registration {
    id: u64,
    listener: SharedListener,
}

#[derive(Default)]
struct ObserverInner {
    listeners: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

/// Minimal pub/sub primitive.
///
/// `Observer` is a cheap handle over shared interior state; clones notify
/// the same listener set.
///
/// # Example
///
/// ```
/// use strand_core::Observer;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let observer = Observer::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counted = hits.clone();
/// let subscription = observer.subscribe(move || {
///     counted.fetch_add(1, Ordering::SeqCst);
/// });
///
/// observer.notify();
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
///
/// subscription.unsubscribe();
/// observer.notify();
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone, Default)]
pub struct Observer {
    inner: Arc<ObserverInner>,
}

impl Observer {
    /// Create an observer with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns a [`Subscription`] bound to exactly this
    /// registration.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Register an already-shared listener callback.
    ///
    /// Each call produces an independent registration: subscribing the same
    /// `Arc` twice yields two deliveries per notify and two handles that
    /// remove only themselves.
    pub fn subscribe_shared(&self, listener: SharedListener) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .expect("Observer lock poisoned")
            .push(Registration { id, listener });

        Subscription {
            source: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Invoke every currently-registered listener, in registration order.
    ///
    /// The listener list is snapshotted at entry: registrations and removals
    /// performed by listeners during this pass take effect from the next
    /// pass. The listener-set lock is not held while callbacks run, so
    /// listeners may freely subscribe, unsubscribe, or trigger nested
    /// notifications.
    pub fn notify(&self) {
        let snapshot: Vec<SharedListener> = {
            let listeners = self
                .inner
                .listeners
                .read()
                .expect("Observer lock poisoned");
            listeners.iter().map(|r| r.listener.clone()).collect()
        };

        tracing::trace!(listeners = snapshot.len(), "observer notify");

        for listener in snapshot {
            listener();
        }
    }

    /// Number of currently-registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .expect("Observer lock poisoned")
            .len()
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle to one listener registration.
///
/// `unsubscribe` removes exactly the registration this handle was returned
/// for and is idempotent: calling it twice, or after the observer is gone,
/// is a no-op. Dropping the handle does *not* unsubscribe - the handle is
/// the removal path, not a scope guard.
#[derive(Clone)]
pub struct Subscription {
    source: Weak<ObserverInner>,
    id: u64,
}

impl Subscription {
    /// Remove this registration. No-op if already removed or if the
    /// observer has been dropped.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.source.upgrade() {
            inner
                .listeners
                .write()
                .expect("Observer lock poisoned")
                .retain(|r| r.id != self.id);
        }
    }

    /// Whether this registration is still present.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self.source.upgrade() {
            Some(inner) => inner
                .listeners
                .read()
                .expect("Observer lock poisoned")
                .iter()
                .any(|r| r.id == self.id),
            None => false,
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
