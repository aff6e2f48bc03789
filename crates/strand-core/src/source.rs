//! Source - the subscribe/snapshot contract, and Derived selector views.
//!
//! [`Source`] is the surface UI adapters consume: register a listener for
//! change notification, then re-read a synchronous snapshot. The contract
//! requires snapshots to be reference-stable when nothing relevant changed;
//! [`Derived`] supplies that stability for selected sub-values by routing
//! every read through one [`EqualityGate`].

// Allow expect on lock access - poisoning from a panicked writer is
// unrecoverable here, so expect() is the appropriate handling pattern.
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use crate::gate::EqualityGate;
use crate::observer::{SharedListener, Subscription};

/// A subscribable state source with synchronous snapshots.
///
/// Implementors swap their state wholesale (never mutate in place), so a
/// snapshot captured before an update stays internally consistent forever.
pub trait Source {
    /// The snapshot type handed to consumers.
    type Snapshot;

    /// Read the current snapshot. Synchronous and side-effect-free; returns
    /// a value identical to the prior call's result if nothing relevant
    /// changed.
    fn snapshot(&self) -> Self::Snapshot;

    /// Register a change listener. The returned [`Subscription`] removes
    /// exactly this registration.
    fn subscribe_listener(&self, listener: SharedListener) -> Subscription;
}

/// Convenience methods available on every [`Source`].
pub trait SourceExt: Source {
    /// Register a plain closure as a change listener.
    fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_listener(Arc::new(listener))
    }

    /// Bind a pure selector to this source through a fresh [`EqualityGate`].
    ///
    /// Each call builds an independent gate; every consumer should hold its
    /// own `Derived` rather than share one across unrelated read sites.
    fn select<T, F, C>(&self, select: F, compare: C) -> Derived<Self, T>
    where
        Self: Clone + Sized,
        T: Clone,
        F: Fn(&Self::Snapshot) -> T + Send + Sync + 'static,
        C: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Derived::new(self.clone(), select, compare)
    }
}

impl<S: Source> SourceExt for S {}

type SelectFn<S, T> = Box<dyn Fn(&<S as Source>::Snapshot) -> T + Send + Sync>;

struct DerivedInner<S: Source, T> {
    source: S,
    select: SelectFn<S, T>,
    gate: Mutex<EqualityGate<T>>,
}

/// A selector bound to a source through one equality gate.
///
/// `snapshot` runs the selector over the live source snapshot, then lets the
/// gate decide whether the publicly observed value actually changes. Clones
/// share the gate (they are the same consumer pairing); independent
/// consumers should each call [`SourceExt::select`].
///
/// # Example
///
/// ```
/// use strand_core::{Derived, Observer, SharedListener, Source, Subscription};
/// use std::sync::{Arc, RwLock};
///
/// #[derive(Clone)]
/// struct Cell {
///     value: Arc<RwLock<Arc<(u32, u32)>>>,
///     observer: Observer,
/// }
///
/// impl Source for Cell {
///     type Snapshot = Arc<(u32, u32)>;
///     fn snapshot(&self) -> Self::Snapshot {
///         self.value.read().unwrap().clone()
///     }
///     fn subscribe_listener(&self, listener: SharedListener) -> Subscription {
///         self.observer.subscribe_shared(listener)
///     }
/// }
///
/// let cell = Cell {
///     value: Arc::new(RwLock::new(Arc::new((1, 2)))),
///     observer: Observer::new(),
/// };
///
/// // Observe only the first element.
/// let first = Derived::new(cell.clone(), |pair: &Arc<(u32, u32)>| pair.0, |a, b| a == b);
/// assert_eq!(first.snapshot(), 1);
///
/// // A change to the second element leaves the derived value untouched.
/// *cell.value.write().unwrap() = Arc::new((1, 9));
/// assert_eq!(first.snapshot(), 1);
/// ```
pub struct Derived<S: Source, T> {
    inner: Arc<DerivedInner<S, T>>,
}

impl<S: Source, T> Clone for Derived<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Source, T: Clone> Derived<S, T> {
    /// Bind `select` to `source`, gated by `compare`.
    pub fn new<F, C>(source: S, select: F, compare: C) -> Self
    where
        F: Fn(&S::Snapshot) -> T + Send + Sync + 'static,
        C: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(DerivedInner {
                source,
                select: Box::new(select),
                gate: Mutex::new(EqualityGate::new(compare)),
            }),
        }
    }

    /// Run the selector over the live source snapshot and gate the result.
    ///
    /// A panic in the selector or the comparison propagates to the caller.
    pub fn snapshot(&self) -> T {
        let fresh = (self.inner.select)(&self.inner.source.snapshot());
        self.inner
            .gate
            .lock()
            .expect("Derived gate lock poisoned")
            .compute(fresh)
    }

    /// Register a change listener on the underlying source.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.source.subscribe_listener(Arc::new(listener))
    }

    /// The underlying source handle.
    pub fn source(&self) -> &S {
        &self.inner.source
    }
}

impl<S: Source, T: Clone> Source for Derived<S, T> {
    type Snapshot = T;

    fn snapshot(&self) -> T {
        Derived::snapshot(self)
    }

    fn subscribe_listener(&self, listener: SharedListener) -> Subscription {
        self.inner.source.subscribe_listener(listener)
    }
}
