//! EqualityGate - a comparison-gated memoization cell.
//!
//! Sits between a computed value and its consumer: if the injected
//! comparison says the freshly computed value equals the cached one, the
//! cached value is returned unchanged, preserving identity for `Arc`-shaped
//! values so upstream reference checks keep short-circuiting.
//!
//! The gate is comparison-agnostic - callers choose pointer, shallow, or
//! deep equality to match their data shape. One gate belongs to exactly one
//! selector/consumer pairing; sharing a gate across unrelated selectors
//! breaks the invariant that the cached value is "the last value this
//! selector produced".

type CompareFn<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Memoization cell gated by an injected equality function.
///
/// # Example
///
/// ```
/// use strand_core::EqualityGate;
/// use std::sync::Arc;
///
/// let mut gate = EqualityGate::new(|a: &Arc<Vec<u32>>, b: &Arc<Vec<u32>>| a == b);
///
/// let first = gate.compute(Arc::new(vec![1, 2]));
/// // Content-equal but freshly allocated: the gate hands back the cached Arc.
/// let second = gate.compute(Arc::new(vec![1, 2]));
/// assert!(Arc::ptr_eq(&first, &second));
///
/// // A genuinely new value is adopted.
/// let third = gate.compute(Arc::new(vec![3]));
/// assert!(!Arc::ptr_eq(&first, &third));
/// ```
pub struct EqualityGate<T> {
    previous: Option<T>,
    compare: CompareFn<T>,
}

impl<T: Clone> EqualityGate<T> {
    /// Create a gate with no cached value.
    pub fn new(compare: impl Fn(&T, &T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            previous: None,
            compare: Box::new(compare),
        }
    }

    /// Run `next` through the gate.
    ///
    /// The first call adopts `next` unconditionally. Afterwards, if
    /// `compare(previous, next)` holds the cached value is returned (same
    /// identity); otherwise `next` is adopted, cached, and returned.
    ///
    /// A panic in the comparison propagates to the caller; the cached value
    /// is left untouched in that case.
    pub fn compute(&mut self, next: T) -> T {
        match &self.previous {
            Some(previous) if (self.compare)(previous, &next) => previous.clone(),
            _ => {
                self.previous = Some(next.clone());
                next
            }
        }
    }

    /// The cached value, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    /// Forget the cached value; the next `compute` adopts unconditionally.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for EqualityGate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EqualityGate")
            .field("previous", &self.previous)
            .finish()
    }
}
