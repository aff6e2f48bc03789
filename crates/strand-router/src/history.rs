//! History drivers - the host's location/history facility as a dependency.
//!
//! The browser's history is globally shared mutable state; the router never
//! reaches for it ambiently. Instead it is handed a [`HistoryDriver`]:
//! read the current location, push an entry, and register a listener for
//! externally triggered navigation. A host embedding the router in a
//! browser implements this trait over the History API; tests and headless
//! hosts use [`MemoryHistory`].

// Allow expect on lock access - poisoning from a panicked writer is
// unrecoverable here, so expect() is the appropriate handling pattern.
#![allow(clippy::expect_used)]

use std::sync::{Arc, RwLock};

use strand_core::{Observer, SharedListener, Subscription};

/// Abstraction over a location/history facility.
///
/// Semantics mirror the browser contract: `push` adds an entry without
/// firing navigation listeners (the router resolves its own pushes), while
/// back/forward-style moves fire every registered listener - the
/// `popstate` analogue.
pub trait HistoryDriver: Send + Sync {
    /// The current location: path plus optional `?query` and `#fragment`.
    fn location(&self) -> String;

    /// Append a new history entry and move to it. Does not fire navigation
    /// listeners.
    fn push(&self, url: &str);

    /// Register a listener fired on externally triggered navigation.
    fn on_navigate(&self, listener: SharedListener) -> Subscription;
}

struct HistoryStack {
    entries: Vec<String>,
    cursor: usize,
}

struct MemoryHistoryInner {
    stack: RwLock<HistoryStack>,
    observer: Observer,
}

/// In-process entry-stack history driver.
///
/// Holds the full entry list and a cursor. `push` truncates any forward
/// entries (as the browser does), `back`/`forward` move the cursor and fire
/// navigation listeners.
///
/// # Example
///
/// ```
/// use strand_router::{HistoryDriver, MemoryHistory};
///
/// let history = MemoryHistory::new("/");
/// history.push("/users/7");
/// assert_eq!(history.location(), "/users/7");
///
/// assert!(history.back());
/// assert_eq!(history.location(), "/");
///
/// assert!(history.forward());
/// assert_eq!(history.location(), "/users/7");
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<MemoryHistoryInner>,
}

impl MemoryHistory {
    /// Create a history whose single entry is `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MemoryHistoryInner {
                stack: RwLock::new(HistoryStack {
                    entries: vec![initial.into()],
                    cursor: 0,
                }),
                observer: Observer::new(),
            }),
        }
    }

    /// Move one entry back, firing navigation listeners. Returns `false`
    /// (and stays put) when already at the oldest entry.
    pub fn back(&self) -> bool {
        let moved = {
            let mut stack = self.inner.stack.write().expect("MemoryHistory lock poisoned");
            if stack.cursor > 0 {
                stack.cursor -= 1;
                true
            } else {
                false
            }
        };
        if moved {
            self.inner.observer.notify();
        }
        moved
    }

    /// Move one entry forward, firing navigation listeners. Returns `false`
    /// (and stays put) when already at the newest entry.
    pub fn forward(&self) -> bool {
        let moved = {
            let mut stack = self.inner.stack.write().expect("MemoryHistory lock poisoned");
            if stack.cursor + 1 < stack.entries.len() {
                stack.cursor += 1;
                true
            } else {
                false
            }
        };
        if moved {
            self.inner.observer.notify();
        }
        moved
    }

    /// Whether a `back` move is possible.
    #[must_use]
    pub fn can_back(&self) -> bool {
        self.inner
            .stack
            .read()
            .expect("MemoryHistory lock poisoned")
            .cursor
            > 0
    }

    /// Whether a `forward` move is possible.
    #[must_use]
    pub fn can_forward(&self) -> bool {
        let stack = self.inner.stack.read().expect("MemoryHistory lock poisoned");
        stack.cursor + 1 < stack.entries.len()
    }

    /// Total number of entries, including those behind and ahead of the
    /// cursor.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.inner
            .stack
            .read()
            .expect("MemoryHistory lock poisoned")
            .entries
            .len()
    }
}

impl HistoryDriver for MemoryHistory {
    fn location(&self) -> String {
        let stack = self.inner.stack.read().expect("MemoryHistory lock poisoned");
        stack.entries[stack.cursor].clone()
    }

    fn push(&self, url: &str) {
        let mut stack = self.inner.stack.write().expect("MemoryHistory lock poisoned");
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(url.to_string());
        stack.cursor = stack.entries.len() - 1;
        // pushState parity: no listener fire; the pusher resolves itself.
    }

    fn on_navigate(&self, listener: SharedListener) -> Subscription {
        self.inner.observer.subscribe_shared(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_push_moves_to_new_entry() {
        let history = MemoryHistory::new("/");
        history.push("/a");
        history.push("/a/b");

        assert_eq!(history.location(), "/a/b");
        assert_eq!(history.entry_count(), 3);
        assert!(history.can_back());
        assert!(!history.can_forward());
    }

    #[test]
    fn test_back_and_forward_walk_the_stack() {
        let history = MemoryHistory::new("/");
        history.push("/a");
        history.push("/b");

        assert!(history.back());
        assert_eq!(history.location(), "/a");
        assert!(history.back());
        assert_eq!(history.location(), "/");
        assert!(!history.back());

        assert!(history.forward());
        assert_eq!(history.location(), "/a");
        assert!(history.forward());
        assert_eq!(history.location(), "/b");
        assert!(!history.forward());
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = MemoryHistory::new("/");
        history.push("/a");
        history.push("/b");
        history.back();

        history.push("/c");
        assert_eq!(history.location(), "/c");
        assert!(!history.can_forward());
        assert_eq!(history.entry_count(), 3); // "/", "/a", "/c"
    }

    #[test]
    fn test_navigation_listeners_fire_on_moves_not_pushes() {
        let history = MemoryHistory::new("/");
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let fired = fired.clone();
            history.on_navigate(Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }));
        }

        history.push("/a");
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        history.back();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        history.forward();
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        // Failed moves do not fire.
        history.forward();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
