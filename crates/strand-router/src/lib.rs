//! Strand Router - URL Matching and History Synchronization
//!
//! A client-side URL router on the strand subscription contract:
//!
//! - [`RoutePattern`]: `/`-delimited path templates (`/users/:id`) parsed
//!   once at registration into tagged literal/parameter segments.
//! - [`Router`]: registration-ordered route table, specificity-then-recency
//!   match resolution, atomic [`RouterState`] snapshots, and change
//!   notification through an [`Observer`](strand_core::Observer).
//! - [`HistoryDriver`]: the host's location/history facility as an injected
//!   dependency, never an ambient global - [`MemoryHistory`] is the
//!   in-process driver used by tests and headless hosts.
//!
//! # Data Flow
//!
//! ```text
//! push(url) ──────────────┐
//!                         ├─> resolve(location) -> swap Arc<RouterState> -> notify
//! back/forward (driver) ──┘
//! ```
//!
//! Programmatic navigation and externally triggered navigation converge on
//! the same resolution path, so the same URL always yields the same
//! `RouterState`. A URL no pattern matches resolves to the "not found"
//! state - a value, not an error.

#![forbid(unsafe_code)]

pub mod history;
pub mod pattern;
pub mod query;
pub mod router;

pub use history::{HistoryDriver, MemoryHistory};
pub use pattern::{PatternError, RoutePattern, Segment};
pub use query::{parse_query, percent_decode_lossy};
pub use router::{RouteEntry, Router, RouterState};
