//! Strand Core - Reactive Subscription Primitives
//!
//! This crate provides the foundational primitives for strand's state
//! synchronization model:
//!
//! - [`Observer`]: a minimal pub/sub primitive. Holds listener callbacks and
//!   notifies them synchronously, in registration order, on demand.
//! - [`EqualityGate`]: a memoization cell that returns the previously cached
//!   value (same `Arc` identity for `Arc`-shaped values) when an injected
//!   comparison says nothing changed.
//! - [`Source`]: the subscribe/snapshot contract consumed by UI adapters.
//!   A snapshot is synchronous, side-effect-free, and reference-stable when
//!   nothing relevant changed.
//! - [`Derived`]: a selector bound to a source through exactly one
//!   `EqualityGate`, so consumers only observe changes in the slice of state
//!   they asked for.
//!
//! # Threading Model
//!
//! The source system these primitives model runs on a single UI thread; Rust
//! offers no such ambient guarantee, so every handle here is `Send + Sync`
//! over std sync primitives. Locks are never held while listener callbacks
//! run, which keeps synchronous re-entrancy (a listener mutating the source
//! that is notifying it) deadlock-free.

#![forbid(unsafe_code)]

pub mod gate;
pub mod observer;
pub mod source;

pub use gate::EqualityGate;
pub use observer::{Observer, SharedListener, Subscription};
pub use source::{Derived, Source, SourceExt};
