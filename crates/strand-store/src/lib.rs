//! Strand Store - Reducer-Dispatch State Container
//!
//! [`Store`] composes an [`Observer`](strand_core::Observer) with a pure
//! reducer and an `Arc`-swapped state cell:
//!
//! ```text
//! dispatch(action) -> reducer(state, action) -> swap on new Arc -> notify
//! ```
//!
//! The update guard is pointer identity only: a reducer that hands back the
//! `Arc` it was given signals "unchanged" and suppresses notification.
//! Content-level equality belongs to the selector layer
//! ([`Derived`](strand_core::Derived)), which protects consumers from
//! redundant propagation of derived values - the two layers are deliberately
//! distinct.

#![forbid(unsafe_code)]

mod store;

pub use store::Store;
