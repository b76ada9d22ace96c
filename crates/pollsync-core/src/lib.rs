//! Core traits and types for poll-based snapshot reconciliation.
//!
//! This crate defines the abstractions shared by every poller runtime:
//! - `Store`: Thread-safe identifier -> object cache that a poller keeps in sync
//! - `Enumerator`: Length + indexed access over one full snapshot
//! - `Fetcher`: Produces a fresh snapshot (or fails) once per cycle
//! - `reconcile`: The full-snapshot diff that makes a store match a snapshot

mod enumerate;
mod error;
mod fetch;
mod reconcile;
mod store;

pub use enumerate::Enumerator;
pub use error::SyncError;
pub use fetch::{fetch_fn, FetchFn, Fetcher};
pub use reconcile::{reconcile, SyncStats};
pub use store::Store;
