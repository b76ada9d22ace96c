//! Local runtime for pollsync: an in-memory store, the background poller
//! and a directory listing source.

pub mod config;
pub mod poller;
pub mod source;
pub mod store;

pub use poller::{PollStatus, Poller, PollerHandle};
pub use source::{DirectorySource, FileEntry};
pub use store::MemoryStore;
