/// Errors surfaced by snapshot fetching and poller lifecycle operations.
///
/// Store mutations never fail, so none of these variants describe a store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cycle panicked: {0}")]
    Panicked(String),

    #[error("Poller task error: {0}")]
    Task(String),
}

