use std::future::Future;

use async_trait::async_trait;

use crate::enumerate::Enumerator;
use crate::error::SyncError;

/// Produces one full snapshot per poll cycle.
///
/// A fetch either returns the complete desired state or fails; partial
/// snapshots are not a supported output. Any timeout on the underlying I/O is
/// the implementation's responsibility.
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    type Snapshot: Enumerator<T> + Send;

    async fn fetch(&self) -> Result<Self::Snapshot, SyncError>;
}

/// `Fetcher` backed by an async closure.
pub struct FetchFn<F> {
    f: F,
}

/// Wrap a closure returning a snapshot future as a `Fetcher`.
///
/// ```
/// use pollsync_core::{fetch_fn, SyncError};
///
/// let fetcher = fetch_fn(|| async {
///     Ok::<_, SyncError>(vec![("a".to_string(), 1u32)])
/// });
/// # let _ = fetcher;
/// ```
pub fn fetch_fn<F>(f: F) -> FetchFn<F> {
    FetchFn { f }
}

#[async_trait]
impl<T, F, Fut, E> Fetcher<T> for FetchFn<F>
where
    T: 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<E, SyncError>> + Send + 'static,
    E: Enumerator<T> + Send + 'static,
{
    type Snapshot = E;

    async fn fetch(&self) -> Result<E, SyncError> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_fn_success() {
        let fetcher = fetch_fn(|| async { Ok::<_, SyncError>(vec![("a".to_string(), 1u32)]) });

        let snapshot = Fetcher::<u32>::fetch(&fetcher).await.unwrap();
        assert_eq!(snapshot, vec![("a".to_string(), 1u32)]);
    }

    #[tokio::test]
    async fn test_fetch_fn_failure() {
        let fetcher = fetch_fn(|| async {
            Err::<Vec<(String, u32)>, _>(SyncError::Fetch("upstream unavailable".to_string()))
        });

        let err = Fetcher::<u32>::fetch(&fetcher).await.unwrap_err();
        assert!(err.to_string().contains("upstream unavailable"));
    }
}
