use std::collections::HashSet;
use std::sync::Arc;

/// Thread-safe key-value cache kept in sync by a poller.
///
/// Values are opaque to the store. Every method must be safe to call from
/// several threads at once, and a single call must never be observed
/// half-applied. None of the operations can fail.
pub trait Store<T>: Send + Sync {
    /// Identifiers currently held.
    ///
    /// The returned set is an owned copy: mutating it never affects the store.
    fn contains(&self) -> HashSet<String>;

    /// Insert or overwrite the entry for `id`.
    fn update(&self, id: String, object: T);

    /// Remove the entry for `id`. Absent identifiers are a no-op.
    fn delete(&self, id: &str);
}

impl<T, S> Store<T> for Arc<S>
where
    S: Store<T> + ?Sized,
{
    fn contains(&self) -> HashSet<String> {
        (**self).contains()
    }

    fn update(&self, id: String, object: T) {
        (**self).update(id, object)
    }

    fn delete(&self, id: &str) {
        (**self).delete(id)
    }
}
