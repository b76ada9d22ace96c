/// One complete snapshot of desired `(identifier, object)` pairs.
///
/// Callers ask for the length, then fetch each pair by zero-based index.
/// Indexing outside `0..len()` is a contract violation of the implementation
/// and may panic.
pub trait Enumerator<T> {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> (String, T);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Enumerator<T> for [(String, T)] {
    fn len(&self) -> usize {
        <[(String, T)]>::len(self)
    }

    fn get(&self, index: usize) -> (String, T) {
        let (id, object) = &self[index];
        (id.clone(), object.clone())
    }
}

impl<T: Clone> Enumerator<T> for Vec<(String, T)> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> (String, T) {
        Enumerator::get(self.as_slice(), index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_enumerator() {
        let listing = vec![("a".to_string(), 1), ("b".to_string(), 2)];

        assert_eq!(Enumerator::len(&listing), 2);
        assert!(!Enumerator::is_empty(&listing));
        assert_eq!(Enumerator::get(&listing, 1), ("b".to_string(), 2));
    }

    #[test]
    fn test_empty_slice_enumerator() {
        let listing: &[(String, u8)] = &[];
        assert!(Enumerator::is_empty(listing));
    }
}
