//! In-memory signature deduplication.

use std::collections::HashSet;

/// Set of transaction signatures already selected as fetch candidates.
///
/// A signature is claimed here *before* its fetch succeeds, so a failed
/// fetch is never retried. The set is never pruned within a process
/// lifetime; the durable pool-address uniqueness check in the database
/// is the second dedup layer.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: HashSet<String>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.seen.contains(signature)
    }

    /// Returns false when the signature was already present.
    pub fn insert(&mut self, signature: &str) -> bool {
        self.seen.insert(signature.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_contains() {
        let mut registry = DedupRegistry::new();
        assert!(!registry.contains("SIG1"));

        assert!(registry.insert("SIG1"));
        assert!(registry.contains("SIG1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_insert_reports_already_seen() {
        let mut registry = DedupRegistry::new();
        assert!(registry.insert("SIG1"));
        assert!(!registry.insert("SIG1"));
        assert_eq!(registry.len(), 1);
    }
}
