//! Document number allocation.

use std::collections::HashMap;
use std::sync::RwLock;

use gescom_core::{DomainError, DomainResult};
use gescom_documents::{DocumentNumber, NumberSequence};

/// In-memory sequence allocator: one monotonic counter per document kind.
///
/// Counters never look at the stored document set, so numbers are not reused
/// after a deletion and do not depend on scanning anything.
#[derive(Debug, Default)]
pub struct InMemorySequences {
    counters: RwLock<HashMap<String, u64>>,
}

impl InMemorySequences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NumberSequence for InMemorySequences {
    fn next(&self, kind: &str) -> DomainResult<DocumentNumber> {
        let mut counters = self
            .counters
            .write()
            .map_err(|_| DomainError::conflict("sequence lock poisoned"))?;
        let counter = counters.entry(kind.to_string()).or_insert(0);
        *counter += 1;
        Ok(DocumentNumber::new(*counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_one_and_increase() {
        let sequences = InMemorySequences::new();
        assert_eq!(sequences.next("quote").unwrap(), DocumentNumber::new(1));
        assert_eq!(sequences.next("quote").unwrap(), DocumentNumber::new(2));
        assert_eq!(sequences.next("quote").unwrap(), DocumentNumber::new(3));
    }

    #[test]
    fn kinds_are_independent() {
        let sequences = InMemorySequences::new();
        sequences.next("quote").unwrap();
        sequences.next("quote").unwrap();
        assert_eq!(
            sequences.next("delivery_note").unwrap(),
            DocumentNumber::new(1)
        );
    }
}
