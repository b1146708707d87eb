//! Document numbering.

use serde::{Deserialize, Serialize};

use gescom_core::{DomainResult, ValueObject};

/// Sequential document number, monotonic per document kind, starting at 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentNumber(u64);

impl DocumentNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl ValueObject for DocumentNumber {}

/// Fiscal year a document is booked under.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(i32);

impl FiscalYear {
    pub fn new(year: i32) -> Self {
        Self(year)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl ValueObject for FiscalYear {}

/// Sequence-allocation collaborator.
///
/// One monotonic counter per document kind code. Replaces scanning the
/// stored set for `max + 1`: allocated numbers are never reused, even after
/// a document is deleted.
pub trait NumberSequence: Send + Sync {
    fn next(&self, kind: &str) -> DomainResult<DocumentNumber>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_zero_padded_to_four_digits() {
        assert_eq!(DocumentNumber::new(7).to_string(), "0007");
        assert_eq!(DocumentNumber::new(12345).to_string(), "12345");
    }
}
