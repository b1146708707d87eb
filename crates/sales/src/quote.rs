//! Quote (devis) status machine.

use serde::{Deserialize, Serialize};

use gescom_documents::{Document, DocumentCommand, DocumentEvent, Lifecycle};

/// Sequence kind code for quote numbering.
pub const QUOTE_KIND: &str = "quote";

/// Quote status lifecycle: draft → validated → transformed.
///
/// A quote stays fully editable until it is transformed into a delivery
/// note; transformation is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Validated,
    Transformed,
}

impl Lifecycle for QuoteStatus {
    fn initial() -> Self {
        QuoteStatus::Draft
    }

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (QuoteStatus::Draft, QuoteStatus::Validated)
                | (QuoteStatus::Validated, QuoteStatus::Transformed)
        )
    }

    fn is_editable(self) -> bool {
        matches!(self, QuoteStatus::Draft | QuoteStatus::Validated)
    }

    fn is_deletable(self) -> bool {
        matches!(self, QuoteStatus::Draft | QuoteStatus::Validated)
    }

    fn is_terminal(self) -> bool {
        matches!(self, QuoteStatus::Transformed)
    }

    fn label(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Validated => "validated",
            QuoteStatus::Transformed => "transformed",
        }
    }
}

/// Aggregate root: Quote.
pub type Quote = Document<QuoteStatus>;
pub type QuoteCommand = DocumentCommand<QuoteStatus>;
pub type QuoteEvent = DocumentEvent<QuoteStatus>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_walks_draft_validated_transformed() {
        assert_eq!(QuoteStatus::initial(), QuoteStatus::Draft);
        assert!(QuoteStatus::Draft.can_transition(QuoteStatus::Validated));
        assert!(QuoteStatus::Validated.can_transition(QuoteStatus::Transformed));
        assert!(!QuoteStatus::Draft.can_transition(QuoteStatus::Transformed));
        assert!(!QuoteStatus::Transformed.can_transition(QuoteStatus::Draft));
    }

    #[test]
    fn validated_quotes_remain_editable_and_deletable() {
        assert!(QuoteStatus::Draft.is_editable());
        assert!(QuoteStatus::Validated.is_editable());
        assert!(QuoteStatus::Validated.is_deletable());
        assert!(!QuoteStatus::Transformed.is_editable());
        assert!(!QuoteStatus::Transformed.is_deletable());
        assert!(QuoteStatus::Transformed.is_terminal());
    }
}
