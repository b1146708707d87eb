//! Delivery note (bon de livraison) status machine.

use serde::{Deserialize, Serialize};

use gescom_documents::{Document, DocumentCommand, DocumentEvent, Lifecycle};

/// Sequence kind code for delivery note numbering.
pub const DELIVERY_NOTE_KIND: &str = "delivery_note";

/// Delivery note status lifecycle: draft → validated → invoiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryNoteStatus {
    Draft,
    Validated,
    Invoiced,
}

impl Lifecycle for DeliveryNoteStatus {
    fn initial() -> Self {
        DeliveryNoteStatus::Draft
    }

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (DeliveryNoteStatus::Draft, DeliveryNoteStatus::Validated)
                | (DeliveryNoteStatus::Validated, DeliveryNoteStatus::Invoiced)
        )
    }

    fn is_editable(self) -> bool {
        matches!(
            self,
            DeliveryNoteStatus::Draft | DeliveryNoteStatus::Validated
        )
    }

    fn is_deletable(self) -> bool {
        matches!(
            self,
            DeliveryNoteStatus::Draft | DeliveryNoteStatus::Validated
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, DeliveryNoteStatus::Invoiced)
    }

    fn label(self) -> &'static str {
        match self {
            DeliveryNoteStatus::Draft => "draft",
            DeliveryNoteStatus::Validated => "validated",
            DeliveryNoteStatus::Invoiced => "invoiced",
        }
    }
}

/// Aggregate root: DeliveryNote.
pub type DeliveryNote = Document<DeliveryNoteStatus>;
pub type DeliveryNoteCommand = DocumentCommand<DeliveryNoteStatus>;
pub type DeliveryNoteEvent = DocumentEvent<DeliveryNoteStatus>;
