//! Purchase order (commande d'achat) status machine.

use serde::{Deserialize, Serialize};

use gescom_documents::{Document, DocumentCommand, DocumentEvent, Lifecycle};

/// Sequence kind code for purchase order numbering.
pub const PURCHASE_ORDER_KIND: &str = "purchase_order";

/// Purchase order status lifecycle: draft → validated → received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    Validated,
    Received,
}

impl Lifecycle for PurchaseOrderStatus {
    fn initial() -> Self {
        PurchaseOrderStatus::Draft
    }

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (PurchaseOrderStatus::Draft, PurchaseOrderStatus::Validated)
                | (PurchaseOrderStatus::Validated, PurchaseOrderStatus::Received)
        )
    }

    fn is_editable(self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Draft | PurchaseOrderStatus::Validated
        )
    }

    fn is_deletable(self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Draft | PurchaseOrderStatus::Validated
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, PurchaseOrderStatus::Received)
    }

    fn label(self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Validated => "validated",
            PurchaseOrderStatus::Received => "received",
        }
    }
}

/// Aggregate root: PurchaseOrder.
pub type PurchaseOrder = Document<PurchaseOrderStatus>;
pub type PurchaseOrderCommand = DocumentCommand<PurchaseOrderStatus>;
pub type PurchaseOrderEvent = DocumentEvent<PurchaseOrderStatus>;
