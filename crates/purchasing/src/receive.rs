//! Purchase order reception.

use chrono::{DateTime, Utc};

use gescom_core::{Aggregate, DomainError, DomainResult};
use gescom_documents::{
    AddLine, DocumentCommand, DocumentId, DocumentNumber, OpenDocument, Transition,
};

use crate::order::{PurchaseOrder, PurchaseOrderEvent, PurchaseOrderStatus};
use crate::receipt::{GoodsReceipt, GoodsReceiptEvent};

/// Outcome of receiving a purchase order: the facts to record on the order
/// side and the freshly opened goods receipt.
#[derive(Debug, Clone)]
pub struct OrderReception {
    pub order_events: Vec<PurchaseOrderEvent>,
    pub receipt: GoodsReceipt,
    pub receipt_events: Vec<GoodsReceiptEvent>,
}

/// Receive a validated purchase order.
///
/// The order moves to its terminal `Received` state; the receipt is opened
/// in draft for the same supplier, carrying the ordered lines (received
/// quantities can still be corrected on the draft receipt before it is
/// validated) and the order number as origin.
pub fn receive_order(
    order: &PurchaseOrder,
    receipt_id: DocumentId,
    receipt_number: DocumentNumber,
    occurred_at: DateTime<Utc>,
) -> DomainResult<OrderReception> {
    let order_events = order.handle(&DocumentCommand::Transition(Transition {
        document_id: order.id_typed(),
        to: PurchaseOrderStatus::Received,
        occurred_at,
    }))?;

    let fiscal_year = order
        .fiscal_year()
        .ok_or_else(|| DomainError::invariant("purchase order has no fiscal year"))?;

    let mut receipt = GoodsReceipt::empty(receipt_id);
    let mut receipt_events = Vec::new();

    let open = DocumentCommand::Open(OpenDocument {
        document_id: receipt_id,
        number: receipt_number,
        party: order.party().cloned(),
        document_date: occurred_at.date_naive(),
        fiscal_year,
        origin: order.number(),
        occurred_at,
    });
    for event in receipt.handle(&open)? {
        receipt.apply(&event);
        receipt_events.push(event);
    }

    for line in order.lines() {
        let cmd = DocumentCommand::AddLine(AddLine {
            document_id: receipt_id,
            input: line.to_input(),
            occurred_at,
        });
        for event in receipt.handle(&cmd)? {
            receipt.apply(&event);
            receipt_events.push(event);
        }
    }

    Ok(OrderReception {
        order_events,
        receipt,
        receipt_events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use gescom_catalog::ArticleRef;
    use gescom_core::{AggregateId, Rate};
    use gescom_documents::{FiscalYear, LineInput, PartyRef};
    use gescom_parties::PartyId;

    use crate::receipt::GoodsReceiptStatus;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn order_with_status(status: PurchaseOrderStatus) -> PurchaseOrder {
        let order_id = DocumentId::new(AggregateId::new());
        let mut order = PurchaseOrder::empty(order_id);
        let mut commands = vec![
            DocumentCommand::Open(OpenDocument {
                document_id: order_id,
                number: DocumentNumber::new(8),
                party: Some(PartyRef::new(
                    PartyId::new(AggregateId::new()),
                    "Fournisseur Nord",
                )),
                document_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                fiscal_year: FiscalYear::new(2024),
                origin: None,
                occurred_at: test_time(),
            }),
            DocumentCommand::AddLine(AddLine {
                document_id: order_id,
                input: LineInput {
                    article_ref: ArticleRef::new("ART002").unwrap(),
                    label: "Fer à béton 10mm".to_string(),
                    quantity: dec!(80),
                    unit_price: dec!(12.000),
                    discount: Rate::default(),
                    tax_rate: Rate::tax(dec!(19)).unwrap(),
                },
                occurred_at: test_time(),
            }),
        ];
        if status != PurchaseOrderStatus::Draft {
            commands.push(DocumentCommand::Transition(Transition {
                document_id: order_id,
                to: PurchaseOrderStatus::Validated,
                occurred_at: test_time(),
            }));
        }
        for cmd in commands {
            for event in order.handle(&cmd).unwrap() {
                order.apply(&event);
            }
        }
        order
    }

    #[test]
    fn reception_opens_a_draft_receipt_with_the_ordered_lines() {
        let order = order_with_status(PurchaseOrderStatus::Validated);
        let receipt_id = DocumentId::new(AggregateId::new());
        let outcome =
            receive_order(&order, receipt_id, DocumentNumber::new(2), test_time()).unwrap();

        let receipt = &outcome.receipt;
        assert_eq!(receipt.status(), GoodsReceiptStatus::Draft);
        assert_eq!(receipt.origin(), Some(DocumentNumber::new(8)));
        assert_eq!(receipt.party(), order.party());
        assert_eq!(receipt.lines().len(), 1);
        assert_eq!(receipt.totals(), order.totals());
    }

    #[test]
    fn reception_marks_the_order_received() {
        let mut order = order_with_status(PurchaseOrderStatus::Validated);
        let outcome = receive_order(
            &order,
            DocumentId::new(AggregateId::new()),
            DocumentNumber::new(1),
            test_time(),
        )
        .unwrap();
        for event in &outcome.order_events {
            order.apply(event);
        }
        assert_eq!(order.status(), PurchaseOrderStatus::Received);
    }

    #[test]
    fn draft_order_cannot_be_received() {
        let order = order_with_status(PurchaseOrderStatus::Draft);
        let err = receive_order(
            &order,
            DocumentId::new(AggregateId::new()),
            DocumentNumber::new(1),
            test_time(),
        )
        .unwrap_err();
        match err {
            DomainError::Unauthorized(_) => {}
            _ => panic!("Expected Unauthorized error for receiving a draft order"),
        }
    }
}
