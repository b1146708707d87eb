//! Goods receipt (bon de réception) status machine and stock movements.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gescom_catalog::ArticleRef;
use gescom_core::{DomainError, DomainResult, ValueObject};
use gescom_documents::{Document, DocumentCommand, DocumentEvent, Lifecycle};

/// Sequence kind code for goods receipt numbering.
pub const GOODS_RECEIPT_KIND: &str = "goods_receipt";

/// Goods receipt status lifecycle: draft → validated.
///
/// Validation is the point where stock conceptually enters the warehouse;
/// once validated the receipt is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoodsReceiptStatus {
    Draft,
    Validated,
}

impl Lifecycle for GoodsReceiptStatus {
    fn initial() -> Self {
        GoodsReceiptStatus::Draft
    }

    fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (GoodsReceiptStatus::Draft, GoodsReceiptStatus::Validated)
        )
    }

    fn is_editable(self) -> bool {
        matches!(self, GoodsReceiptStatus::Draft)
    }

    fn is_deletable(self) -> bool {
        matches!(self, GoodsReceiptStatus::Draft)
    }

    fn is_terminal(self) -> bool {
        matches!(self, GoodsReceiptStatus::Validated)
    }

    fn label(self) -> &'static str {
        match self {
            GoodsReceiptStatus::Draft => "draft",
            GoodsReceiptStatus::Validated => "validated",
        }
    }
}

/// Aggregate root: GoodsReceipt.
pub type GoodsReceipt = Document<GoodsReceiptStatus>;
pub type GoodsReceiptCommand = DocumentCommand<GoodsReceiptStatus>;
pub type GoodsReceiptEvent = DocumentEvent<GoodsReceiptStatus>;

/// A quantity of an article entering stock.
///
/// The receipt only emits these; applying them to the article catalog is the
/// stock collaborator's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub article_ref: ArticleRef,
    pub quantity: Decimal,
}

impl ValueObject for StockMovement {}

/// Stock movements of a validated receipt, one per line.
pub fn stock_movements(receipt: &GoodsReceipt) -> DomainResult<Vec<StockMovement>> {
    if receipt.status() != GoodsReceiptStatus::Validated {
        return Err(DomainError::unauthorized(
            "stock update requires a validated receipt",
        ));
    }

    Ok(receipt
        .lines()
        .iter()
        .map(|line| StockMovement {
            article_ref: line.article_ref().clone(),
            quantity: line.quantity(),
        })
        .collect())
}
