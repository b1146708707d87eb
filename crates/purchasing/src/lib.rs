//! Purchasing documents: purchase orders and goods receipts.
//!
//! A purchase order is validated, then received: reception opens a goods
//! receipt whose validation yields the stock movements an external stock
//! collaborator (the article catalog) applies. The reorder module proposes
//! order lines for a supplier's articles that sit at or below their alert
//! threshold.

pub mod order;
pub mod receipt;
pub mod receive;
pub mod reorder;

pub use order::{
    PURCHASE_ORDER_KIND, PurchaseOrder, PurchaseOrderCommand, PurchaseOrderEvent,
    PurchaseOrderStatus,
};
pub use receipt::{
    GOODS_RECEIPT_KIND, GoodsReceipt, GoodsReceiptCommand, GoodsReceiptEvent, GoodsReceiptStatus,
    StockMovement, stock_movements,
};
pub use receive::{OrderReception, receive_order};
pub use reorder::{ReorderLine, reorder_proposal};
