//! Payment entries (règlements).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gescom_core::ValueObject;

/// Settlement instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Cash,
    Check,
    Transfer,
    BankDraft,
    Card,
    CreditNote,
}

/// A payment received (sales invoice) or issued (supplier invoice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub kind: PaymentKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// Check or transfer number.
    pub reference: Option<String>,
    pub bank: Option<String>,
    /// Maturity date for checks and bank drafts.
    pub due_date: Option<NaiveDate>,
}

impl ValueObject for Payment {}

/// A payment as recorded on an invoice, numbered like document lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub payment_no: u32,
    pub payment: Payment,
}

impl ValueObject for PaymentEntry {}
