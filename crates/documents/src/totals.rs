//! Document-level aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gescom_core::ValueObject;

use crate::line::DocumentLine;

/// Derived document totals.
///
/// `total_tax` is the difference between gross and net, **not** the sum of
/// per-line tax figures: the per-line figure is informational and summing it
/// would introduce a second rounding source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub total_net: Decimal,
    pub total_tax: Decimal,
    pub total_gross: Decimal,
}

impl DocumentTotals {
    pub fn zero() -> Self {
        Self {
            total_net: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            total_gross: Decimal::ZERO,
        }
    }

    /// Recompute from the full line set. Pure and idempotent; called on every
    /// line mutation.
    pub fn from_lines(lines: &[DocumentLine]) -> Self {
        let total_net: Decimal = lines.iter().map(DocumentLine::net_amount).sum();
        let total_gross: Decimal = lines.iter().map(DocumentLine::gross_amount).sum();
        Self {
            total_net,
            total_tax: total_gross - total_net,
            total_gross,
        }
    }
}

impl Default for DocumentTotals {
    fn default() -> Self {
        Self::zero()
    }
}

impl ValueObject for DocumentTotals {}
