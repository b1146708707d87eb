//! Payment reconciliation.

use rust_decimal::Decimal;

use gescom_core::settlement_epsilon;

use crate::invoice::InvoiceStatus;
use crate::payment::PaymentEntry;

/// Sum of recorded payments.
pub fn paid_total(payments: &[PaymentEntry]) -> Decimal {
    payments.iter().map(|entry| entry.payment.amount).sum()
}

/// Derive a validated invoice's status from its payments.
///
/// Pure function of (paid, total): `Paid` once the outstanding amount drops
/// below one millime, `PartiallyPaid` while something but not everything has
/// been received, `Validated` otherwise. Draft invoices never pass through
/// here; validation is a separate, manual step.
pub fn settle(paid: Decimal, total_gross: Decimal) -> InvoiceStatus {
    if paid <= Decimal::ZERO {
        InvoiceStatus::Validated
    } else if paid >= total_gross - settlement_epsilon() {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::payment::{Payment, PaymentKind};

    fn entry(payment_no: u32, amount: Decimal) -> PaymentEntry {
        PaymentEntry {
            payment_no,
            payment: Payment {
                kind: PaymentKind::Cash,
                amount,
                date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
                reference: None,
                bank: None,
                due_date: None,
            },
        }
    }

    #[test]
    fn settle_classifies_the_three_cases() {
        assert_eq!(settle(dec!(0), dec!(500)), InvoiceStatus::Validated);
        assert_eq!(settle(dec!(200), dec!(500)), InvoiceStatus::PartiallyPaid);
        assert_eq!(settle(dec!(500), dec!(500)), InvoiceStatus::Paid);
    }

    #[test]
    fn settlement_tolerates_one_millime() {
        assert_eq!(settle(dec!(499.999), dec!(500)), InvoiceStatus::Paid);
        assert_eq!(settle(dec!(499.998), dec!(500)), InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn paid_total_sums_entries() {
        let payments = vec![entry(1, dec!(200)), entry(2, dec!(300))];
        assert_eq!(paid_total(&payments), dec!(500));
        assert_eq!(paid_total(&[]), Decimal::ZERO);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn millimes() -> impl Strategy<Value = Decimal> {
            (0u64..=1_000_000u64).prop_map(|raw| Decimal::new(raw as i64, 3))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: settle() maps every (paid, total) pair to exactly one
            /// status, and a paid amount within the total is never `Paid`
            /// unless it reaches total − epsilon.
            #[test]
            fn settle_is_total_and_monotonic(paid in millimes(), total in millimes()) {
                let status = settle(paid, total);
                if paid <= Decimal::ZERO {
                    prop_assert_eq!(status, InvoiceStatus::Validated);
                } else if paid >= total - gescom_core::settlement_epsilon() {
                    prop_assert_eq!(status, InvoiceStatus::Paid);
                } else {
                    prop_assert_eq!(status, InvoiceStatus::PartiallyPaid);
                }
            }
        }
    }
}
