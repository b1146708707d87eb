//! Money and rate primitives.
//!
//! All amounts, quantities and rates are `rust_decimal::Decimal`. Arithmetic
//! runs at full precision; rounding happens only at the display/persistence
//! boundary via [`round_amount`]. The currency is assumed to carry three
//! decimals (Tunisian dinar millimes), which also fixes the settlement
//! epsilon used by payment reconciliation.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Number of decimals carried by the currency (TND millimes).
pub const CURRENCY_SCALE: u32 = 3;

/// Tolerance applied when comparing a payment sum against a document total.
///
/// One millime: a document counts as settled once the outstanding amount
/// drops below this threshold.
pub fn settlement_epsilon() -> Decimal {
    Decimal::new(1, CURRENCY_SCALE)
}

/// Round an amount to the currency scale (half away from zero).
///
/// Display/persistence boundary only; intermediate results are never
/// rounded, so per-line rounding error cannot compound into totals.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A percentage rate (discount or tax), stored as a percent value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    /// A 0% rate. Absent discount/tax fields default to this.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// A discount rate: must lie in `[0, 100]`.
    pub fn discount(percent: Decimal) -> DomainResult<Self> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(
                "discount rate must be between 0 and 100 percent",
            ));
        }
        Ok(Self(percent))
    }

    /// A tax rate: must be non-negative (no upper bound).
    pub fn tax(percent: Decimal) -> DomainResult<Self> {
        if percent < Decimal::ZERO {
            return Err(DomainError::validation("tax rate must be non-negative"));
        }
        Ok(Self(percent))
    }

    pub fn as_percent(&self) -> Decimal {
        self.0
    }

    /// The rate as a multiplier fraction (19% → 0.19).
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::zero()
    }
}

impl ValueObject for Rate {}

impl core::fmt::Display for Rate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn discount_accepts_bounds() {
        assert!(Rate::discount(dec!(0)).is_ok());
        assert!(Rate::discount(dec!(100)).is_ok());
        assert!(Rate::discount(dec!(19)).is_ok());
    }

    #[test]
    fn discount_rejects_out_of_range() {
        for raw in [dec!(-0.5), dec!(100.001)] {
            let err = Rate::discount(raw).unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                _ => panic!("Expected Validation error for discount {raw}"),
            }
        }
    }

    #[test]
    fn tax_rejects_negative_only() {
        assert!(Rate::tax(dec!(19)).is_ok());
        assert!(Rate::tax(dec!(0)).is_ok());
        assert!(Rate::tax(dec!(250)).is_ok());
        assert!(Rate::tax(dec!(-1)).is_err());
    }

    #[test]
    fn fraction_of_nineteen_percent() {
        let rate = Rate::tax(dec!(19)).unwrap();
        assert_eq!(rate.as_fraction(), dec!(0.19));
    }

    #[test]
    fn rounding_is_half_away_from_zero_at_three_decimals() {
        assert_eq!(round_amount(dec!(1.2345)), dec!(1.235));
        assert_eq!(round_amount(dec!(1.2344)), dec!(1.234));
        assert_eq!(round_amount(dec!(-1.2345)), dec!(-1.235));
    }

    #[test]
    fn epsilon_is_one_millime() {
        assert_eq!(settlement_epsilon(), dec!(0.001));
    }
}
