//! Line total calculator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gescom_catalog::ArticleRef;
use gescom_core::{DomainError, DomainResult, Rate, ValueObject};

/// Raw line data as entered: what the user picked from the catalog plus
/// quantity, unit price and rates. Amounts are derived from this by
/// [`DocumentLine::compute`], never entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    pub article_ref: ArticleRef,
    pub label: String,
    pub quantity: Decimal,
    /// Unit price, net of tax.
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Rate,
    #[serde(default)]
    pub tax_rate: Rate,
}

/// A computed document line.
///
/// `net_amount` and `gross_amount` are derived by [`DocumentLine::compute`]
/// and cannot be set independently: the fields are private and the only
/// constructor recomputes them from the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLine {
    line_no: u32,
    article_ref: ArticleRef,
    label: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount: Rate,
    tax_rate: Rate,
    net_amount: Decimal,
    gross_amount: Decimal,
}

impl DocumentLine {
    /// Compute a line from its input:
    ///
    /// ```text
    /// net   = quantity * unit_price * (1 - discount/100)
    /// gross = net + net * tax_rate/100
    /// ```
    ///
    /// Full-precision arithmetic; rounding is a display concern.
    pub fn compute(line_no: u32, input: LineInput) -> DomainResult<Self> {
        if input.label.trim().is_empty() {
            return Err(DomainError::validation("line label cannot be empty"));
        }
        if input.quantity <= Decimal::ZERO {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if input.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unit price must be non-negative"));
        }

        let before_discount = input.quantity * input.unit_price;
        let net_amount = before_discount * (Decimal::ONE - input.discount.as_fraction());
        let gross_amount = net_amount + net_amount * input.tax_rate.as_fraction();

        Ok(Self {
            line_no,
            article_ref: input.article_ref,
            label: input.label,
            quantity: input.quantity,
            unit_price: input.unit_price,
            discount: input.discount,
            tax_rate: input.tax_rate,
            net_amount,
            gross_amount,
        })
    }

    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub fn article_ref(&self) -> &ArticleRef {
        &self.article_ref
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn discount(&self) -> Rate {
        self.discount
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    pub fn net_amount(&self) -> Decimal {
        self.net_amount
    }

    pub fn gross_amount(&self) -> Decimal {
        self.gross_amount
    }

    /// Per-line tax figure. Informational only: document-level tax is always
    /// derived by subtraction in the aggregator, never by summing this.
    pub fn tax_amount(&self) -> Decimal {
        self.gross_amount - self.net_amount
    }

    /// Back to input form, e.g. when copying lines onto a successor document.
    pub fn to_input(&self) -> LineInput {
        LineInput {
            article_ref: self.article_ref.clone(),
            label: self.label.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            tax_rate: self.tax_rate,
        }
    }
}

impl ValueObject for DocumentLine {}
