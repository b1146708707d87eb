//! Shortage-based reorder proposals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gescom_catalog::{Article, ArticleRef};
use gescom_core::ValueObject;

/// One proposed order line: an article at or below its alert threshold and
/// the quantity bringing it back to a month of consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderLine {
    pub article_ref: ArticleRef,
    pub label: String,
    pub stock_on_hand: Decimal,
    pub quantity: Decimal,
}

impl ValueObject for ReorderLine {}

/// Propose order lines for the given articles (typically those a supplier
/// provides). Articles above their alert threshold, and shortages that round
/// to a zero quantity, are dropped.
pub fn reorder_proposal(articles: &[Article]) -> Vec<ReorderLine> {
    articles
        .iter()
        .filter(|article| article.is_below_threshold())
        .filter_map(|article| {
            let quantity = article.reorder_quantity();
            if quantity.is_zero() {
                return None;
            }
            Some(ReorderLine {
                article_ref: article.reference()?.clone(),
                label: article.label().to_string(),
                stock_on_hand: article.stock_on_hand(),
                quantity,
            })
        })
        .collect()
}
