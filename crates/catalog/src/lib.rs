//! Article catalog domain module.
//!
//! Articles are the catalog the document calculators consult when a line is
//! added: business reference, label, purchase/sale prices and VAT rate, plus
//! the stock figures (on hand, alert threshold, monthly consumption) that
//! drive goods-receipt stock updates and reorder proposals.

pub mod article;

pub use article::{
    AdjustStock, Article, ArticleCatalog, ArticleCommand, ArticleCreated, ArticleEvent,
    ArticleId, ArticlePricesUpdated, ArticleRef, CreateArticle, StockAdjusted, UpdatePrices,
};
