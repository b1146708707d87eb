use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gescom_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Event, Rate};

/// Article identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub AggregateId);

impl ArticleId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Business reference of an article ("ART-001"), unique in the catalog.
///
/// Documents snapshot this reference on their lines, so it is a value object
/// rather than an aggregate identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleRef(String);

impl ArticleRef {
    pub fn new(raw: impl Into<String>) -> DomainResult<Self> {
        let trimmed = raw.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(DomainError::validation("article reference cannot be empty"));
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ArticleRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl gescom_core::ValueObject for ArticleRef {}

/// Read-only catalog lookup used when document lines are added.
pub trait ArticleCatalog: Send + Sync {
    fn find(&self, reference: &ArticleRef) -> DomainResult<Option<Article>>;
}

/// Aggregate root: Article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    id: ArticleId,
    reference: Option<ArticleRef>,
    label: String,
    /// Purchase price, net of tax.
    purchase_price: Decimal,
    /// Sale price, net of tax.
    sale_price: Decimal,
    tax_rate: Rate,
    stock_on_hand: Decimal,
    alert_threshold: Decimal,
    monthly_consumption: Decimal,
    version: u64,
    created: bool,
}

impl Article {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ArticleId) -> Self {
        Self {
            id,
            reference: None,
            label: String::new(),
            purchase_price: Decimal::ZERO,
            sale_price: Decimal::ZERO,
            tax_rate: Rate::zero(),
            stock_on_hand: Decimal::ZERO,
            alert_threshold: Decimal::ZERO,
            monthly_consumption: Decimal::ZERO,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ArticleId {
        self.id
    }

    pub fn reference(&self) -> Option<&ArticleRef> {
        self.reference.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn purchase_price(&self) -> Decimal {
        self.purchase_price
    }

    pub fn sale_price(&self) -> Decimal {
        self.sale_price
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    pub fn stock_on_hand(&self) -> Decimal {
        self.stock_on_hand
    }

    pub fn alert_threshold(&self) -> Decimal {
        self.alert_threshold
    }

    pub fn monthly_consumption(&self) -> Decimal {
        self.monthly_consumption
    }

    /// Whether the article sits at or below its alert threshold.
    pub fn is_below_threshold(&self) -> bool {
        self.stock_on_hand <= self.alert_threshold
    }

    /// Quantity a reorder proposal would suggest: one month of consumption
    /// minus what is already on hand, floored at zero.
    pub fn reorder_quantity(&self) -> Decimal {
        (self.monthly_consumption - self.stock_on_hand).max(Decimal::ZERO)
    }
}

impl AggregateRoot for Article {
    type Id = ArticleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateArticle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateArticle {
    pub article_id: ArticleId,
    pub reference: ArticleRef,
    pub label: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub tax_rate: Rate,
    pub alert_threshold: Decimal,
    pub monthly_consumption: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdatePrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePrices {
    pub article_id: ArticleId,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub tax_rate: Rate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdjustStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub article_id: ArticleId,
    /// Signed movement: positive on goods receipt, negative on correction.
    pub delta: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleCommand {
    CreateArticle(CreateArticle),
    UpdatePrices(UpdatePrices),
    AdjustStock(AdjustStock),
}

/// Event: ArticleCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCreated {
    pub article_id: ArticleId,
    pub reference: ArticleRef,
    pub label: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub tax_rate: Rate,
    pub alert_threshold: Decimal,
    pub monthly_consumption: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ArticlePricesUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePricesUpdated {
    pub article_id: ArticleId,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub tax_rate: Rate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub article_id: ArticleId,
    pub delta: Decimal,
    pub new_stock_on_hand: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleEvent {
    ArticleCreated(ArticleCreated),
    ArticlePricesUpdated(ArticlePricesUpdated),
    StockAdjusted(StockAdjusted),
}

impl Event for ArticleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ArticleEvent::ArticleCreated(_) => "catalog.article.created",
            ArticleEvent::ArticlePricesUpdated(_) => "catalog.article.prices_updated",
            ArticleEvent::StockAdjusted(_) => "catalog.article.stock_adjusted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ArticleEvent::ArticleCreated(e) => e.occurred_at,
            ArticleEvent::ArticlePricesUpdated(e) => e.occurred_at,
            ArticleEvent::StockAdjusted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Article {
    type Command = ArticleCommand;
    type Event = ArticleEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ArticleEvent::ArticleCreated(e) => {
                self.id = e.article_id;
                self.reference = Some(e.reference.clone());
                self.label = e.label.clone();
                self.purchase_price = e.purchase_price;
                self.sale_price = e.sale_price;
                self.tax_rate = e.tax_rate;
                self.stock_on_hand = Decimal::ZERO;
                self.alert_threshold = e.alert_threshold;
                self.monthly_consumption = e.monthly_consumption;
                self.created = true;
            }
            ArticleEvent::ArticlePricesUpdated(e) => {
                self.purchase_price = e.purchase_price;
                self.sale_price = e.sale_price;
                self.tax_rate = e.tax_rate;
            }
            ArticleEvent::StockAdjusted(e) => {
                self.stock_on_hand = e.new_stock_on_hand;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ArticleCommand::CreateArticle(cmd) => self.handle_create(cmd),
            ArticleCommand::UpdatePrices(cmd) => self.handle_update_prices(cmd),
            ArticleCommand::AdjustStock(cmd) => self.handle_adjust_stock(cmd),
        }
    }
}

impl Article {
    fn ensure_article_id(&self, article_id: ArticleId) -> DomainResult<()> {
        if self.id != article_id {
            return Err(DomainError::invariant("article_id mismatch"));
        }
        Ok(())
    }

    fn check_prices(purchase: Decimal, sale: Decimal) -> DomainResult<()> {
        if purchase < Decimal::ZERO {
            return Err(DomainError::validation(
                "purchase price must be non-negative",
            ));
        }
        if sale < Decimal::ZERO {
            return Err(DomainError::validation("sale price must be non-negative"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateArticle) -> DomainResult<Vec<ArticleEvent>> {
        if self.created {
            return Err(DomainError::conflict("article already exists"));
        }

        if cmd.label.trim().is_empty() {
            return Err(DomainError::validation("label cannot be empty"));
        }
        Self::check_prices(cmd.purchase_price, cmd.sale_price)?;
        if cmd.alert_threshold < Decimal::ZERO || cmd.monthly_consumption < Decimal::ZERO {
            return Err(DomainError::validation(
                "stock thresholds must be non-negative",
            ));
        }

        Ok(vec![ArticleEvent::ArticleCreated(ArticleCreated {
            article_id: cmd.article_id,
            reference: cmd.reference.clone(),
            label: cmd.label.clone(),
            purchase_price: cmd.purchase_price,
            sale_price: cmd.sale_price,
            tax_rate: cmd.tax_rate,
            alert_threshold: cmd.alert_threshold,
            monthly_consumption: cmd.monthly_consumption,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_prices(&self, cmd: &UpdatePrices) -> DomainResult<Vec<ArticleEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_article_id(cmd.article_id)?;
        Self::check_prices(cmd.purchase_price, cmd.sale_price)?;

        Ok(vec![ArticleEvent::ArticlePricesUpdated(
            ArticlePricesUpdated {
                article_id: cmd.article_id,
                purchase_price: cmd.purchase_price,
                sale_price: cmd.sale_price,
                tax_rate: cmd.tax_rate,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_adjust_stock(&self, cmd: &AdjustStock) -> DomainResult<Vec<ArticleEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_article_id(cmd.article_id)?;

        if cmd.delta.is_zero() {
            return Err(DomainError::validation("stock adjustment cannot be zero"));
        }

        let new_stock_on_hand = self.stock_on_hand + cmd.delta;
        if new_stock_on_hand < Decimal::ZERO {
            return Err(DomainError::invariant("stock cannot go negative"));
        }

        Ok(vec![ArticleEvent::StockAdjusted(StockAdjusted {
            article_id: cmd.article_id,
            delta: cmd.delta,
            new_stock_on_hand,
            occurred_at: cmd.occurred_at,
        })])
    }
}
