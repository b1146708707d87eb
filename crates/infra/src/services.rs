//! Application services.
//!
//! These wire the party directory, the article catalog, the sequence
//! allocator and the repositories around the document aggregates: one
//! service per business area, all synchronous, all returning `DomainResult`.
//! Deletion routes through the aggregates' delete guards and is reported as
//! an authorization failure when blocked.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use gescom_catalog::{AdjustStock, Article, ArticleCatalog, ArticleCommand, ArticleRef};
use gescom_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, ExpectedVersion, Rate,
};
use gescom_documents::{
    AddLine, ChangeParty, Document, DocumentCommand, DocumentId, FiscalYear, Lifecycle,
    LineInput, NumberSequence, OpenDocument, PartyRef, RemoveLine, Transition,
};
use gescom_invoicing::{
    AddInvoiceLine, Invoice, InvoiceCommand, InvoiceDirection, InvoiceId, OpenInvoice, Payment,
    RecordPayment, RemoveInvoiceLine, RemovePayment, SALES_INVOICE_KIND, SUPPLIER_INVOICE_KIND,
    ValidateInvoice,
};
use gescom_parties::{PartyDirectory, PartyId, PartyKind};
use gescom_purchasing::{
    GOODS_RECEIPT_KIND, GoodsReceipt, GoodsReceiptStatus, PURCHASE_ORDER_KIND, PurchaseOrder,
    PurchaseOrderStatus, ReorderLine, stock_movements,
};
use gescom_sales::{
    DELIVERY_NOTE_KIND, DeliveryNote, DeliveryNoteStatus, QUOTE_KIND, Quote, QuoteStatus,
};

use crate::repository::Repository;

/// Which catalog price a document line is priced from.
#[derive(Debug, Clone, Copy)]
enum PriceList {
    Sale,
    Purchase,
}

fn party_snapshot(
    directory: &dyn PartyDirectory,
    party_id: PartyId,
    expected_kind: PartyKind,
) -> DomainResult<PartyRef> {
    let party = directory
        .find(party_id)?
        .ok_or_else(DomainError::not_found)?;
    if party.kind() != expected_kind {
        return Err(DomainError::validation(match expected_kind {
            PartyKind::Client => "party is not a client",
            PartyKind::Supplier => "party is not a supplier",
        }));
    }
    if !party.can_transact() {
        return Err(DomainError::unauthorized("party is suspended"));
    }
    Ok(PartyRef::new(party.id_typed(), party.name()))
}

fn catalog_line(
    catalog: &dyn ArticleCatalog,
    reference: &ArticleRef,
    quantity: Decimal,
    discount: Rate,
    price_list: PriceList,
) -> DomainResult<LineInput> {
    let article = catalog
        .find(reference)?
        .ok_or_else(DomainError::not_found)?;
    let unit_price = match price_list {
        PriceList::Sale => article.sale_price(),
        PriceList::Purchase => article.purchase_price(),
    };
    Ok(LineInput {
        article_ref: reference.clone(),
        label: article.label().to_string(),
        quantity,
        unit_price,
        discount,
        tax_rate: article.tax_rate(),
    })
}

fn open_document<S: Lifecycle>(
    repo: &dyn Repository<Document<S>>,
    cmd: OpenDocument,
) -> DomainResult<Document<S>> {
    let mut document = Document::<S>::empty(cmd.document_id);
    for event in document.handle(&DocumentCommand::Open(cmd))? {
        document.apply(&event);
    }
    repo.save(&document, ExpectedVersion::Exact(0))?;
    Ok(document)
}

fn execute<S: Lifecycle>(
    repo: &dyn Repository<Document<S>>,
    id: DocumentId,
    cmd: DocumentCommand<S>,
) -> DomainResult<Document<S>> {
    let mut document = repo.get(&id)?.ok_or_else(DomainError::not_found)?;
    let expected = ExpectedVersion::Exact(document.version());
    for event in document.handle(&cmd)? {
        document.apply(&event);
    }
    repo.save(&document, expected)?;
    Ok(document)
}

fn delete_document<S: Lifecycle>(
    repo: &dyn Repository<Document<S>>,
    id: DocumentId,
) -> DomainResult<()> {
    let document = repo.get(&id)?.ok_or_else(DomainError::not_found)?;
    if !document.can_delete() {
        return Err(DomainError::unauthorized(format!(
            "document is {} and can no longer be deleted",
            document.status().label()
        )));
    }
    repo.delete(&id)
}

fn execute_invoice(
    repo: &dyn Repository<Invoice>,
    id: InvoiceId,
    cmd: InvoiceCommand,
) -> DomainResult<Invoice> {
    let mut invoice = repo.get(&id)?.ok_or_else(DomainError::not_found)?;
    let expected = ExpectedVersion::Exact(invoice.version());
    for event in invoice.handle(&cmd)? {
        invoice.apply(&event);
    }
    repo.save(&invoice, expected)?;
    Ok(invoice)
}

/// Quotes and delivery notes.
pub struct SalesService {
    quotes: Arc<dyn Repository<Quote>>,
    delivery_notes: Arc<dyn Repository<DeliveryNote>>,
    directory: Arc<dyn PartyDirectory>,
    catalog: Arc<dyn ArticleCatalog>,
    sequences: Arc<dyn NumberSequence>,
}

impl SalesService {
    pub fn new(
        quotes: Arc<dyn Repository<Quote>>,
        delivery_notes: Arc<dyn Repository<DeliveryNote>>,
        directory: Arc<dyn PartyDirectory>,
        catalog: Arc<dyn ArticleCatalog>,
        sequences: Arc<dyn NumberSequence>,
    ) -> Self {
        Self {
            quotes,
            delivery_notes,
            directory,
            catalog,
            sequences,
        }
    }

    pub fn open_quote(
        &self,
        client_id: PartyId,
        document_date: NaiveDate,
        fiscal_year: FiscalYear,
    ) -> DomainResult<Quote> {
        let party = party_snapshot(self.directory.as_ref(), client_id, PartyKind::Client)?;
        let number = self.sequences.next(QUOTE_KIND)?;
        let quote = open_document(
            self.quotes.as_ref(),
            OpenDocument {
                document_id: DocumentId::new(AggregateId::new()),
                number,
                party: Some(party),
                document_date,
                fiscal_year,
                origin: None,
                occurred_at: Utc::now(),
            },
        )?;
        info!(quote = %quote.id_typed(), number = %number, "quote opened");
        Ok(quote)
    }

    pub fn add_quote_line(
        &self,
        quote_id: DocumentId,
        reference: &ArticleRef,
        quantity: Decimal,
        discount: Rate,
    ) -> DomainResult<Quote> {
        let input = catalog_line(
            self.catalog.as_ref(),
            reference,
            quantity,
            discount,
            PriceList::Sale,
        )?;
        execute(
            self.quotes.as_ref(),
            quote_id,
            DocumentCommand::AddLine(AddLine {
                document_id: quote_id,
                input,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn remove_quote_line(&self, quote_id: DocumentId, line_no: u32) -> DomainResult<Quote> {
        execute(
            self.quotes.as_ref(),
            quote_id,
            DocumentCommand::RemoveLine(RemoveLine {
                document_id: quote_id,
                line_no,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn change_quote_client(
        &self,
        quote_id: DocumentId,
        client_id: PartyId,
    ) -> DomainResult<Quote> {
        let party = party_snapshot(self.directory.as_ref(), client_id, PartyKind::Client)?;
        execute(
            self.quotes.as_ref(),
            quote_id,
            DocumentCommand::ChangeParty(ChangeParty {
                document_id: quote_id,
                party,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn validate_quote(&self, quote_id: DocumentId) -> DomainResult<Quote> {
        let quote = execute(
            self.quotes.as_ref(),
            quote_id,
            DocumentCommand::Transition(Transition {
                document_id: quote_id,
                to: QuoteStatus::Validated,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(quote = %quote_id, "quote validated");
        Ok(quote)
    }

    pub fn delete_quote(&self, quote_id: DocumentId) -> DomainResult<()> {
        delete_document(self.quotes.as_ref(), quote_id)?;
        info!(quote = %quote_id, "quote deleted");
        Ok(())
    }

    /// Transform a validated quote into a draft delivery note.
    pub fn transform_quote(&self, quote_id: DocumentId) -> DomainResult<DeliveryNote> {
        let mut quote = self
            .quotes
            .get(&quote_id)?
            .ok_or_else(DomainError::not_found)?;
        let expected = ExpectedVersion::Exact(quote.version());

        let number = self.sequences.next(DELIVERY_NOTE_KIND)?;
        let outcome = gescom_sales::transform_quote(
            &quote,
            DocumentId::new(AggregateId::new()),
            number,
            Utc::now(),
        )?;
        for event in &outcome.quote_events {
            quote.apply(event);
        }
        self.quotes.save(&quote, expected)?;
        self.delivery_notes
            .save(&outcome.delivery_note, ExpectedVersion::Exact(0))?;
        info!(
            quote = %quote_id,
            delivery_note = %outcome.delivery_note.id_typed(),
            number = %number,
            "quote transformed into delivery note"
        );
        Ok(outcome.delivery_note)
    }

    pub fn add_delivery_note_line(
        &self,
        delivery_note_id: DocumentId,
        reference: &ArticleRef,
        quantity: Decimal,
        discount: Rate,
    ) -> DomainResult<DeliveryNote> {
        let input = catalog_line(
            self.catalog.as_ref(),
            reference,
            quantity,
            discount,
            PriceList::Sale,
        )?;
        execute(
            self.delivery_notes.as_ref(),
            delivery_note_id,
            DocumentCommand::AddLine(AddLine {
                document_id: delivery_note_id,
                input,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn validate_delivery_note(
        &self,
        delivery_note_id: DocumentId,
    ) -> DomainResult<DeliveryNote> {
        let note = execute(
            self.delivery_notes.as_ref(),
            delivery_note_id,
            DocumentCommand::Transition(Transition {
                document_id: delivery_note_id,
                to: DeliveryNoteStatus::Validated,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(delivery_note = %delivery_note_id, "delivery note validated");
        Ok(note)
    }

    pub fn delete_delivery_note(&self, delivery_note_id: DocumentId) -> DomainResult<()> {
        delete_document(self.delivery_notes.as_ref(), delivery_note_id)?;
        info!(delivery_note = %delivery_note_id, "delivery note deleted");
        Ok(())
    }
}

/// Purchase orders and goods receipts.
pub struct PurchasingService {
    orders: Arc<dyn Repository<PurchaseOrder>>,
    receipts: Arc<dyn Repository<GoodsReceipt>>,
    articles: Arc<dyn Repository<Article>>,
    directory: Arc<dyn PartyDirectory>,
    catalog: Arc<dyn ArticleCatalog>,
    sequences: Arc<dyn NumberSequence>,
}

impl PurchasingService {
    pub fn new(
        orders: Arc<dyn Repository<PurchaseOrder>>,
        receipts: Arc<dyn Repository<GoodsReceipt>>,
        articles: Arc<dyn Repository<Article>>,
        directory: Arc<dyn PartyDirectory>,
        catalog: Arc<dyn ArticleCatalog>,
        sequences: Arc<dyn NumberSequence>,
    ) -> Self {
        Self {
            orders,
            receipts,
            articles,
            directory,
            catalog,
            sequences,
        }
    }

    pub fn open_order(
        &self,
        supplier_id: PartyId,
        document_date: NaiveDate,
        fiscal_year: FiscalYear,
    ) -> DomainResult<PurchaseOrder> {
        let party = party_snapshot(self.directory.as_ref(), supplier_id, PartyKind::Supplier)?;
        let number = self.sequences.next(PURCHASE_ORDER_KIND)?;
        let order = open_document(
            self.orders.as_ref(),
            OpenDocument {
                document_id: DocumentId::new(AggregateId::new()),
                number,
                party: Some(party),
                document_date,
                fiscal_year,
                origin: None,
                occurred_at: Utc::now(),
            },
        )?;
        info!(order = %order.id_typed(), number = %number, "purchase order opened");
        Ok(order)
    }

    pub fn add_order_line(
        &self,
        order_id: DocumentId,
        reference: &ArticleRef,
        quantity: Decimal,
        discount: Rate,
    ) -> DomainResult<PurchaseOrder> {
        let input = catalog_line(
            self.catalog.as_ref(),
            reference,
            quantity,
            discount,
            PriceList::Purchase,
        )?;
        execute(
            self.orders.as_ref(),
            order_id,
            DocumentCommand::AddLine(AddLine {
                document_id: order_id,
                input,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn remove_order_line(
        &self,
        order_id: DocumentId,
        line_no: u32,
    ) -> DomainResult<PurchaseOrder> {
        execute(
            self.orders.as_ref(),
            order_id,
            DocumentCommand::RemoveLine(RemoveLine {
                document_id: order_id,
                line_no,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn validate_order(&self, order_id: DocumentId) -> DomainResult<PurchaseOrder> {
        let order = execute(
            self.orders.as_ref(),
            order_id,
            DocumentCommand::Transition(Transition {
                document_id: order_id,
                to: PurchaseOrderStatus::Validated,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(order = %order_id, "purchase order validated");
        Ok(order)
    }

    pub fn delete_order(&self, order_id: DocumentId) -> DomainResult<()> {
        delete_document(self.orders.as_ref(), order_id)?;
        info!(order = %order_id, "purchase order deleted");
        Ok(())
    }

    /// Receive a validated order: the order becomes terminal and a draft
    /// goods receipt is opened with the ordered lines.
    pub fn receive_order(&self, order_id: DocumentId) -> DomainResult<GoodsReceipt> {
        let mut order = self
            .orders
            .get(&order_id)?
            .ok_or_else(DomainError::not_found)?;
        let expected = ExpectedVersion::Exact(order.version());

        let number = self.sequences.next(GOODS_RECEIPT_KIND)?;
        let outcome = gescom_purchasing::receive_order(
            &order,
            DocumentId::new(AggregateId::new()),
            number,
            Utc::now(),
        )?;
        for event in &outcome.order_events {
            order.apply(event);
        }
        self.orders.save(&order, expected)?;
        self.receipts
            .save(&outcome.receipt, ExpectedVersion::Exact(0))?;
        info!(
            order = %order_id,
            receipt = %outcome.receipt.id_typed(),
            number = %number,
            "purchase order received"
        );
        Ok(outcome.receipt)
    }

    pub fn remove_receipt_line(
        &self,
        receipt_id: DocumentId,
        line_no: u32,
    ) -> DomainResult<GoodsReceipt> {
        execute(
            self.receipts.as_ref(),
            receipt_id,
            DocumentCommand::RemoveLine(RemoveLine {
                document_id: receipt_id,
                line_no,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Validate a draft receipt and book its stock movements into the
    /// article catalog.
    pub fn validate_receipt(&self, receipt_id: DocumentId) -> DomainResult<GoodsReceipt> {
        let receipt = execute(
            self.receipts.as_ref(),
            receipt_id,
            DocumentCommand::Transition(Transition {
                document_id: receipt_id,
                to: GoodsReceiptStatus::Validated,
                occurred_at: Utc::now(),
            }),
        )?;

        for movement in stock_movements(&receipt)? {
            let mut article = self
                .catalog
                .find(&movement.article_ref)?
                .ok_or_else(DomainError::not_found)?;
            let expected = ExpectedVersion::Exact(article.version());
            let events = article.handle(&ArticleCommand::AdjustStock(AdjustStock {
                article_id: article.id_typed(),
                delta: movement.quantity,
                occurred_at: Utc::now(),
            }))?;
            for event in &events {
                article.apply(event);
            }
            self.articles.save(&article, expected)?;
            debug!(
                article = %movement.article_ref,
                delta = %movement.quantity,
                "stock updated from receipt"
            );
        }

        info!(receipt = %receipt_id, "goods receipt validated");
        Ok(receipt)
    }

    pub fn delete_receipt(&self, receipt_id: DocumentId) -> DomainResult<()> {
        delete_document(self.receipts.as_ref(), receipt_id)?;
        info!(receipt = %receipt_id, "goods receipt deleted");
        Ok(())
    }

    /// Reorder proposal for a supplier: one line per supplied article at or
    /// below its alert threshold.
    pub fn reorder_proposal(&self, supplier_id: PartyId) -> DomainResult<Vec<ReorderLine>> {
        let supplier = self
            .directory
            .find(supplier_id)?
            .ok_or_else(DomainError::not_found)?;
        if supplier.kind() != PartyKind::Supplier {
            return Err(DomainError::validation("party is not a supplier"));
        }

        let mut articles = Vec::new();
        for reference in supplier.supplied_articles() {
            if let Some(article) = self.catalog.find(reference)? {
                articles.push(article);
            }
        }
        Ok(gescom_purchasing::reorder_proposal(&articles))
    }

    /// Open a draft order pre-filled from the supplier's shortage proposal.
    pub fn open_order_from_shortage(
        &self,
        supplier_id: PartyId,
        document_date: NaiveDate,
        fiscal_year: FiscalYear,
    ) -> DomainResult<PurchaseOrder> {
        let proposal = self.reorder_proposal(supplier_id)?;
        if proposal.is_empty() {
            return Err(DomainError::validation(
                "no supplied article is below its alert threshold",
            ));
        }

        let mut order = self.open_order(supplier_id, document_date, fiscal_year)?;
        for line in &proposal {
            order = self.add_order_line(
                order.id_typed(),
                &line.article_ref,
                line.quantity,
                Rate::zero(),
            )?;
        }
        Ok(order)
    }
}

/// Sales and supplier invoices, payments included.
pub struct InvoicingService {
    invoices: Arc<dyn Repository<Invoice>>,
    delivery_notes: Arc<dyn Repository<DeliveryNote>>,
    directory: Arc<dyn PartyDirectory>,
    catalog: Arc<dyn ArticleCatalog>,
    sequences: Arc<dyn NumberSequence>,
}

impl InvoicingService {
    pub fn new(
        invoices: Arc<dyn Repository<Invoice>>,
        delivery_notes: Arc<dyn Repository<DeliveryNote>>,
        directory: Arc<dyn PartyDirectory>,
        catalog: Arc<dyn ArticleCatalog>,
        sequences: Arc<dyn NumberSequence>,
    ) -> Self {
        Self {
            invoices,
            delivery_notes,
            directory,
            catalog,
            sequences,
        }
    }

    fn sequence_kind(direction: InvoiceDirection) -> &'static str {
        match direction {
            InvoiceDirection::Sale => SALES_INVOICE_KIND,
            InvoiceDirection::Purchase => SUPPLIER_INVOICE_KIND,
        }
    }

    fn party_kind(direction: InvoiceDirection) -> PartyKind {
        match direction {
            InvoiceDirection::Sale => PartyKind::Client,
            InvoiceDirection::Purchase => PartyKind::Supplier,
        }
    }

    fn price_list(direction: InvoiceDirection) -> PriceList {
        match direction {
            InvoiceDirection::Sale => PriceList::Sale,
            InvoiceDirection::Purchase => PriceList::Purchase,
        }
    }

    pub fn open_invoice(
        &self,
        direction: InvoiceDirection,
        party_id: PartyId,
        document_date: NaiveDate,
        fiscal_year: FiscalYear,
    ) -> DomainResult<Invoice> {
        let party = party_snapshot(
            self.directory.as_ref(),
            party_id,
            Self::party_kind(direction),
        )?;
        let number = self.sequences.next(Self::sequence_kind(direction))?;

        let invoice_id = InvoiceId::new(AggregateId::new());
        let mut invoice = Invoice::empty(invoice_id);
        for event in invoice.handle(&InvoiceCommand::Open(OpenInvoice {
            invoice_id,
            direction,
            number,
            party: Some(party),
            document_date,
            fiscal_year,
            origin: None,
            occurred_at: Utc::now(),
        }))? {
            invoice.apply(&event);
        }
        self.invoices.save(&invoice, ExpectedVersion::Exact(0))?;
        info!(invoice = %invoice_id, number = %number, ?direction, "invoice opened");
        Ok(invoice)
    }

    pub fn add_invoice_line(
        &self,
        invoice_id: InvoiceId,
        reference: &ArticleRef,
        quantity: Decimal,
        discount: Rate,
    ) -> DomainResult<Invoice> {
        let invoice = self
            .invoices
            .get(&invoice_id)?
            .ok_or_else(DomainError::not_found)?;
        let input = catalog_line(
            self.catalog.as_ref(),
            reference,
            quantity,
            discount,
            Self::price_list(invoice.direction()),
        )?;
        execute_invoice(
            self.invoices.as_ref(),
            invoice_id,
            InvoiceCommand::AddLine(AddInvoiceLine {
                invoice_id,
                input,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn remove_invoice_line(
        &self,
        invoice_id: InvoiceId,
        line_no: u32,
    ) -> DomainResult<Invoice> {
        execute_invoice(
            self.invoices.as_ref(),
            invoice_id,
            InvoiceCommand::RemoveLine(RemoveInvoiceLine {
                invoice_id,
                line_no,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn validate_invoice(&self, invoice_id: InvoiceId) -> DomainResult<Invoice> {
        let invoice = execute_invoice(
            self.invoices.as_ref(),
            invoice_id,
            InvoiceCommand::Validate(ValidateInvoice {
                invoice_id,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(invoice = %invoice_id, "invoice validated");
        Ok(invoice)
    }

    pub fn record_payment(&self, invoice_id: InvoiceId, payment: Payment) -> DomainResult<Invoice> {
        let invoice = execute_invoice(
            self.invoices.as_ref(),
            invoice_id,
            InvoiceCommand::RecordPayment(RecordPayment {
                invoice_id,
                payment,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(
            invoice = %invoice_id,
            paid = %invoice.paid_total(),
            status = invoice.status().label(),
            "payment recorded"
        );
        Ok(invoice)
    }

    pub fn remove_payment(&self, invoice_id: InvoiceId, payment_no: u32) -> DomainResult<Invoice> {
        let invoice = execute_invoice(
            self.invoices.as_ref(),
            invoice_id,
            InvoiceCommand::RemovePayment(RemovePayment {
                invoice_id,
                payment_no,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(
            invoice = %invoice_id,
            paid = %invoice.paid_total(),
            status = invoice.status().label(),
            "payment removed"
        );
        Ok(invoice)
    }

    pub fn delete_invoice(&self, invoice_id: InvoiceId) -> DomainResult<()> {
        let invoice = self
            .invoices
            .get(&invoice_id)?
            .ok_or_else(DomainError::not_found)?;
        if !invoice.can_delete() {
            return Err(DomainError::unauthorized(
                "invoice has payments or is settled and can no longer be deleted",
            ));
        }
        self.invoices.delete(&invoice_id)?;
        info!(invoice = %invoice_id, "invoice deleted");
        Ok(())
    }

    /// Invoice a validated delivery note: the note becomes terminal and a
    /// validated sales invoice is raised from its lines.
    pub fn invoice_delivery_note(&self, delivery_note_id: DocumentId) -> DomainResult<Invoice> {
        let mut note = self
            .delivery_notes
            .get(&delivery_note_id)?
            .ok_or_else(DomainError::not_found)?;
        let expected = ExpectedVersion::Exact(note.version());

        let now = Utc::now();
        let events = gescom_sales::invoice_delivery_note(&note, now)?;
        for event in &events {
            note.apply(event);
        }

        let fiscal_year = note
            .fiscal_year()
            .ok_or_else(|| DomainError::invariant("delivery note has no fiscal year"))?;
        let number = self.sequences.next(SALES_INVOICE_KIND)?;
        let invoice_id = InvoiceId::new(AggregateId::new());
        let mut invoice = Invoice::empty(invoice_id);

        let mut commands = vec![InvoiceCommand::Open(OpenInvoice {
            invoice_id,
            direction: InvoiceDirection::Sale,
            number,
            party: note.party().cloned(),
            document_date: now.date_naive(),
            fiscal_year,
            origin: note.number(),
            occurred_at: now,
        })];
        for line in note.lines() {
            commands.push(InvoiceCommand::AddLine(AddInvoiceLine {
                invoice_id,
                input: line.to_input(),
                occurred_at: now,
            }));
        }
        commands.push(InvoiceCommand::Validate(ValidateInvoice {
            invoice_id,
            occurred_at: now,
        }));
        for cmd in commands {
            for event in invoice.handle(&cmd)? {
                invoice.apply(&event);
            }
        }

        self.delivery_notes.save(&note, expected)?;
        self.invoices.save(&invoice, ExpectedVersion::Exact(0))?;
        info!(
            delivery_note = %delivery_note_id,
            invoice = %invoice_id,
            number = %number,
            "delivery note invoiced"
        );
        Ok(invoice)
    }
}
