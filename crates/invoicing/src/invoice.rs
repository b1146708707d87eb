use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gescom_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Event};
use gescom_documents::{
    DocumentLine, DocumentNumber, DocumentTotals, FiscalYear, Lifecycle, LineInput, PartyRef,
};

use crate::payment::{Payment, PaymentEntry};
use crate::reconcile::{paid_total, settle};

/// Sequence kind code for sales invoice numbering.
pub const SALES_INVOICE_KIND: &str = "sales_invoice";
/// Sequence kind code for supplier invoice numbering.
pub const SUPPLIER_INVOICE_KIND: &str = "supplier_invoice";

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Whether the invoice is owed to us (sale) or by us (purchase).
///
/// Both directions share one machine; the direction only decides which party
/// directory and sequence the services consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceDirection {
    Sale,
    Purchase,
}

/// Invoice status lifecycle: draft → validated → partially_paid → paid.
///
/// Only draft → validated is a manual transition; beyond that the status is
/// derived from the payments by [`settle`](crate::reconcile::settle), moving
/// in both directions as payments are recorded and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Validated,
    PartiallyPaid,
    Paid,
}

impl Lifecycle for InvoiceStatus {
    fn initial() -> Self {
        InvoiceStatus::Draft
    }

    fn can_transition(self, to: Self) -> bool {
        matches!((self, to), (InvoiceStatus::Draft, InvoiceStatus::Validated))
    }

    fn is_editable(self) -> bool {
        !matches!(self, InvoiceStatus::Paid)
    }

    fn is_deletable(self) -> bool {
        matches!(self, InvoiceStatus::Draft | InvoiceStatus::Validated)
    }

    fn is_terminal(self) -> bool {
        matches!(self, InvoiceStatus::Paid)
    }

    fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Validated => "validated",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
        }
    }
}

/// Aggregate root: Invoice.
///
/// Same shape as the generic commercial document (computed lines, derived
/// totals, a status machine) plus the payment entries reconciled against the
/// gross total. Like document totals, the status beyond `Draft` is derived
/// state: `apply` re-settles it after every line or payment event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    id: InvoiceId,
    direction: InvoiceDirection,
    number: Option<DocumentNumber>,
    party: Option<PartyRef>,
    document_date: Option<NaiveDate>,
    fiscal_year: Option<FiscalYear>,
    /// Delivery note this invoice was raised from, if any.
    origin: Option<DocumentNumber>,
    lines: Vec<DocumentLine>,
    payments: Vec<PaymentEntry>,
    status: InvoiceStatus,
    totals: DocumentTotals,
    version: u64,
    created: bool,
}

impl Invoice {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InvoiceId) -> Self {
        Self {
            id,
            direction: InvoiceDirection::Sale,
            number: None,
            party: None,
            document_date: None,
            fiscal_year: None,
            origin: None,
            lines: Vec::new(),
            payments: Vec::new(),
            status: InvoiceStatus::Draft,
            totals: DocumentTotals::zero(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn direction(&self) -> InvoiceDirection {
        self.direction
    }

    pub fn number(&self) -> Option<DocumentNumber> {
        self.number
    }

    pub fn party(&self) -> Option<&PartyRef> {
        self.party.as_ref()
    }

    pub fn document_date(&self) -> Option<NaiveDate> {
        self.document_date
    }

    pub fn fiscal_year(&self) -> Option<FiscalYear> {
        self.fiscal_year
    }

    pub fn origin(&self) -> Option<DocumentNumber> {
        self.origin
    }

    pub fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    pub fn payments(&self) -> &[PaymentEntry] {
        &self.payments
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn totals(&self) -> &DocumentTotals {
        &self.totals
    }

    pub fn paid_total(&self) -> Decimal {
        paid_total(&self.payments)
    }

    /// What remains to be paid, floored at zero.
    pub fn outstanding_amount(&self) -> Decimal {
        (self.totals.total_gross - self.paid_total()).max(Decimal::ZERO)
    }

    /// Whether the repository may delete this invoice.
    ///
    /// Deletion is blocked as soon as any payment exists, independently of
    /// the status machine's view.
    pub fn can_delete(&self) -> bool {
        self.created && self.payments.is_empty() && self.status.is_deletable()
    }

    fn next_line_no(&self) -> u32 {
        self.lines
            .iter()
            .map(DocumentLine::line_no)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn next_payment_no(&self) -> u32 {
        self.payments
            .iter()
            .map(|entry| entry.payment_no)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Re-derive the settlement status once the invoice has left draft.
    fn resettle(&mut self) {
        if self.status != InvoiceStatus::Draft {
            self.status = settle(paid_total(&self.payments), self.totals.total_gross);
        }
    }
}

impl AggregateRoot for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInvoice {
    pub invoice_id: InvoiceId,
    pub direction: InvoiceDirection,
    pub number: DocumentNumber,
    pub party: Option<PartyRef>,
    pub document_date: NaiveDate,
    pub fiscal_year: FiscalYear,
    pub origin: Option<DocumentNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddInvoiceLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInvoiceLine {
    pub invoice_id: InvoiceId,
    pub input: LineInput,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveInvoiceLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveInvoiceLine {
    pub invoice_id: InvoiceId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeInvoiceParty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInvoiceParty {
    pub invoice_id: InvoiceId,
    pub party: PartyRef,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ValidateInvoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateInvoice {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub invoice_id: InvoiceId,
    pub payment: Payment,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemovePayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovePayment {
    pub invoice_id: InvoiceId,
    pub payment_no: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceCommand {
    Open(OpenInvoice),
    AddLine(AddInvoiceLine),
    RemoveLine(RemoveInvoiceLine),
    ChangeParty(ChangeInvoiceParty),
    Validate(ValidateInvoice),
    RecordPayment(RecordPayment),
    RemovePayment(RemovePayment),
}

/// Event: InvoiceOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceOpened {
    pub invoice_id: InvoiceId,
    pub direction: InvoiceDirection,
    pub number: DocumentNumber,
    pub party: Option<PartyRef>,
    pub document_date: NaiveDate,
    pub fiscal_year: FiscalYear,
    pub origin: Option<DocumentNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceLineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineAdded {
    pub invoice_id: InvoiceId,
    pub line: DocumentLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceLineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineRemoved {
    pub invoice_id: InvoiceId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoicePartyChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePartyChanged {
    pub invoice_id: InvoiceId,
    pub party: PartyRef,
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceValidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceValidated {
    pub invoice_id: InvoiceId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub invoice_id: InvoiceId,
    pub entry: PaymentEntry,
    pub new_paid_total: Decimal,
    pub new_status: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRemoved {
    pub invoice_id: InvoiceId,
    pub payment_no: u32,
    pub new_paid_total: Decimal,
    pub new_status: InvoiceStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceOpened(InvoiceOpened),
    InvoiceLineAdded(InvoiceLineAdded),
    InvoiceLineRemoved(InvoiceLineRemoved),
    InvoicePartyChanged(InvoicePartyChanged),
    InvoiceValidated(InvoiceValidated),
    PaymentRecorded(PaymentRecorded),
    PaymentRemoved(PaymentRemoved),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceOpened(_) => "invoicing.invoice.opened",
            InvoiceEvent::InvoiceLineAdded(_) => "invoicing.invoice.line_added",
            InvoiceEvent::InvoiceLineRemoved(_) => "invoicing.invoice.line_removed",
            InvoiceEvent::InvoicePartyChanged(_) => "invoicing.invoice.party_changed",
            InvoiceEvent::InvoiceValidated(_) => "invoicing.invoice.validated",
            InvoiceEvent::PaymentRecorded(_) => "invoicing.invoice.payment_recorded",
            InvoiceEvent::PaymentRemoved(_) => "invoicing.invoice.payment_removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceOpened(e) => e.occurred_at,
            InvoiceEvent::InvoiceLineAdded(e) => e.occurred_at,
            InvoiceEvent::InvoiceLineRemoved(e) => e.occurred_at,
            InvoiceEvent::InvoicePartyChanged(e) => e.occurred_at,
            InvoiceEvent::InvoiceValidated(e) => e.occurred_at,
            InvoiceEvent::PaymentRecorded(e) => e.occurred_at,
            InvoiceEvent::PaymentRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Invoice {
    type Command = InvoiceCommand;
    type Event = InvoiceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InvoiceEvent::InvoiceOpened(e) => {
                self.id = e.invoice_id;
                self.direction = e.direction;
                self.number = Some(e.number);
                self.party = e.party.clone();
                self.document_date = Some(e.document_date);
                self.fiscal_year = Some(e.fiscal_year);
                self.origin = e.origin;
                self.lines.clear();
                self.payments.clear();
                self.status = InvoiceStatus::Draft;
                self.totals = DocumentTotals::zero();
                self.created = true;
            }
            InvoiceEvent::InvoiceLineAdded(e) => {
                self.lines.push(e.line.clone());
                self.totals = DocumentTotals::from_lines(&self.lines);
                self.resettle();
            }
            InvoiceEvent::InvoiceLineRemoved(e) => {
                self.lines.retain(|line| line.line_no() != e.line_no);
                self.totals = DocumentTotals::from_lines(&self.lines);
                self.resettle();
            }
            InvoiceEvent::InvoicePartyChanged(e) => {
                self.party = Some(e.party.clone());
            }
            InvoiceEvent::InvoiceValidated(_) => {
                self.status = InvoiceStatus::Validated;
                self.resettle();
            }
            InvoiceEvent::PaymentRecorded(e) => {
                self.payments.push(e.entry.clone());
                self.status = e.new_status;
            }
            InvoiceEvent::PaymentRemoved(e) => {
                self.payments
                    .retain(|entry| entry.payment_no != e.payment_no);
                self.status = e.new_status;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InvoiceCommand::Open(cmd) => self.handle_open(cmd),
            InvoiceCommand::AddLine(cmd) => self.handle_add_line(cmd),
            InvoiceCommand::RemoveLine(cmd) => self.handle_remove_line(cmd),
            InvoiceCommand::ChangeParty(cmd) => self.handle_change_party(cmd),
            InvoiceCommand::Validate(cmd) => self.handle_validate(cmd),
            InvoiceCommand::RecordPayment(cmd) => self.handle_record_payment(cmd),
            InvoiceCommand::RemovePayment(cmd) => self.handle_remove_payment(cmd),
        }
    }
}

impl Invoice {
    fn ensure_invoice_id(&self, invoice_id: InvoiceId) -> DomainResult<()> {
        if self.id != invoice_id {
            return Err(DomainError::invariant("invoice_id mismatch"));
        }
        Ok(())
    }

    fn ensure_editable(&self) -> DomainResult<()> {
        if !self.status.is_editable() {
            return Err(DomainError::unauthorized(
                "invoice is paid and can no longer be modified",
            ));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenInvoice) -> DomainResult<Vec<InvoiceEvent>> {
        if self.created {
            return Err(DomainError::conflict("invoice already exists"));
        }
        if cmd.number.value() == 0 {
            return Err(DomainError::validation("invoice number must be positive"));
        }

        Ok(vec![InvoiceEvent::InvoiceOpened(InvoiceOpened {
            invoice_id: cmd.invoice_id,
            direction: cmd.direction,
            number: cmd.number,
            party: cmd.party.clone(),
            document_date: cmd.document_date,
            fiscal_year: cmd.fiscal_year,
            origin: cmd.origin,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddInvoiceLine) -> DomainResult<Vec<InvoiceEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;
        self.ensure_editable()?;

        let line = DocumentLine::compute(self.next_line_no(), cmd.input.clone())?;

        Ok(vec![InvoiceEvent::InvoiceLineAdded(InvoiceLineAdded {
            invoice_id: cmd.invoice_id,
            line,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_line(&self, cmd: &RemoveInvoiceLine) -> DomainResult<Vec<InvoiceEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;
        self.ensure_editable()?;

        if !self.lines.iter().any(|line| line.line_no() == cmd.line_no) {
            return Err(DomainError::not_found());
        }

        Ok(vec![InvoiceEvent::InvoiceLineRemoved(InvoiceLineRemoved {
            invoice_id: cmd.invoice_id,
            line_no: cmd.line_no,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_party(&self, cmd: &ChangeInvoiceParty) -> DomainResult<Vec<InvoiceEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;
        self.ensure_editable()?;

        Ok(vec![InvoiceEvent::InvoicePartyChanged(
            InvoicePartyChanged {
                invoice_id: cmd.invoice_id,
                party: cmd.party.clone(),
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_validate(&self, cmd: &ValidateInvoice) -> DomainResult<Vec<InvoiceEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        if !self.status.can_transition(InvoiceStatus::Validated) {
            return Err(DomainError::unauthorized(format!(
                "cannot validate an invoice that is {}",
                self.status.label()
            )));
        }
        if self.party.is_none() {
            return Err(DomainError::validation("invoice requires a party"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation("invoice has no lines"));
        }

        Ok(vec![InvoiceEvent::InvoiceValidated(InvoiceValidated {
            invoice_id: cmd.invoice_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_payment(&self, cmd: &RecordPayment) -> DomainResult<Vec<InvoiceEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        if self.status == InvoiceStatus::Draft {
            return Err(DomainError::unauthorized(
                "cannot record a payment on a draft invoice",
            ));
        }
        if cmd.payment.amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }

        // Overflow check happens before any mutation: a rejected payment
        // leaves the invoice untouched.
        let new_paid_total = self.paid_total() + cmd.payment.amount;
        if new_paid_total > self.totals.total_gross + gescom_core::settlement_epsilon() {
            return Err(DomainError::invariant(
                "payments would exceed the invoice total",
            ));
        }

        let entry = PaymentEntry {
            payment_no: self.next_payment_no(),
            payment: cmd.payment.clone(),
        };

        Ok(vec![InvoiceEvent::PaymentRecorded(PaymentRecorded {
            invoice_id: cmd.invoice_id,
            entry,
            new_paid_total,
            new_status: settle(new_paid_total, self.totals.total_gross),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_payment(&self, cmd: &RemovePayment) -> DomainResult<Vec<InvoiceEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_invoice_id(cmd.invoice_id)?;

        let removed = self
            .payments
            .iter()
            .find(|entry| entry.payment_no == cmd.payment_no)
            .ok_or_else(DomainError::not_found)?;

        let new_paid_total = self.paid_total() - removed.payment.amount;

        Ok(vec![InvoiceEvent::PaymentRemoved(PaymentRemoved {
            invoice_id: cmd.invoice_id,
            payment_no: cmd.payment_no,
            new_paid_total,
            new_status: settle(new_paid_total, self.totals.total_gross),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use gescom_catalog::ArticleRef;
    use gescom_core::Rate;
    use gescom_parties::PartyId;

    use crate::payment::PaymentKind;

    fn test_invoice_id() -> InvoiceId {
        InvoiceId::new(AggregateId::new())
    }

    fn test_party() -> PartyRef {
        PartyRef::new(PartyId::new(AggregateId::new()), "Société ABC")
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn line_input(quantity: Decimal, unit_price: Decimal, tax: Decimal) -> LineInput {
        LineInput {
            article_ref: ArticleRef::new("ART001").unwrap(),
            label: "Article A".to_string(),
            quantity,
            unit_price,
            discount: Rate::default(),
            tax_rate: Rate::tax(tax).unwrap(),
        }
    }

    fn cash(amount: Decimal) -> Payment {
        Payment {
            kind: PaymentKind::Cash,
            amount,
            date: test_date(),
            reference: None,
            bank: None,
            due_date: None,
        }
    }

    fn run(invoice: &mut Invoice, cmd: InvoiceCommand) {
        for event in invoice.handle(&cmd).unwrap() {
            invoice.apply(&event);
        }
    }

    /// A validated sales invoice with a gross total of 500.000.
    fn validated_invoice_of_500() -> Invoice {
        let invoice_id = test_invoice_id();
        let mut invoice = Invoice::empty(invoice_id);
        run(
            &mut invoice,
            InvoiceCommand::Open(OpenInvoice {
                invoice_id,
                direction: InvoiceDirection::Sale,
                number: DocumentNumber::new(1),
                party: Some(test_party()),
                document_date: test_date(),
                fiscal_year: FiscalYear::new(2024),
                origin: None,
                occurred_at: test_time(),
            }),
        );
        run(
            &mut invoice,
            InvoiceCommand::AddLine(AddInvoiceLine {
                invoice_id,
                input: line_input(dec!(5), dec!(100), dec!(0)),
                occurred_at: test_time(),
            }),
        );
        run(
            &mut invoice,
            InvoiceCommand::Validate(ValidateInvoice {
                invoice_id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(invoice.totals().total_gross, dec!(500));
        invoice
    }

    fn record(invoice: &mut Invoice, amount: Decimal) {
        run(
            invoice,
            InvoiceCommand::RecordPayment(RecordPayment {
                invoice_id: invoice.id_typed(),
                payment: cash(amount),
                occurred_at: test_time(),
            }),
        );
    }

    #[test]
    fn open_invoice_emits_opened_event_with_direction() {
        let invoice_id = test_invoice_id();
        let invoice = Invoice::empty(invoice_id);
        let events = invoice
            .handle(&InvoiceCommand::Open(OpenInvoice {
                invoice_id,
                direction: InvoiceDirection::Purchase,
                number: DocumentNumber::new(4),
                party: None,
                document_date: test_date(),
                fiscal_year: FiscalYear::new(2024),
                origin: None,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            InvoiceEvent::InvoiceOpened(e) => {
                assert_eq!(e.invoice_id, invoice_id);
                assert_eq!(e.direction, InvoiceDirection::Purchase);
                assert_eq!(e.number, DocumentNumber::new(4));
            }
            _ => panic!("Expected InvoiceOpened event"),
        }
    }

    #[test]
    fn validate_requires_party_and_lines() {
        let invoice_id = test_invoice_id();
        let mut invoice = Invoice::empty(invoice_id);
        run(
            &mut invoice,
            InvoiceCommand::Open(OpenInvoice {
                invoice_id,
                direction: InvoiceDirection::Sale,
                number: DocumentNumber::new(1),
                party: None,
                document_date: test_date(),
                fiscal_year: FiscalYear::new(2024),
                origin: None,
                occurred_at: test_time(),
            }),
        );

        let validate = InvoiceCommand::Validate(ValidateInvoice {
            invoice_id,
            occurred_at: test_time(),
        });
        let err = invoice.handle(&validate).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("party") => {}
            _ => panic!("Expected Validation error for missing party"),
        }

        run(
            &mut invoice,
            InvoiceCommand::ChangeParty(ChangeInvoiceParty {
                invoice_id,
                party: test_party(),
                occurred_at: test_time(),
            }),
        );
        let err = invoice.handle(&validate).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("lines") => {}
            _ => panic!("Expected Validation error for empty line set"),
        }
    }

    #[test]
    fn settlement_follows_payments() {
        let mut invoice = validated_invoice_of_500();
        assert_eq!(invoice.status(), InvoiceStatus::Validated);

        record(&mut invoice, dec!(200));
        assert_eq!(invoice.status(), InvoiceStatus::PartiallyPaid);
        assert_eq!(invoice.paid_total(), dec!(200));
        assert_eq!(invoice.outstanding_amount(), dec!(300));

        record(&mut invoice, dec!(300));
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
        assert_eq!(invoice.outstanding_amount(), dec!(0));
    }

    #[test]
    fn payments_cannot_exceed_the_total() {
        let mut invoice = validated_invoice_of_500();
        record(&mut invoice, dec!(500));
        let before = invoice.clone();

        let err = invoice
            .handle(&InvoiceCommand::RecordPayment(RecordPayment {
                invoice_id: invoice.id_typed(),
                payment: cash(dec!(50)),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("exceed") => {}
            _ => panic!("Expected InvariantViolation for overpayment"),
        }
        // Rejected payment leaves state unchanged.
        assert_eq!(invoice, before);
    }

    #[test]
    fn settlement_tolerates_one_millime_short() {
        let mut invoice = validated_invoice_of_500();
        record(&mut invoice, dec!(499.999));
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn payment_on_draft_invoice_is_not_authorized() {
        let invoice_id = test_invoice_id();
        let mut invoice = Invoice::empty(invoice_id);
        run(
            &mut invoice,
            InvoiceCommand::Open(OpenInvoice {
                invoice_id,
                direction: InvoiceDirection::Sale,
                number: DocumentNumber::new(1),
                party: Some(test_party()),
                document_date: test_date(),
                fiscal_year: FiscalYear::new(2024),
                origin: None,
                occurred_at: test_time(),
            }),
        );

        let err = invoice
            .handle(&InvoiceCommand::RecordPayment(RecordPayment {
                invoice_id,
                payment: cash(dec!(10)),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Unauthorized(_) => {}
            _ => panic!("Expected Unauthorized error for paying a draft invoice"),
        }
    }

    #[test]
    fn non_positive_payment_amounts_are_rejected() {
        let invoice = validated_invoice_of_500();
        for amount in [dec!(0), dec!(-25)] {
            let err = invoice
                .handle(&InvoiceCommand::RecordPayment(RecordPayment {
                    invoice_id: invoice.id_typed(),
                    payment: cash(amount),
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                _ => panic!("Expected Validation error for amount {amount}"),
            }
        }
    }

    #[test]
    fn removing_payments_settles_back_down() {
        let mut invoice = validated_invoice_of_500();
        record(&mut invoice, dec!(200));
        record(&mut invoice, dec!(300));
        assert_eq!(invoice.status(), InvoiceStatus::Paid);

        let invoice_id = invoice.id_typed();
        run(
            &mut invoice,
            InvoiceCommand::RemovePayment(RemovePayment {
                invoice_id,
                payment_no: 2,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(invoice.status(), InvoiceStatus::PartiallyPaid);

        run(
            &mut invoice,
            InvoiceCommand::RemovePayment(RemovePayment {
                invoice_id,
                payment_no: 1,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(invoice.status(), InvoiceStatus::Validated);
        assert!(invoice.payments().is_empty());
    }

    #[test]
    fn removing_unknown_payment_reports_not_found() {
        let invoice = validated_invoice_of_500();
        let err = invoice
            .handle(&InvoiceCommand::RemovePayment(RemovePayment {
                invoice_id: invoice.id_typed(),
                payment_no: 7,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound error for unknown payment"),
        }
    }

    #[test]
    fn paid_invoice_can_no_longer_be_edited() {
        let mut invoice = validated_invoice_of_500();
        record(&mut invoice, dec!(500));
        assert_eq!(invoice.status(), InvoiceStatus::Paid);

        let err = invoice
            .handle(&InvoiceCommand::AddLine(AddInvoiceLine {
                invoice_id: invoice.id_typed(),
                input: line_input(dec!(1), dec!(10), dec!(19)),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Unauthorized(_) => {}
            _ => panic!("Expected Unauthorized error for editing a paid invoice"),
        }
    }

    #[test]
    fn partially_paid_invoice_stays_editable_and_resettles_on_line_removal() {
        let invoice_id = test_invoice_id();
        let mut invoice = Invoice::empty(invoice_id);
        run(
            &mut invoice,
            InvoiceCommand::Open(OpenInvoice {
                invoice_id,
                direction: InvoiceDirection::Sale,
                number: DocumentNumber::new(1),
                party: Some(test_party()),
                document_date: test_date(),
                fiscal_year: FiscalYear::new(2024),
                origin: None,
                occurred_at: test_time(),
            }),
        );
        for _ in 0..2 {
            run(
                &mut invoice,
                InvoiceCommand::AddLine(AddInvoiceLine {
                    invoice_id,
                    input: line_input(dec!(5), dec!(100), dec!(0)),
                    occurred_at: test_time(),
                }),
            );
        }
        run(
            &mut invoice,
            InvoiceCommand::Validate(ValidateInvoice {
                invoice_id,
                occurred_at: test_time(),
            }),
        );
        record(&mut invoice, dec!(500));
        assert_eq!(invoice.status(), InvoiceStatus::PartiallyPaid);

        // Dropping a line brings the total down to the paid amount.
        run(
            &mut invoice,
            InvoiceCommand::RemoveLine(RemoveInvoiceLine {
                invoice_id,
                line_no: 2,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(invoice.totals().total_gross, dec!(500));
        assert_eq!(invoice.status(), InvoiceStatus::Paid);
    }

    #[test]
    fn delete_is_blocked_once_a_payment_exists() {
        let mut invoice = validated_invoice_of_500();
        assert!(invoice.can_delete());

        record(&mut invoice, dec!(200));
        assert!(!invoice.can_delete());

        let invoice_id = invoice.id_typed();
        run(
            &mut invoice,
            InvoiceCommand::RemovePayment(RemovePayment {
                invoice_id,
                payment_no: 1,
                occurred_at: test_time(),
            }),
        );
        assert!(invoice.can_delete());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let invoice = validated_invoice_of_500();
        let before = invoice.clone();

        let cmd = InvoiceCommand::RecordPayment(RecordPayment {
            invoice_id: invoice.id_typed(),
            payment: cash(dec!(100)),
            occurred_at: test_time(),
        });
        let events1 = invoice.handle(&cmd).unwrap();
        let events2 = invoice.handle(&cmd).unwrap();

        assert_eq!(invoice, before);
        assert_eq!(events1, events2);
    }
}
