//! Generic commercial-document aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use gescom_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Event};
use gescom_parties::PartyId;

use crate::lifecycle::Lifecycle;
use crate::line::{DocumentLine, LineInput};
use crate::number::{DocumentNumber, FiscalYear};
use crate::totals::DocumentTotals;

/// Document identifier, shared by every document kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub AggregateId);

impl DocumentId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Party snapshot carried on the document header.
///
/// The name is denormalized at open time so a later directory rename does
/// not rewrite issued documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRef {
    pub id: PartyId,
    pub name: String,
}

impl PartyRef {
    pub fn new(id: PartyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl gescom_core::ValueObject for PartyRef {}

/// Generic aggregate root: a commercial document of kind `S`.
///
/// The status machine `S` is the only thing a document kind configures;
/// line computation, totals derivation and the mutation guards are shared.
/// Totals are recomputed inside [`Aggregate::apply`] on every line event and
/// are never settable from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<S> {
    id: DocumentId,
    number: Option<DocumentNumber>,
    party: Option<PartyRef>,
    document_date: Option<NaiveDate>,
    fiscal_year: Option<FiscalYear>,
    /// Number of the document this one was transformed from, if any.
    origin: Option<DocumentNumber>,
    lines: Vec<DocumentLine>,
    status: S,
    totals: DocumentTotals,
    version: u64,
    created: bool,
}

impl<S: Lifecycle> Document<S> {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: DocumentId) -> Self {
        Self {
            id,
            number: None,
            party: None,
            document_date: None,
            fiscal_year: None,
            origin: None,
            lines: Vec::new(),
            status: S::initial(),
            totals: DocumentTotals::zero(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> DocumentId {
        self.id
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

    pub fn status(&self) -> S {
        self.status
    }

    pub fn totals(&self) -> &DocumentTotals {
        &self.totals
    }

    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// Whether the repository may delete this document.
    pub fn can_delete(&self) -> bool {
        self.created && self.status.is_deletable()
    }
}

/// Command: OpenDocument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDocument {
    pub document_id: DocumentId,
    pub number: DocumentNumber,
    pub party: Option<PartyRef>,
    pub document_date: NaiveDate,
    pub fiscal_year: FiscalYear,
    pub origin: Option<DocumentNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLine {
    pub document_id: DocumentId,
    pub input: LineInput,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLine {
    pub document_id: DocumentId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeParty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeParty {
    pub document_id: DocumentId,
    pub party: PartyRef,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Transition (status move, e.g. validate or transform).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition<S> {
    pub document_id: DocumentId,
    pub to: S,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentCommand<S> {
    Open(OpenDocument),
    AddLine(AddLine),
    RemoveLine(RemoveLine),
    ChangeParty(ChangeParty),
    Transition(Transition<S>),
}

/// Event: DocumentOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOpened {
    pub document_id: DocumentId,
    pub number: DocumentNumber,
    pub party: Option<PartyRef>,
    pub document_date: NaiveDate,
    pub fiscal_year: FiscalYear,
    pub origin: Option<DocumentNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineAdded. The line is computed in `handle`, so the event carries
/// the derived amounts as facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub document_id: DocumentId,
    pub line: DocumentLine,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRemoved {
    pub document_id: DocumentId,
    pub line_no: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartyChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyChanged {
    pub document_id: DocumentId,
    pub party: PartyRef,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged<S> {
    pub document_id: DocumentId,
    pub from: S,
    pub to: S,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentEvent<S> {
    Opened(DocumentOpened),
    LineAdded(LineAdded),
    LineRemoved(LineRemoved),
    PartyChanged(PartyChanged),
    StatusChanged(StatusChanged<S>),
}

impl<S: Lifecycle> Event for DocumentEvent<S> {
    fn event_type(&self) -> &'static str {
        match self {
            DocumentEvent::Opened(_) => "document.opened",
            DocumentEvent::LineAdded(_) => "document.line_added",
            DocumentEvent::LineRemoved(_) => "document.line_removed",
            DocumentEvent::PartyChanged(_) => "document.party_changed",
            DocumentEvent::StatusChanged(_) => "document.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DocumentEvent::Opened(e) => e.occurred_at,
            DocumentEvent::LineAdded(e) => e.occurred_at,
            DocumentEvent::LineRemoved(e) => e.occurred_at,
            DocumentEvent::PartyChanged(e) => e.occurred_at,
            DocumentEvent::StatusChanged(e) => e.occurred_at,
        }
    }
}

impl<S: Lifecycle> AggregateRoot for Document<S> {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl<S: Lifecycle> Aggregate for Document<S> {
    type Command = DocumentCommand<S>;
    type Event = DocumentEvent<S>;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DocumentEvent::Opened(e) => {
                self.id = e.document_id;
                self.number = Some(e.number);
                self.party = e.party.clone();
                self.document_date = Some(e.document_date);
                self.fiscal_year = Some(e.fiscal_year);
                self.origin = e.origin;
                self.lines.clear();
                self.status = S::initial();
                self.totals = DocumentTotals::zero();
                self.created = true;
            }
            DocumentEvent::LineAdded(e) => {
                self.lines.push(e.line.clone());
                self.totals = DocumentTotals::from_lines(&self.lines);
            }
            DocumentEvent::LineRemoved(e) => {
                self.lines.retain(|line| line.line_no() != e.line_no);
                self.totals = DocumentTotals::from_lines(&self.lines);
            }
            DocumentEvent::PartyChanged(e) => {
                self.party = Some(e.party.clone());
            }
            DocumentEvent::StatusChanged(e) => {
                self.status = e.to;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DocumentCommand::Open(cmd) => self.handle_open(cmd),
            DocumentCommand::AddLine(cmd) => self.handle_add_line(cmd),
            DocumentCommand::RemoveLine(cmd) => self.handle_remove_line(cmd),
            DocumentCommand::ChangeParty(cmd) => self.handle_change_party(cmd),
            DocumentCommand::Transition(cmd) => self.handle_transition(cmd),
        }
    }
}

impl<S: Lifecycle> Document<S> {
    fn ensure_document_id(&self, document_id: DocumentId) -> DomainResult<()> {
        if self.id != document_id {
            return Err(DomainError::invariant("document_id mismatch"));
        }
        Ok(())
    }

    fn ensure_editable(&self) -> DomainResult<()> {
        if !self.status.is_editable() {
            return Err(DomainError::unauthorized(format!(
                "document is {} and can no longer be modified",
                self.status.label()
            )));
        }
        Ok(())
    }

    fn next_line_no(&self) -> u32 {
        self.lines
            .iter()
            .map(DocumentLine::line_no)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn handle_open(&self, cmd: &OpenDocument) -> DomainResult<Vec<DocumentEvent<S>>> {
        if self.created {
            return Err(DomainError::conflict("document already exists"));
        }
        if cmd.number.value() == 0 {
            return Err(DomainError::validation("document number must be positive"));
        }

        Ok(vec![DocumentEvent::Opened(DocumentOpened {
            document_id: cmd.document_id,
            number: cmd.number,
            party: cmd.party.clone(),
            document_date: cmd.document_date,
            fiscal_year: cmd.fiscal_year,
            origin: cmd.origin,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_line(&self, cmd: &AddLine) -> DomainResult<Vec<DocumentEvent<S>>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_document_id(cmd.document_id)?;
        self.ensure_editable()?;

        let line = DocumentLine::compute(self.next_line_no(), cmd.input.clone())?;

        Ok(vec![DocumentEvent::LineAdded(LineAdded {
            document_id: cmd.document_id,
            line,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_line(&self, cmd: &RemoveLine) -> DomainResult<Vec<DocumentEvent<S>>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_document_id(cmd.document_id)?;
        self.ensure_editable()?;

        if !self.lines.iter().any(|line| line.line_no() == cmd.line_no) {
            return Err(DomainError::not_found());
        }

        Ok(vec![DocumentEvent::LineRemoved(LineRemoved {
            document_id: cmd.document_id,
            line_no: cmd.line_no,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_party(&self, cmd: &ChangeParty) -> DomainResult<Vec<DocumentEvent<S>>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_document_id(cmd.document_id)?;
        self.ensure_editable()?;

        Ok(vec![DocumentEvent::PartyChanged(PartyChanged {
            document_id: cmd.document_id,
            party: cmd.party.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_transition(&self, cmd: &Transition<S>) -> DomainResult<Vec<DocumentEvent<S>>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_document_id(cmd.document_id)?;

        if !self.status.can_transition(cmd.to) {
            return Err(DomainError::unauthorized(format!(
                "cannot move document from {} to {}",
                self.status.label(),
                cmd.to.label()
            )));
        }

        // Leaving the draft state is the validation gate: the document must
        // name a party and carry at least one line.
        if self.status == S::initial() {
            if self.party.is_none() {
                return Err(DomainError::validation("document requires a party"));
            }
            if self.lines.is_empty() {
                return Err(DomainError::validation("document has no lines"));
            }
        }

        Ok(vec![DocumentEvent::StatusChanged(StatusChanged {
            document_id: cmd.document_id,
            from: self.status,
            to: cmd.to,
            occurred_at: cmd.occurred_at,
        })])
    }
}
