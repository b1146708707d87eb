//! Shared commercial-document machinery.
//!
//! Quotes, delivery notes, purchase orders and goods receipts are all the
//! same document shape: a numbered, dated record for a party, carrying
//! computed lines, derived totals and a small status machine gating every
//! mutation. This crate holds that shape once (the line total calculator,
//! the document aggregator, the [`Lifecycle`] trait and the generic
//! [`Document`] aggregate) so each document kind only configures its own
//! status transitions.

pub mod document;
pub mod lifecycle;
pub mod line;
pub mod number;
pub mod totals;

pub use document::{
    AddLine, ChangeParty, Document, DocumentCommand, DocumentEvent, DocumentId, DocumentOpened,
    LineAdded, LineRemoved, OpenDocument, PartyChanged, PartyRef, RemoveLine, StatusChanged,
    Transition,
};
pub use lifecycle::Lifecycle;
pub use line::{DocumentLine, LineInput};
pub use number::{DocumentNumber, FiscalYear, NumberSequence};
pub use totals::DocumentTotals;
