//! Document transformations along the sales chain.

use chrono::{DateTime, Utc};

use gescom_core::{Aggregate, DomainError, DomainResult};
use gescom_documents::{
    AddLine, DocumentCommand, DocumentId, DocumentNumber, OpenDocument, Transition,
};

use crate::delivery_note::{DeliveryNote, DeliveryNoteEvent, DeliveryNoteStatus};
use crate::quote::{Quote, QuoteEvent, QuoteStatus};

/// Outcome of transforming a quote: the facts to record on the quote side
/// and the fully-built successor delivery note.
#[derive(Debug, Clone)]
pub struct QuoteTransformation {
    pub quote_events: Vec<QuoteEvent>,
    pub delivery_note: DeliveryNote,
    pub delivery_note_events: Vec<DeliveryNoteEvent>,
}

/// Transform a validated quote into a delivery note.
///
/// The quote moves to its terminal `Transformed` state; the delivery note is
/// opened for the same party with the quote's lines copied over and the quote
/// number recorded as origin. Dated at the transformation time, not the quote
/// date.
pub fn transform_quote(
    quote: &Quote,
    delivery_note_id: DocumentId,
    delivery_note_number: DocumentNumber,
    occurred_at: DateTime<Utc>,
) -> DomainResult<QuoteTransformation> {
    let quote_events = quote.handle(&DocumentCommand::Transition(Transition {
        document_id: quote.id_typed(),
        to: QuoteStatus::Transformed,
        occurred_at,
    }))?;

    let fiscal_year = quote
        .fiscal_year()
        .ok_or_else(|| DomainError::invariant("quote has no fiscal year"))?;
    let origin = quote.number();

    let mut delivery_note = DeliveryNote::empty(delivery_note_id);
    let mut delivery_note_events = Vec::new();

    let open = DocumentCommand::Open(OpenDocument {
        document_id: delivery_note_id,
        number: delivery_note_number,
        party: quote.party().cloned(),
        document_date: occurred_at.date_naive(),
        fiscal_year,
        origin,
        occurred_at,
    });
    for event in delivery_note.handle(&open)? {
        delivery_note.apply(&event);
        delivery_note_events.push(event);
    }

    for line in quote.lines() {
        let cmd = DocumentCommand::AddLine(AddLine {
            document_id: delivery_note_id,
            input: line.to_input(),
            occurred_at,
        });
        for event in delivery_note.handle(&cmd)? {
            delivery_note.apply(&event);
            delivery_note_events.push(event);
        }
    }

    Ok(QuoteTransformation {
        quote_events,
        delivery_note,
        delivery_note_events,
    })
}

/// Mark a validated delivery note as invoiced.
///
/// The invoice itself is opened by the invoicing side from the returned
/// note's lines; this only records the terminal status move.
pub fn invoice_delivery_note(
    delivery_note: &DeliveryNote,
    occurred_at: DateTime<Utc>,
) -> DomainResult<Vec<DeliveryNoteEvent>> {
    delivery_note.handle(&DocumentCommand::Transition(Transition {
        document_id: delivery_note.id_typed(),
        to: DeliveryNoteStatus::Invoiced,
        occurred_at,
    }))
}
