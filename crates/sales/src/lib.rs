//! Sales documents: quotes and delivery notes.
//!
//! A quote is validated, then transformed into a delivery note; the delivery
//! note is in turn validated and invoiced. Each step is a status machine over
//! the shared document aggregate, plus the transformation services that carry
//! party, lines and origin number onto the successor document.

pub mod delivery_note;
pub mod quote;
pub mod transform;

pub use delivery_note::{
    DELIVERY_NOTE_KIND, DeliveryNote, DeliveryNoteCommand, DeliveryNoteEvent, DeliveryNoteStatus,
};
pub use quote::{QUOTE_KIND, Quote, QuoteCommand, QuoteEvent, QuoteStatus};
pub use transform::{QuoteTransformation, invoice_delivery_note, transform_quote};
