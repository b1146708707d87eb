//! Invoicing: sales and supplier invoices, payments, reconciliation.
//!
//! An invoice is the one document kind carrying payment entries. Once
//! validated its status is a pure function of the payments recorded against
//! the gross total: `paid` within one millime of the total, `partially_paid`
//! in between, `validated` when nothing has been received.

pub mod invoice;
pub mod payment;
pub mod reconcile;

pub use invoice::{
    AddInvoiceLine, ChangeInvoiceParty, Invoice, InvoiceCommand, InvoiceDirection, InvoiceEvent,
    InvoiceId, InvoiceLineAdded, InvoiceLineRemoved, InvoiceOpened, InvoicePartyChanged,
    InvoiceStatus, InvoiceValidated, OpenInvoice, PaymentRecorded, PaymentRemoved, RecordPayment,
    RemoveInvoiceLine, RemovePayment, SALES_INVOICE_KIND, SUPPLIER_INVOICE_KIND, ValidateInvoice,
};
pub use payment::{Payment, PaymentEntry, PaymentKind};
pub use reconcile::{paid_total, settle};
