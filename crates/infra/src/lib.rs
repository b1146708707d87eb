//! In-memory infrastructure: repositories, sequences, directory adapters and
//! the application services wiring the document domain together.
//!
//! Everything here is synchronous and process-local. The repository and
//! sequence traits are the seams a real store would plug into; the in-memory
//! implementations back the tests and the reference wiring.

pub mod directory;
pub mod repository;
pub mod sequences;
pub mod services;


pub use directory::{InMemoryArticleCatalog, InMemoryPartyDirectory};
pub use repository::{InMemoryRepository, Repository};
pub use sequences::InMemorySequences;
pub use services::{InvoicingService, PurchasingService, SalesService};
