//! Parties domain module (clients and suppliers).
//!
//! The party directory is the read-only lookup the document services consult
//! before opening a commercial document: unknown or suspended parties cannot
//! transact. Suppliers additionally carry the list of article references they
//! supply, which feeds the reorder proposal.

pub mod party;

pub use party::{
    ContactInfo, Party, PartyCommand, PartyDirectory, PartyEvent, PartyId, PartyKind,
    PartyRegistered, PartyStatus, PartySuspended, PartyUpdated, RegisterParty, SuspendParty,
    UpdateDetails,
};
