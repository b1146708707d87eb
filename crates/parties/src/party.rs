use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gescom_catalog::ArticleRef;
use gescom_core::{Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Event};

/// Party identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyId(pub AggregateId);

impl PartyId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PartyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Party kind: client (sales side) or supplier (purchasing side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Client,
    Supplier,
}

/// Party status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    Active,
    Suspended,
}

/// Contact information for a party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Read-only directory lookup used when documents are opened.
pub trait PartyDirectory: Send + Sync {
    fn find(&self, id: PartyId) -> DomainResult<Option<Party>>;
}

/// Aggregate root: Party (client or supplier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    id: PartyId,
    kind: PartyKind,
    /// Company name (raison sociale).
    name: String,
    /// Fiscal registration number (matricule fiscale).
    fiscal_id: String,
    contact: ContactInfo,
    /// Article references this supplier provides (always empty for clients).
    supplied_articles: Vec<ArticleRef>,
    status: PartyStatus,
    version: u64,
    created: bool,
}

impl Party {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: PartyId) -> Self {
        Self {
            id,
            kind: PartyKind::Client,
            name: String::new(),
            fiscal_id: String::new(),
            contact: ContactInfo::default(),
            supplied_articles: Vec::new(),
            status: PartyStatus::Active,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PartyId {
        self.id
    }

    pub fn kind(&self) -> PartyKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fiscal_id(&self) -> &str {
        &self.fiscal_id
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn supplied_articles(&self) -> &[ArticleRef] {
        &self.supplied_articles
    }

    pub fn status(&self) -> PartyStatus {
        self.status
    }

    /// Invariant helper: whether this party may appear on new documents.
    ///
    /// Suspended parties cannot transact.
    pub fn can_transact(&self) -> bool {
        self.status == PartyStatus::Active
    }
}

impl AggregateRoot for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterParty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParty {
    pub party_id: PartyId,
    pub kind: PartyKind,
    pub name: String,
    pub fiscal_id: String,
    pub contact: Option<ContactInfo>,
    pub supplied_articles: Vec<ArticleRef>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub party_id: PartyId,
    /// Optional new name (if None, keep existing).
    pub name: Option<String>,
    /// Optional new contact info (if None, keep existing).
    pub contact: Option<ContactInfo>,
    /// Optional new supplied-articles list (if None, keep existing).
    pub supplied_articles: Option<Vec<ArticleRef>>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SuspendParty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendParty {
    pub party_id: PartyId,
    /// Optional human-readable reason for suspension.
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyCommand {
    RegisterParty(RegisterParty),
    UpdateDetails(UpdateDetails),
    SuspendParty(SuspendParty),
}

/// Event: PartyRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRegistered {
    pub party_id: PartyId,
    pub kind: PartyKind,
    pub name: String,
    pub fiscal_id: String,
    pub contact: ContactInfo,
    pub supplied_articles: Vec<ArticleRef>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartyUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyUpdated {
    pub party_id: PartyId,
    pub name: String,
    pub contact: ContactInfo,
    pub supplied_articles: Vec<ArticleRef>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartySuspended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySuspended {
    pub party_id: PartyId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyEvent {
    PartyRegistered(PartyRegistered),
    PartyUpdated(PartyUpdated),
    PartySuspended(PartySuspended),
}

impl Event for PartyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PartyEvent::PartyRegistered(_) => "parties.party.registered",
            PartyEvent::PartyUpdated(_) => "parties.party.updated",
            PartyEvent::PartySuspended(_) => "parties.party.suspended",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PartyEvent::PartyRegistered(e) => e.occurred_at,
            PartyEvent::PartyUpdated(e) => e.occurred_at,
            PartyEvent::PartySuspended(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Party {
    type Command = PartyCommand;
    type Event = PartyEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PartyEvent::PartyRegistered(e) => {
                self.id = e.party_id;
                self.kind = e.kind;
                self.name = e.name.clone();
                self.fiscal_id = e.fiscal_id.clone();
                self.contact = e.contact.clone();
                self.supplied_articles = e.supplied_articles.clone();
                self.status = PartyStatus::Active;
                self.created = true;
            }
            PartyEvent::PartyUpdated(e) => {
                self.name = e.name.clone();
                self.contact = e.contact.clone();
                self.supplied_articles = e.supplied_articles.clone();
            }
            PartyEvent::PartySuspended(_) => {
                self.status = PartyStatus::Suspended;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PartyCommand::RegisterParty(cmd) => self.handle_register(cmd),
            PartyCommand::UpdateDetails(cmd) => self.handle_update(cmd),
            PartyCommand::SuspendParty(cmd) => self.handle_suspend(cmd),
        }
    }
}

impl Party {
    fn ensure_party_id(&self, party_id: PartyId) -> DomainResult<()> {
        if self.id != party_id {
            return Err(DomainError::invariant("party_id mismatch"));
        }
        Ok(())
    }

    fn check_supplied_articles(kind: PartyKind, refs: &[ArticleRef]) -> DomainResult<()> {
        if kind == PartyKind::Client && !refs.is_empty() {
            return Err(DomainError::validation(
                "only suppliers carry supplied articles",
            ));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterParty) -> DomainResult<Vec<PartyEvent>> {
        if self.created {
            return Err(DomainError::conflict("party already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.fiscal_id.trim().is_empty() {
            return Err(DomainError::validation("fiscal id cannot be empty"));
        }
        Self::check_supplied_articles(cmd.kind, &cmd.supplied_articles)?;

        let contact = cmd.contact.clone().unwrap_or_default();

        Ok(vec![PartyEvent::PartyRegistered(PartyRegistered {
            party_id: cmd.party_id,
            kind: cmd.kind,
            name: cmd.name.clone(),
            fiscal_id: cmd.fiscal_id.clone(),
            contact,
            supplied_articles: cmd.supplied_articles.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateDetails) -> DomainResult<Vec<PartyEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_party_id(cmd.party_id)?;

        let new_name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
        if new_name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let new_contact = cmd.contact.clone().unwrap_or_else(|| self.contact.clone());
        let new_supplied = cmd
            .supplied_articles
            .clone()
            .unwrap_or_else(|| self.supplied_articles.clone());
        Self::check_supplied_articles(self.kind, &new_supplied)?;

        Ok(vec![PartyEvent::PartyUpdated(PartyUpdated {
            party_id: cmd.party_id,
            name: new_name,
            contact: new_contact,
            supplied_articles: new_supplied,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_suspend(&self, cmd: &SuspendParty) -> DomainResult<Vec<PartyEvent>> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_party_id(cmd.party_id)?;

        if self.status == PartyStatus::Suspended {
            return Err(DomainError::conflict("party is already suspended"));
        }

        Ok(vec![PartyEvent::PartySuspended(PartySuspended {
            party_id: cmd.party_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_party_id() -> PartyId {
        PartyId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn register_cmd(party_id: PartyId, kind: PartyKind) -> RegisterParty {
        let supplied_articles = match kind {
            PartyKind::Supplier => vec![ArticleRef::new("ART001").unwrap()],
            PartyKind::Client => Vec::new(),
        };
        RegisterParty {
            party_id,
            kind,
            name: "Société ABC".to_string(),
            fiscal_id: "1234567ABC".to_string(),
            contact: None,
            supplied_articles,
            occurred_at: test_time(),
        }
    }

    #[test]
    fn register_party_emits_party_registered_event() {
        let party_id = test_party_id();
        let party = Party::empty(party_id);
        let contact = ContactInfo {
            email: Some("contact@abc.tn".to_string()),
            phone: Some("+216 98 111 222".to_string()),
            address: Some("123 Rue de Tunis, Tunis 1000".to_string()),
        };
        let mut cmd = register_cmd(party_id, PartyKind::Client);
        cmd.contact = Some(contact.clone());

        let events = party.handle(&PartyCommand::RegisterParty(cmd)).unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            PartyEvent::PartyRegistered(e) => {
                assert_eq!(e.party_id, party_id);
                assert_eq!(e.kind, PartyKind::Client);
                assert_eq!(e.name, "Société ABC");
                assert_eq!(e.fiscal_id, "1234567ABC");
                assert_eq!(e.contact, contact);
            }
            _ => panic!("Expected PartyRegistered event"),
        }
    }

    #[test]
    fn register_party_rejects_blank_fiscal_id() {
        let party_id = test_party_id();
        let party = Party::empty(party_id);
        let mut cmd = register_cmd(party_id, PartyKind::Client);
        cmd.fiscal_id = "   ".to_string();

        let err = party.handle(&PartyCommand::RegisterParty(cmd)).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank fiscal id"),
        }
    }

    #[test]
    fn register_client_rejects_supplied_articles() {
        let party_id = test_party_id();
        let party = Party::empty(party_id);
        let mut cmd = register_cmd(party_id, PartyKind::Client);
        cmd.supplied_articles = vec![ArticleRef::new("ART002").unwrap()];

        let err = party.handle(&PartyCommand::RegisterParty(cmd)).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for client with supplied articles"),
        }
    }

    #[test]
    fn register_party_rejects_duplicate_creation() {
        let party_id = test_party_id();
        let mut party = Party::empty(party_id);
        let cmd = register_cmd(party_id, PartyKind::Supplier);
        let events = party
            .handle(&PartyCommand::RegisterParty(cmd.clone()))
            .unwrap();
        party.apply(&events[0]);

        let err = party.handle(&PartyCommand::RegisterParty(cmd)).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate creation"),
        }
    }

    #[test]
    fn update_details_replaces_name_and_supplied_articles() {
        let party_id = test_party_id();
        let mut party = Party::empty(party_id);
        let events = party
            .handle(&PartyCommand::RegisterParty(register_cmd(
                party_id,
                PartyKind::Supplier,
            )))
            .unwrap();
        party.apply(&events[0]);

        let refs = vec![
            ArticleRef::new("ART001").unwrap(),
            ArticleRef::new("ART005").unwrap(),
        ];
        let events = party
            .handle(&PartyCommand::UpdateDetails(UpdateDetails {
                party_id,
                name: Some("Fournisseur Nord".to_string()),
                contact: None,
                supplied_articles: Some(refs.clone()),
                occurred_at: test_time(),
            }))
            .unwrap();
        party.apply(&events[0]);

        assert_eq!(party.name(), "Fournisseur Nord");
        assert_eq!(party.supplied_articles(), refs.as_slice());
        // Fiscal id never changes after registration.
        assert_eq!(party.fiscal_id(), "1234567ABC");
    }

    #[test]
    fn suspended_party_cannot_transact_and_cannot_be_resuspended() {
        let party_id = test_party_id();
        let mut party = Party::empty(party_id);
        let events = party
            .handle(&PartyCommand::RegisterParty(register_cmd(
                party_id,
                PartyKind::Client,
            )))
            .unwrap();
        party.apply(&events[0]);
        assert!(party.can_transact());

        let suspend = SuspendParty {
            party_id,
            reason: Some("Impayés".to_string()),
            occurred_at: test_time(),
        };
        let events = party
            .handle(&PartyCommand::SuspendParty(suspend.clone()))
            .unwrap();
        party.apply(&events[0]);
        assert_eq!(party.status(), PartyStatus::Suspended);
        assert!(!party.can_transact());

        let err = party
            .handle(&PartyCommand::SuspendParty(suspend))
            .unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for already suspended party"),
        }
    }

    #[test]
    fn commands_on_unknown_party_report_not_found() {
        let party = Party::empty(test_party_id());
        let err = party
            .handle(&PartyCommand::SuspendParty(SuspendParty {
                party_id: test_party_id(),
                reason: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound error for unknown party"),
        }
    }

    #[test]
    fn version_increments_on_apply() {
        let party_id = test_party_id();
        let mut party = Party::empty(party_id);
        assert_eq!(party.version(), 0);

        let events = party
            .handle(&PartyCommand::RegisterParty(register_cmd(
                party_id,
                PartyKind::Client,
            )))
            .unwrap();
        party.apply(&events[0]);
        assert_eq!(party.version(), 1);

        let events = party
            .handle(&PartyCommand::SuspendParty(SuspendParty {
                party_id,
                reason: None,
                occurred_at: test_time(),
            }))
            .unwrap();
        party.apply(&events[0]);
        assert_eq!(party.version(), 2);
    }
}
