//! Directory and catalog lookups backed by the in-memory repositories.

use std::sync::Arc;

use gescom_catalog::{Article, ArticleCatalog, ArticleRef};
use gescom_core::DomainResult;
use gescom_parties::{Party, PartyDirectory, PartyId};

use crate::repository::{InMemoryRepository, Repository};

/// Party directory view over the party repository.
#[derive(Clone)]
pub struct InMemoryPartyDirectory {
    parties: Arc<InMemoryRepository<Party>>,
}

impl InMemoryPartyDirectory {
    pub fn new(parties: Arc<InMemoryRepository<Party>>) -> Self {
        Self { parties }
    }
}

impl PartyDirectory for InMemoryPartyDirectory {
    fn find(&self, id: PartyId) -> DomainResult<Option<Party>> {
        self.parties.get(&id)
    }
}

/// Article catalog view over the article repository.
///
/// Lookup is by business reference, so this scans the stored set. Fine for
/// an in-memory catalog.
#[derive(Clone)]
pub struct InMemoryArticleCatalog {
    articles: Arc<InMemoryRepository<Article>>,
}

impl InMemoryArticleCatalog {
    pub fn new(articles: Arc<InMemoryRepository<Article>>) -> Self {
        Self { articles }
    }
}

impl ArticleCatalog for InMemoryArticleCatalog {
    fn find(&self, reference: &ArticleRef) -> DomainResult<Option<Article>> {
        Ok(self
            .articles
            .list()?
            .into_iter()
            .find(|article| article.reference() == Some(reference)))
    }
}
