//! Aggregate repositories.

use std::collections::HashMap;
use std::sync::RwLock;

use gescom_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion};

/// Store of aggregates keyed by id.
///
/// The in-memory implementation backs tests and the reference wiring; a real
/// store implements the same interface. `save` enforces the optimistic
/// [`ExpectedVersion`] check against the currently stored version. Deletion
/// is a plain removal; callers are responsible for consulting the
/// aggregate's delete guard first.
pub trait Repository<A: AggregateRoot>: Send + Sync {
    fn get(&self, id: &A::Id) -> DomainResult<Option<A>>;
    fn save(&self, aggregate: &A, expected: ExpectedVersion) -> DomainResult<()>;
    fn delete(&self, id: &A::Id) -> DomainResult<()>;
    fn list(&self) -> DomainResult<Vec<A>>;
}

/// In-memory repository: a map keyed by aggregate id behind an `RwLock`.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryRepository<A: AggregateRoot> {
    items: RwLock<HashMap<A::Id, A>>,
}

impl<A: AggregateRoot> InMemoryRepository<A> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<A: AggregateRoot> Default for InMemoryRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> DomainError {
    DomainError::conflict("repository lock poisoned")
}

impl<A> Repository<A> for InMemoryRepository<A>
where
    A: AggregateRoot + Clone + Send + Sync,
    A::Id: Send + Sync,
{
    fn get(&self, id: &A::Id) -> DomainResult<Option<A>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(id).cloned())
    }

    fn save(&self, aggregate: &A, expected: ExpectedVersion) -> DomainResult<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let current = items.get(aggregate.id()).map(A::version).unwrap_or(0);
        expected.check(current)?;
        items.insert(aggregate.id().clone(), aggregate.clone());
        Ok(())
    }

    fn delete(&self, id: &A::Id) -> DomainResult<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        if items.remove(id).is_none() {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn list(&self) -> DomainResult<Vec<A>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.values().cloned().collect())
    }
}
