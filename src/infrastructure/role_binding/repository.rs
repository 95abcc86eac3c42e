//! Store-backed role binding repository implementation

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::role_binding::{RoleBinding, RoleBindingQuery, RoleBindingRepository};
use crate::domain::storage::{Entity, EntityKey, Kind, PartialProjectEntity, Store, StoreExt};
use crate::domain::DomainError;

/// Store-backed implementation of RoleBindingRepository
///
/// Holds no state besides the shared store handle and its bound kind, so a
/// single instance can serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct StorageRoleBindingRepository {
    store: Arc<dyn Store>,
    kind: Kind,
}

impl StorageRoleBindingRepository {
    /// Create a new store-backed repository
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            kind: Kind::RoleBinding,
        }
    }
}

#[async_trait]
impl RoleBindingRepository for StorageRoleBindingRepository {
    async fn create(&self, entity: &RoleBinding) -> Result<(), DomainError> {
        debug!(kind = %self.kind, project = ?entity.project(), name = entity.name(), "Creating entity");
        self.store.create_entity(entity).await
    }

    async fn update(&self, entity: &RoleBinding) -> Result<(), DomainError> {
        debug!(kind = %self.kind, project = ?entity.project(), name = entity.name(), "Upserting entity");
        self.store.upsert_entity(entity).await
    }

    async fn delete(&self, project: &str, name: &str) -> Result<(), DomainError> {
        debug!(kind = %self.kind, project, name, "Deleting entity");
        let key = EntityKey::project(project, name)?;
        self.store.delete(self.kind, &key).await
    }

    async fn delete_all(&self, project: &str) -> Result<usize, DomainError> {
        debug!(kind = %self.kind, project, "Deleting all entities of project");
        let query = RoleBindingQuery::new().with_project(project);
        self.store.delete_by_query(&query).await
    }

    async fn get(&self, project: &str, name: &str) -> Result<RoleBinding, DomainError> {
        debug!(kind = %self.kind, project, name, "Getting entity");
        let key = EntityKey::project(project, name)?;
        self.store.get(self.kind, &key).await
    }

    async fn list(&self, query: &RoleBindingQuery) -> Result<Vec<RoleBinding>, DomainError> {
        debug!(kind = %self.kind, ?query, "Listing entities");
        self.store.query(query).await
    }

    async fn raw_list(&self, query: &RoleBindingQuery) -> Result<Vec<Vec<u8>>, DomainError> {
        debug!(kind = %self.kind, ?query, "Listing raw entities");
        self.store.raw_query(query).await
    }

    async fn metadata_list(
        &self,
        query: &RoleBindingQuery,
    ) -> Result<Vec<Box<dyn Entity>>, DomainError> {
        debug!(kind = %self.kind, ?query, "Listing entity metadata");
        let list: Vec<PartialProjectEntity> = self.store.query(query).await?;

        Ok(list
            .into_iter()
            .map(|partial| Box::new(partial) as Box<dyn Entity>)
            .collect())
    }

    async fn raw_metadata_list(
        &self,
        query: &RoleBindingQuery,
    ) -> Result<Vec<Vec<u8>>, DomainError> {
        debug!(kind = %self.kind, ?query, "Listing raw entity metadata");
        self.store.raw_metadata_query(query, self.kind).await
    }
}
