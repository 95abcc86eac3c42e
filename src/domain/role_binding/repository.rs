//! Role binding repository trait

use async_trait::async_trait;

use super::entity::RoleBinding;
use crate::domain::storage::{Entity, Kind, StoreQuery};
use crate::domain::DomainError;

/// Query parameters for listing or bulk-deleting role bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleBindingQuery {
    /// Exact project name, `None` or empty to match every project
    pub project: Option<String>,
    /// Prefix of the binding name, `None` or empty for no restriction
    pub name_prefix: Option<String>,
}

impl RoleBindingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }
}

impl StoreQuery for RoleBindingQuery {
    fn kind(&self) -> Kind {
        Kind::RoleBinding
    }

    fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    fn name_prefix(&self) -> Option<&str> {
        self.name_prefix.as_deref()
    }
}

/// Persistence capabilities for role bindings
///
/// Every operation maps onto exactly one store call. Store errors come back
/// unchanged in kind.
#[async_trait]
pub trait RoleBindingRepository: Send + Sync + std::fmt::Debug {
    /// Create a new role binding, fails with `AlreadyExists` on a duplicate
    async fn create(&self, entity: &RoleBinding) -> Result<(), DomainError>;

    /// Create or replace a role binding
    async fn update(&self, entity: &RoleBinding) -> Result<(), DomainError>;

    /// Delete a role binding, fails with `NotFound` if absent
    async fn delete(&self, project: &str, name: &str) -> Result<(), DomainError>;

    /// Delete every role binding of a project, returning how many were removed
    ///
    /// An empty `project` matches every project and deletes all role bindings,
    /// unlike `get` and `delete` which reject an empty project.
    /// Not atomic: on failure some of the bindings may already be gone.
    async fn delete_all(&self, project: &str) -> Result<usize, DomainError>;

    /// Get a role binding, fails with `NotFound` if absent
    async fn get(&self, project: &str, name: &str) -> Result<RoleBinding, DomainError>;

    /// List role bindings matching the query
    async fn list(&self, query: &RoleBindingQuery) -> Result<Vec<RoleBinding>, DomainError>;

    /// List matching role bindings as undecoded JSON documents
    async fn raw_list(&self, query: &RoleBindingQuery) -> Result<Vec<Vec<u8>>, DomainError>;

    /// List the identity metadata of matching role bindings
    async fn metadata_list(
        &self,
        query: &RoleBindingQuery,
    ) -> Result<Vec<Box<dyn Entity>>, DomainError>;

    /// List the identity metadata of matching role bindings as JSON documents
    async fn raw_metadata_list(
        &self,
        query: &RoleBindingQuery,
    ) -> Result<Vec<Vec<u8>>, DomainError>;
}
