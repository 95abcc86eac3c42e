//! Storage entity traits and partial projections

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::kind::Kind;
use super::metadata::{EntityKey, Metadata, ProjectMetadata};
use crate::domain::DomainError;

/// Minimal common view of any entity: its kind and identity fields
///
/// Dyn-compatible so listings of heterogeneous or partially decoded
/// entities can be returned as `Box<dyn Entity>`.
pub trait Entity: Debug + Send + Sync {
    /// The kind tag carried by the entity itself
    fn kind(&self) -> Kind;

    fn metadata(&self) -> &Metadata;

    /// Project the entity belongs to, `None` for global entities
    fn project(&self) -> Option<&str> {
        None
    }

    /// Builds the identity key from the entity's own fields
    fn key(&self) -> Result<EntityKey, DomainError> {
        match self.project() {
            Some(project) => EntityKey::project(project, self.metadata().name.as_str()),
            None => EntityKey::global(self.metadata().name.as_str()),
        }
    }
}

/// Trait for full entities that can be written to and decoded from the store
pub trait StorageEntity: Entity + Clone + Serialize + DeserializeOwned + 'static {
    /// Kind every value of this type must carry
    const KIND: Kind;
}

/// Metadata-only projection of a global entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialEntity {
    pub kind: Kind,
    pub metadata: Metadata,
}

impl Entity for PartialEntity {
    fn kind(&self) -> Kind {
        self.kind
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Metadata-only projection of a project-scoped entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialProjectEntity {
    pub kind: Kind,
    pub metadata: ProjectMetadata,
}

impl Entity for PartialProjectEntity {
    fn kind(&self) -> Kind {
        self.kind
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata.metadata
    }

    fn project(&self) -> Option<&str> {
        Some(&self.metadata.project)
    }
}
