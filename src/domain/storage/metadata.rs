//! Identity metadata and keys shared by every stored entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::Kind;
use crate::domain::DomainError;

/// Identity and bookkeeping fields common to all entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl Metadata {
    /// Creates metadata stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            name: name.into(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Carries creation time and version forward from a previous revision
    pub fn update_from(&mut self, previous: &Metadata) {
        self.created_at = previous.created_at;
        self.updated_at = Utc::now();
        self.version = previous.version.saturating_add(1);
    }
}

/// Metadata of an entity living inside a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub project: String,
}

impl ProjectMetadata {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: Metadata::new(name),
            project: project.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Identity key of an entity within its kind
///
/// Project-scoped kinds are addressed by `(project, name)`, global kinds by `name` alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    project: Option<String>,
    name: String,
}

impl EntityKey {
    /// Builds the key of a project-scoped entity
    pub fn project(project: impl Into<String>, name: impl Into<String>) -> Result<Self, DomainError> {
        let project = project.into();
        let name = name.into();

        if project.is_empty() {
            return Err(DomainError::validation("Project cannot be empty"));
        }

        Self::validate_name(&name)?;

        Ok(Self {
            project: Some(project),
            name,
        })
    }

    /// Builds the key of a global entity
    pub fn global(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        Self::validate_name(&name)?;

        Ok(Self {
            project: None,
            name,
        })
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::validation("Name cannot be empty"));
        }
        Ok(())
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fails unless the key shape matches how `kind` is addressed
    pub fn ensure_addresses(&self, kind: Kind) -> Result<(), DomainError> {
        match (kind.is_project_scoped(), &self.project) {
            (true, None) => Err(DomainError::validation(format!(
                "{} '{}' requires a project",
                kind, self.name
            ))),
            (false, Some(project)) => Err(DomainError::validation(format!(
                "{} '{}' is global and cannot belong to project '{}'",
                kind, self.name, project
            ))),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{}/{}", project, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
