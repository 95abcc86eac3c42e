//! Role binding entity and related types

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::storage::{
    Entity, EntityKey, Kind, Metadata, PartialProjectEntity, ProjectMetadata, StorageEntity,
};
use crate::domain::DomainError;

/// Kind of principal a role can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SubjectKind {
    #[default]
    User,
}

/// Principal receiving the permissions of the bound role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub name: String,
}

impl Subject {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::User,
            name: name.into(),
        }
    }
}

/// Payload of a role binding: one role, many subjects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RoleBindingSpec {
    pub role: String,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// Role binding entity, scoped to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    kind: Kind,
    metadata: ProjectMetadata,
    spec: RoleBindingSpec,
}

impl RoleBinding {
    /// Create a role binding of `role` inside `project`
    pub fn new(
        project: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let project = project.into();
        let name = name.into();
        EntityKey::project(project.as_str(), name.as_str())?;

        Ok(Self {
            kind: Kind::RoleBinding,
            metadata: ProjectMetadata::new(project, name),
            spec: RoleBindingSpec {
                role: role.into(),
                subjects: Vec::new(),
            },
        })
    }

    /// Add a subject (builder pattern)
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.spec.subjects.push(subject);
        self
    }

    // Getters

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn project_metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn role(&self) -> &str {
        &self.spec.role
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.spec.subjects
    }

    /// Metadata-only projection of this binding
    pub fn to_partial(&self) -> PartialProjectEntity {
        PartialProjectEntity {
            kind: self.kind,
            metadata: self.metadata.clone(),
        }
    }

    // Mutators

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.spec.role = role.into();
        self.touch();
    }

    pub fn add_subject(&mut self, subject: Subject) {
        if !self.spec.subjects.contains(&subject) {
            self.spec.subjects.push(subject);
            self.touch();
        }
    }

    pub fn remove_subject(&mut self, subject: &Subject) {
        let before = self.spec.subjects.len();
        self.spec.subjects.retain(|s| s != subject);

        if self.spec.subjects.len() != before {
            self.touch();
        }
    }

    /// Carry creation time and version over from the stored revision
    pub fn revise_from(&mut self, previous: &RoleBinding) {
        self.metadata.metadata.update_from(&previous.metadata.metadata);
    }

    fn touch(&mut self) {
        self.metadata.metadata.updated_at = Utc::now();
    }
}

impl Entity for RoleBinding {
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

impl StorageEntity for RoleBinding {
    const KIND: Kind = Kind::RoleBinding;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_binding_creation() {
        let binding = RoleBinding::new("perses", "admins", "admin")
            .unwrap()
            .with_subject(Subject::user("alice"));

        assert_eq!(binding.kind(), Kind::RoleBinding);
        assert_eq!(binding.project(), Some("perses"));
        assert_eq!(binding.name(), "admins");
        assert_eq!(binding.role(), "admin");
        assert_eq!(binding.subjects(), &[Subject::user("alice")]);
    }

    #[test]
    fn test_role_binding_invalid_identity() {
        assert!(RoleBinding::new("", "admins", "admin").is_err());
        assert!(RoleBinding::new("perses", "", "admin").is_err());
    }

    #[test]
    fn test_add_subject_is_idempotent() {
        let mut binding = RoleBinding::new("perses", "admins", "admin").unwrap();

        binding.add_subject(Subject::user("alice"));
        binding.add_subject(Subject::user("alice"));
        binding.add_subject(Subject::user("bob"));
        assert_eq!(binding.subjects().len(), 2);

        binding.remove_subject(&Subject::user("alice"));
        assert_eq!(binding.subjects(), &[Subject::user("bob")]);
    }

    #[test]
    fn test_set_role_touches_updated_at() {
        let mut binding = RoleBinding::new("perses", "admins", "admin").unwrap();
        let original = binding.metadata().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));

        binding.set_role("viewer");
        assert_eq!(binding.role(), "viewer");
        assert!(binding.metadata().updated_at > original);
    }

    #[test]
    fn test_serialized_shape() {
        let binding = RoleBinding::new("perses", "admins", "admin")
            .unwrap()
            .with_subject(Subject::user("alice"));

        let value = serde_json::to_value(&binding).unwrap();
        assert_eq!(value["kind"], "RoleBinding");
        assert_eq!(value["metadata"]["project"], "perses");
        assert_eq!(value["metadata"]["name"], "admins");
        assert_eq!(value["spec"]["role"], "admin");
        assert_eq!(value["spec"]["subjects"][0]["kind"], "User");
        assert_eq!(value["spec"]["subjects"][0]["name"], "alice");
    }

    #[test]
    fn test_partial_shares_identity() {
        let binding = RoleBinding::new("perses", "admins", "admin").unwrap();
        let partial = binding.to_partial();

        assert_eq!(partial.kind, binding.kind());
        assert_eq!(partial.metadata, *binding.project_metadata());
        assert_eq!(partial.key().unwrap(), binding.key().unwrap());
    }

    #[test]
    fn test_revise_from_keeps_creation_time() {
        let stored = RoleBinding::new("perses", "admins", "admin").unwrap();
        let mut next = RoleBinding::new("perses", "admins", "viewer").unwrap();

        next.revise_from(&stored);
        assert_eq!(next.metadata().created_at, stored.metadata().created_at);
        assert_eq!(next.metadata().version, 1);
    }
}
