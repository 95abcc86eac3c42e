//! Kind-agnostic view of a listing or bulk-deletion filter

use std::fmt::Debug;

use super::kind::Kind;
use super::metadata::EntityKey;
use crate::domain::DomainError;

/// Filter understood by every store backend
///
/// Each entity kind declares its own query type and exposes it to the store
/// through this trait. Empty strings are treated the same as absent filters.
pub trait StoreQuery: Debug + Send + Sync {
    /// Kind of the entities the query selects
    fn kind(&self) -> Kind;

    /// Exact project to match, `None` to match across all projects
    fn project(&self) -> Option<&str> {
        None
    }

    /// Prefix the entity name must start with
    fn name_prefix(&self) -> Option<&str> {
        None
    }

    /// Rejects filters that cannot apply to the query's kind
    fn validate(&self) -> Result<(), DomainError> {
        if let Some(project) = non_empty(self.project()) {
            if !self.kind().is_project_scoped() {
                return Err(DomainError::invalid_query(format!(
                    "{} is not project-scoped, cannot filter by project '{}'",
                    self.kind(),
                    project
                )));
            }
        }
        Ok(())
    }

    /// Whether an entity stored under `(kind, key)` is selected
    fn matches(&self, kind: Kind, key: &EntityKey) -> bool {
        if kind != self.kind() {
            return false;
        }

        if let Some(project) = non_empty(self.project()) {
            if key.project_name() != Some(project) {
                return false;
            }
        }

        if let Some(prefix) = non_empty(self.name_prefix()) {
            if !key.name().starts_with(prefix) {
                return false;
            }
        }

        true
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestQuery {
        kind: Kind,
        project: Option<String>,
        prefix: Option<String>,
    }

    impl StoreQuery for TestQuery {
        fn kind(&self) -> Kind {
            self.kind
        }

        fn project(&self) -> Option<&str> {
            self.project.as_deref()
        }

        fn name_prefix(&self) -> Option<&str> {
            self.prefix.as_deref()
        }
    }

    fn query(kind: Kind, project: Option<&str>, prefix: Option<&str>) -> TestQuery {
        TestQuery {
            kind,
            project: project.map(str::to_string),
            prefix: prefix.map(str::to_string),
        }
    }

    #[test]
    fn test_matches_kind_and_project() {
        let key = EntityKey::project("a", "admins").unwrap();

        assert!(query(Kind::RoleBinding, Some("a"), None).matches(Kind::RoleBinding, &key));
        assert!(!query(Kind::RoleBinding, Some("b"), None).matches(Kind::RoleBinding, &key));
        assert!(!query(Kind::Role, Some("a"), None).matches(Kind::RoleBinding, &key));
    }

    #[test]
    fn test_empty_project_matches_all_projects() {
        let a = EntityKey::project("a", "admins").unwrap();
        let b = EntityKey::project("b", "viewers").unwrap();

        for q in [
            query(Kind::RoleBinding, None, None),
            query(Kind::RoleBinding, Some(""), None),
        ] {
            assert!(q.matches(Kind::RoleBinding, &a));
            assert!(q.matches(Kind::RoleBinding, &b));
        }
    }

    #[test]
    fn test_name_prefix() {
        let key = EntityKey::project("a", "admins").unwrap();

        assert!(query(Kind::RoleBinding, None, Some("adm")).matches(Kind::RoleBinding, &key));
        assert!(query(Kind::RoleBinding, None, Some("")).matches(Kind::RoleBinding, &key));
        assert!(!query(Kind::RoleBinding, None, Some("view")).matches(Kind::RoleBinding, &key));
    }

    #[test]
    fn test_validate_rejects_project_on_global_kind() {
        assert!(query(Kind::RoleBinding, Some("a"), None).validate().is_ok());
        assert!(query(Kind::GlobalRoleBinding, None, None).validate().is_ok());
        assert!(query(Kind::GlobalRoleBinding, Some(""), None).validate().is_ok());

        let err = query(Kind::GlobalRoleBinding, Some("a"), None)
            .validate()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuery { .. }));
    }
}
