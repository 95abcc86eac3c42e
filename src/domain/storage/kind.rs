//! Closed set of entity kinds understood by the store

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Entity kind, the store's top-level addressing discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    Dashboard,
    Datasource,
    Folder,
    GlobalDatasource,
    GlobalRole,
    GlobalRoleBinding,
    GlobalSecret,
    GlobalVariable,
    Project,
    Role,
    RoleBinding,
    Secret,
    User,
    Variable,
}

impl Kind {
    /// All kinds, in declaration order
    pub const ALL: [Kind; 14] = [
        Self::Dashboard,
        Self::Datasource,
        Self::Folder,
        Self::GlobalDatasource,
        Self::GlobalRole,
        Self::GlobalRoleBinding,
        Self::GlobalSecret,
        Self::GlobalVariable,
        Self::Project,
        Self::Role,
        Self::RoleBinding,
        Self::Secret,
        Self::User,
        Self::Variable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Datasource => "Datasource",
            Self::Folder => "Folder",
            Self::GlobalDatasource => "GlobalDatasource",
            Self::GlobalRole => "GlobalRole",
            Self::GlobalRoleBinding => "GlobalRoleBinding",
            Self::GlobalSecret => "GlobalSecret",
            Self::GlobalVariable => "GlobalVariable",
            Self::Project => "Project",
            Self::Role => "Role",
            Self::RoleBinding => "RoleBinding",
            Self::Secret => "Secret",
            Self::User => "User",
            Self::Variable => "Variable",
        }
    }

    /// Whether entities of this kind are addressed by `(project, name)` rather than `name`
    pub fn is_project_scoped(&self) -> bool {
        matches!(
            self,
            Self::Dashboard
                | Self::Datasource
                | Self::Folder
                | Self::Role
                | Self::RoleBinding
                | Self::Secret
                | Self::Variable
        )
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Kind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("Unknown kind '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_is_case_insensitive() {
        assert_eq!("RoleBinding".parse::<Kind>().unwrap(), Kind::RoleBinding);
        assert_eq!("rolebinding".parse::<Kind>().unwrap(), Kind::RoleBinding);
        assert_eq!("GLOBALROLE".parse::<Kind>().unwrap(), Kind::GlobalRole);
        assert!("Widget".parse::<Kind>().is_err());
    }

    #[test]
    fn test_kind_scoping() {
        assert!(Kind::RoleBinding.is_project_scoped());
        assert!(Kind::Dashboard.is_project_scoped());
        assert!(!Kind::GlobalRoleBinding.is_project_scoped());
        assert!(!Kind::Project.is_project_scoped());
        assert!(!Kind::User.is_project_scoped());
    }

    #[test]
    fn test_kind_serializes_as_name() {
        let json = serde_json::to_string(&Kind::RoleBinding).unwrap();
        assert_eq!(json, "\"RoleBinding\"");

        let kind: Kind = serde_json::from_str("\"GlobalSecret\"").unwrap();
        assert_eq!(kind, Kind::GlobalSecret);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for kind in Kind::ALL {
            assert_eq!(kind.to_string().parse::<Kind>().unwrap(), kind);
        }
    }
}
