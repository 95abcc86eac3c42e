//! Role binding domain module
//!
//! A role binding grants the permissions of a project role to a set of
//! subjects. Bindings are addressed by `(project, name)`.

mod entity;
mod repository;

pub use entity::{RoleBinding, RoleBindingSpec, Subject, SubjectKind};
pub use repository::{RoleBindingQuery, RoleBindingRepository};
