//! Domain layer - Entities, repository traits and the store contract

pub mod error;
pub mod role_binding;
pub mod storage;

pub use error::DomainError;
pub use role_binding::{RoleBinding, RoleBindingQuery, RoleBindingRepository, Subject};
pub use storage::{Entity, EntityKey, Kind, Store, StoreExt, StoreQuery};
