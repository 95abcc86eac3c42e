//! Storage domain - Generic, kind-agnostic store abstraction

mod entity;
mod kind;
mod metadata;
mod query;
mod repository;

pub use entity::{Entity, PartialEntity, PartialProjectEntity, StorageEntity};
pub use kind::Kind;
pub use metadata::{EntityKey, Metadata, ProjectMetadata};
pub use query::StoreQuery;
pub use repository::{Store, StoreExt};

#[cfg(test)]
pub use repository::mock;
