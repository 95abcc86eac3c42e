//! Store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::entity::StorageEntity;
use super::kind::Kind;
use super::metadata::EntityKey;
use super::query::StoreQuery;
use crate::domain::DomainError;

/// Generic, kind-agnostic store addressed by `(kind, key)`
///
/// Documents travel as serialized JSON bytes so the trait stays dyn-compatible.
/// Use [`StoreExt`] for typed create, get and query operations.
#[async_trait]
pub trait Store: Send + Sync + Debug {
    /// Stores a new document, fails with `AlreadyExists` on a duplicate key
    async fn create(
        &self,
        kind: Kind,
        key: &EntityKey,
        document: Vec<u8>,
    ) -> Result<(), DomainError>;

    /// Creates or replaces the document at the key
    async fn upsert(
        &self,
        kind: Kind,
        key: &EntityKey,
        document: Vec<u8>,
    ) -> Result<(), DomainError>;

    /// Deletes the document at the key, fails with `NotFound` if absent
    async fn delete(&self, kind: Kind, key: &EntityKey) -> Result<(), DomainError>;

    /// Deletes every document matching the query and returns how many were removed
    ///
    /// Not atomic across documents: a failure part way through may leave a
    /// subset of the matches deleted.
    async fn delete_by_query(&self, query: &dyn StoreQuery) -> Result<usize, DomainError>;

    /// Returns the stored document, fails with `NotFound` if absent
    async fn get_raw(&self, kind: Kind, key: &EntityKey) -> Result<Vec<u8>, DomainError>;

    /// Returns every matching document, ordered by `(project, name)`
    async fn raw_query(&self, query: &dyn StoreQuery) -> Result<Vec<Vec<u8>>, DomainError>;

    /// Returns the `{kind, metadata}` projection of every matching document
    async fn raw_metadata_query(
        &self,
        query: &dyn StoreQuery,
        kind: Kind,
    ) -> Result<Vec<Vec<u8>>, DomainError>;
}

/// Extension trait providing typed store operations
pub trait StoreExt: Store {
    /// Serializes and creates an entity at its own identity key
    fn create_entity<'a, E>(
        &'a self,
        entity: &'a E,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        E: StorageEntity,
    {
        async move {
            let (key, document) = encode_entity(entity)?;
            self.create(E::KIND, &key, document).await
        }
    }

    /// Serializes and upserts an entity at its own identity key
    fn upsert_entity<'a, E>(
        &'a self,
        entity: &'a E,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        E: StorageEntity,
    {
        async move {
            let (key, document) = encode_entity(entity)?;
            self.upsert(E::KIND, &key, document).await
        }
    }

    /// Gets a document and decodes it into `T`
    fn get<'a, T>(
        &'a self,
        kind: Kind,
        key: &'a EntityKey,
    ) -> impl std::future::Future<Output = Result<T, DomainError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let data = self.get_raw(kind, key).await?;
            decode(&data)
        }
    }

    /// Queries documents and decodes each match into `T`
    fn query<'a, T>(
        &'a self,
        query: &'a dyn StoreQuery,
    ) -> impl std::future::Future<Output = Result<Vec<T>, DomainError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            self.raw_query(query)
                .await?
                .iter()
                .map(|data| decode(data))
                .collect()
        }
    }
}

impl<T: Store + ?Sized> StoreExt for T {}

fn encode_entity<E: StorageEntity>(entity: &E) -> Result<(EntityKey, Vec<u8>), DomainError> {
    if entity.kind() != E::KIND {
        return Err(DomainError::validation(format!(
            "Entity kind '{}' does not match expected kind '{}'",
            entity.kind(),
            E::KIND
        )));
    }

    let key = entity.key()?;
    let document = serde_json::to_vec(entity)
        .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

    Ok((key, document))
}

fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, DomainError> {
    serde_json::from_slice(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize entity: {}", e)))
}
