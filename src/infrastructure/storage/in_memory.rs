//! In-memory store implementation

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::storage::{EntityKey, Kind, Store, StoreQuery};
use crate::domain::DomainError;

type DocumentKey = (Kind, EntityKey);

/// Thread-safe in-memory store
///
/// Useful for testing and development. Data is lost when the process terminates.
/// Documents are kept ordered by `(kind, project, name)`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: RwLock<BTreeMap<DocumentKey, Vec<u8>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across all kinds
    pub fn len(&self) -> Result<usize, DomainError> {
        let documents = self.documents.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(documents.len())
    }

    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }

    fn matching(&self, query: &dyn StoreQuery) -> Result<Vec<Vec<u8>>, DomainError> {
        query.validate()?;

        let documents = self.documents.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(documents
            .iter()
            .filter(|((kind, key), _)| query.matches(*kind, key))
            .map(|(_, data)| data.clone())
            .collect())
    }
}

/// Keeps only the `kind` and `metadata` members of a stored document
fn project_metadata(data: &[u8]) -> Result<Vec<u8>, DomainError> {
    let document: Value = serde_json::from_slice(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize document: {}", e)))?;

    let projection = serde_json::json!({
        "kind": document.get("kind").cloned().unwrap_or(Value::Null),
        "metadata": document.get("metadata").cloned().unwrap_or(Value::Null),
    });

    serde_json::to_vec(&projection)
        .map_err(|e| DomainError::storage(format!("Failed to serialize projection: {}", e)))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create(
        &self,
        kind: Kind,
        key: &EntityKey,
        document: Vec<u8>,
    ) -> Result<(), DomainError> {
        key.ensure_addresses(kind)?;
        let mut documents = self.documents.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let id = (kind, key.clone());

        if documents.contains_key(&id) {
            return Err(DomainError::already_exists(format!(
                "{} '{}' already exists",
                kind, key
            )));
        }

        documents.insert(id, document);
        Ok(())
    }

    async fn upsert(
        &self,
        kind: Kind,
        key: &EntityKey,
        document: Vec<u8>,
    ) -> Result<(), DomainError> {
        key.ensure_addresses(kind)?;
        let mut documents = self.documents.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        documents.insert((kind, key.clone()), document);
        Ok(())
    }

    async fn delete(&self, kind: Kind, key: &EntityKey) -> Result<(), DomainError> {
        let mut documents = self.documents.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        match documents.remove(&(kind, key.clone())) {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(format!("{} '{}' not found", kind, key))),
        }
    }

    async fn delete_by_query(&self, query: &dyn StoreQuery) -> Result<usize, DomainError> {
        query.validate()?;
        let mut documents = self.documents.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let before = documents.len();
        documents.retain(|(kind, key), _| !query.matches(*kind, key));
        Ok(before - documents.len())
    }

    async fn get_raw(&self, kind: Kind, key: &EntityKey) -> Result<Vec<u8>, DomainError> {
        let documents = self.documents.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        documents
            .get(&(kind, key.clone()))
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("{} '{}' not found", kind, key)))
    }

    async fn raw_query(&self, query: &dyn StoreQuery) -> Result<Vec<Vec<u8>>, DomainError> {
        self.matching(query)
    }

    async fn raw_metadata_query(
        &self,
        query: &dyn StoreQuery,
        kind: Kind,
    ) -> Result<Vec<Vec<u8>>, DomainError> {
        if query.kind() != kind {
            return Err(DomainError::invalid_query(format!(
                "Query selects {} but metadata was requested for {}",
                query.kind(),
                kind
            )));
        }

        self.matching(query)?
            .iter()
            .map(|data| project_metadata(data))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestQuery {
        kind: Kind,
        project: Option<&'static str>,
    }

    impl StoreQuery for TestQuery {
        fn kind(&self) -> Kind {
            self.kind
        }

        fn project(&self) -> Option<&str> {
            self.project
        }
    }

    fn query(kind: Kind, project: Option<&'static str>) -> TestQuery {
        TestQuery { kind, project }
    }

    fn key(project: &str, name: &str) -> EntityKey {
        EntityKey::project(project, name).unwrap()
    }

    fn document(project: &str, name: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "kind": "Dashboard",
            "metadata": { "name": name, "project": project },
            "spec": { "panels": 3 }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryStore::new();
        let doc = document("a", "overview");

        store
            .create(Kind::Dashboard, &key("a", "overview"), doc.clone())
            .await
            .unwrap();

        let result = store.get_raw(Kind::Dashboard, &key("a", "overview")).await.unwrap();
        assert_eq!(result, doc);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let store = InMemoryStore::new();
        let doc = document("a", "overview");

        store
            .create(Kind::Dashboard, &key("a", "overview"), doc.clone())
            .await
            .unwrap();
        let result = store.create(Kind::Dashboard, &key("a", "overview"), doc).await;

        assert!(matches!(result.unwrap_err(), DomainError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_same_key_different_kind_does_not_collide() {
        let store = InMemoryStore::new();

        store
            .create(Kind::Dashboard, &key("a", "x"), document("a", "x"))
            .await
            .unwrap();
        store
            .create(Kind::Variable, &key("a", "x"), document("a", "x"))
            .await
            .unwrap();

        assert_eq!(store.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_key_shape_must_match_kind() {
        let store = InMemoryStore::new();
        let global = EntityKey::global("x").unwrap();

        let result = store.create(Kind::Dashboard, &global, document("", "x")).await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));

        let result = store.upsert(Kind::GlobalRole, &key("a", "x"), Vec::new()).await;
        assert!(matches!(result.unwrap_err(), DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_replaces() {
        let store = InMemoryStore::new();

        store
            .upsert(Kind::Dashboard, &key("a", "x"), b"1".to_vec())
            .await
            .unwrap();
        store
            .upsert(Kind::Dashboard, &key("a", "x"), b"2".to_vec())
            .await
            .unwrap();

        let result = store.get_raw(Kind::Dashboard, &key("a", "x")).await.unwrap();
        assert_eq!(result, b"2".to_vec());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let store = InMemoryStore::new();

        let result = store.delete(Kind::Dashboard, &key("a", "x")).await;
        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let store = InMemoryStore::new();

        let result = store.get_raw(Kind::Dashboard, &key("a", "x")).await;
        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_raw_query_is_ordered_and_scoped() {
        let store = InMemoryStore::new();

        for (project, name) in [("b", "z"), ("a", "y"), ("a", "x")] {
            store
                .create(Kind::Dashboard, &key(project, name), document(project, name))
                .await
                .unwrap();
        }

        let all = store
            .raw_query(&query(Kind::Dashboard, None))
            .await
            .unwrap();
        assert_eq!(all, vec![document("a", "x"), document("a", "y"), document("b", "z")]);

        let only_a = store
            .raw_query(&query(Kind::Dashboard, Some("a")))
            .await
            .unwrap();
        assert_eq!(only_a.len(), 2);
    }

    #[tokio::test]
    async fn test_raw_query_orders_bytewise() {
        let store = InMemoryStore::new();

        for (project, name) in [("a", "x"), ("B", "x"), ("a", "Y")] {
            store
                .create(Kind::Dashboard, &key(project, name), document(project, name))
                .await
                .unwrap();
        }

        let all = store.raw_query(&query(Kind::Dashboard, None)).await.unwrap();
        assert_eq!(all, vec![document("B", "x"), document("a", "Y"), document("a", "x")]);
    }

    #[tokio::test]
    async fn test_invalid_query() {
        let store = InMemoryStore::new();

        let result = store
            .raw_query(&query(Kind::GlobalRole, Some("a")))
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::InvalidQuery { .. }));

        let result = store
            .raw_metadata_query(&query(Kind::Dashboard, None), Kind::Folder)
            .await;
        assert!(matches!(result.unwrap_err(), DomainError::InvalidQuery { .. }));
    }

    #[tokio::test]
    async fn test_raw_metadata_query_projects_kind_and_metadata() {
        let store = InMemoryStore::new();
        store
            .create(Kind::Dashboard, &key("a", "x"), document("a", "x"))
            .await
            .unwrap();

        let result = store
            .raw_metadata_query(&query(Kind::Dashboard, Some("a")), Kind::Dashboard)
            .await
            .unwrap();

        let value: Value = serde_json::from_slice(&result[0]).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "kind": "Dashboard",
                "metadata": { "name": "x", "project": "a" }
            })
        );
    }

    #[tokio::test]
    async fn test_delete_by_query() {
        let store = InMemoryStore::new();

        for (project, name) in [("a", "x"), ("a", "y"), ("b", "z")] {
            store
                .create(Kind::Dashboard, &key(project, name), document(project, name))
                .await
                .unwrap();
        }

        let deleted = store
            .delete_by_query(&query(Kind::Dashboard, Some("a")))
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(store.len().unwrap(), 1);
    }
}
