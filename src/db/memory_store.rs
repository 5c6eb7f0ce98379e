// src/db/memory_store.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{CollectionPath, DocumentStore, Scope},
};

// Documentos de uma coleção, na ordem de inserção.
#[derive(Default)]
struct Collection {
    next_seq: u64,
    docs: HashMap<Uuid, (u64, Value)>,
}

impl Collection {
    fn ordered(&self) -> Vec<Value> {
        let by_seq: BTreeMap<u64, &Value> =
            self.docs.values().map(|(seq, doc)| (*seq, doc)).collect();
        by_seq.into_values().cloned().collect()
    }
}

/// Armazenamento em memória. Usado nos testes e quando não há DATABASE_URL.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.as_key())
            .map(Collection::ordered)
            .unwrap_or_default())
    }

    async fn get(&self, path: &CollectionPath, id: Uuid) -> Result<Option<Value>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&path.as_key())
            .and_then(|c| c.docs.get(&id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn put(&self, path: &CollectionPath, id: Uuid, doc: Value) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(path.as_key()).or_default();

        // Regravar um id mantém a posição original
        let seq = match collection.docs.get(&id) {
            Some((seq, _)) => *seq,
            None => {
                collection.next_seq += 1;
                collection.next_seq
            }
        };
        collection.docs.insert(id, (seq, doc));
        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: Uuid) -> Result<bool, AppError> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&path.as_key())
            .map(|c| c.docs.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn find_where(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, AppError> {
        let docs = self.list(path).await?;
        Ok(docs
            .into_iter()
            .filter(|doc| doc.get(field) == Some(value))
            .collect())
    }

    async fn purge_scope(&self, scope: Scope) -> Result<u64, AppError> {
        if scope == Scope::Root {
            return Err(AppError::StorageError("a raiz não pode ser apagada".into()));
        }

        let prefix = scope.prefix();
        let mut collections = self.collections.write().await;
        let keys: Vec<String> = collections
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();

        let mut removed = 0u64;
        for key in keys {
            if let Some(collection) = collections.remove(&key) {
                removed += collection.docs.len() as u64;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn members(client: Uuid) -> CollectionPath {
        CollectionPath::new(Scope::Tenant(client), "members")
    }

    #[tokio::test]
    async fn put_is_last_write_wins_and_keeps_order() {
        let store = MemoryDocumentStore::new();
        let path = members(Uuid::new_v4());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.put(&path, a, json!({"name": "Ana"})).await.unwrap();
        store.put(&path, b, json!({"name": "Bento"})).await.unwrap();
        store.put(&path, a, json!({"name": "Ana Maria"})).await.unwrap();

        let docs = store.list(&path).await.unwrap();
        assert_eq!(docs, vec![json!({"name": "Ana Maria"}), json!({"name": "Bento"})]);
    }

    #[tokio::test]
    async fn tenants_do_not_see_each_other() {
        let store = MemoryDocumentStore::new();
        let (t1, t2) = (Uuid::new_v4(), Uuid::new_v4());
        let id = Uuid::new_v4();

        store.put(&members(t1), id, json!({"name": "Ana"})).await.unwrap();

        assert!(store.get(&members(t2), id).await.unwrap().is_none());
        assert!(store.list(&members(t2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_where_and_purge() {
        let store = MemoryDocumentStore::new();
        let tenant = Uuid::new_v4();
        let logs = CollectionPath::new(Scope::Tenant(tenant), "stock_logs");
        let item = Uuid::new_v4();

        store.put(&logs, Uuid::new_v4(), json!({"itemId": item})).await.unwrap();
        store.put(&logs, Uuid::new_v4(), json!({"itemId": Uuid::new_v4()})).await.unwrap();
        store.put(&members(tenant), Uuid::new_v4(), json!({})).await.unwrap();

        let found = store.find_where(&logs, "itemId", &json!(item)).await.unwrap();
        assert_eq!(found.len(), 1);

        assert_eq!(store.purge_scope(Scope::Tenant(tenant)).await.unwrap(), 3);
        assert!(store.list(&logs).await.unwrap().is_empty());
        assert!(store.purge_scope(Scope::Root).await.is_err());
    }
}
