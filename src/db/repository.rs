// src/db/repository.rs

use std::{marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{CollectionPath, DocumentStore, Scope},
};

/// Um tipo persistido como documento numa coleção.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    // Chave usada no 404 ("member", "course", ...)
    const RESOURCE: &'static str;

    fn id(&self) -> Uuid;
}

/// CRUD tipado (getAll / save / delete) sobre o DocumentStore.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    fn path(scope: Scope) -> CollectionPath {
        CollectionPath::new(scope, T::COLLECTION)
    }

    fn decode_all(docs: Vec<Value>) -> Result<Vec<T>, AppError> {
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn get_all(&self, scope: Scope) -> Result<Vec<T>, AppError> {
        let docs = self.store.list(&Self::path(scope)).await?;
        Self::decode_all(docs)
    }

    pub async fn find(&self, scope: Scope, id: Uuid) -> Result<Option<T>, AppError> {
        match self.store.get(&Self::path(scope), id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Como `find`, mas ausência vira `NotFound`.
    pub async fn get(&self, scope: Scope, id: Uuid) -> Result<T, AppError> {
        self.find(scope, id)
            .await?
            .ok_or(AppError::NotFound(T::RESOURCE))
    }

    pub async fn save(&self, scope: Scope, doc: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(doc)?;
        self.store.put(&Self::path(scope), doc.id(), value).await
    }

    pub async fn delete(&self, scope: Scope, id: Uuid) -> Result<bool, AppError> {
        self.store.delete(&Self::path(scope), id).await
    }

    /// Remove ou devolve `NotFound`.
    pub async fn delete_existing(&self, scope: Scope, id: Uuid) -> Result<(), AppError> {
        if self.delete(scope, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(T::RESOURCE))
        }
    }

    pub async fn find_where(
        &self,
        scope: Scope,
        field: &str,
        value: impl Serialize,
    ) -> Result<Vec<T>, AppError> {
        let value = serde_json::to_value(value)?;
        let docs = self
            .store
            .find_where(&Self::path(scope), field, &value)
            .await?;
        Self::decode_all(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store::MemoryDocumentStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Candle {
        id: Uuid,
        color: String,
    }

    impl Document for Candle {
        const COLLECTION: &'static str = "candles";
        const RESOURCE: &'static str = "candle";
        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[tokio::test]
    async fn typed_crud_round_trip() {
        let repo: Repository<Candle> = Repository::new(Arc::new(MemoryDocumentStore::new()));
        let scope = Scope::Tenant(Uuid::new_v4());
        let candle = Candle { id: Uuid::new_v4(), color: "branca".into() };

        repo.save(scope, &candle).await.unwrap();
        assert_eq!(repo.get(scope, candle.id).await.unwrap(), candle);
        assert_eq!(repo.find_where(scope, "color", "branca").await.unwrap().len(), 1);

        repo.delete_existing(scope, candle.id).await.unwrap();
        assert!(matches!(
            repo.get(scope, candle.id).await,
            Err(AppError::NotFound("candle"))
        ));
        assert!(matches!(
            repo.delete_existing(scope, candle.id).await,
            Err(AppError::NotFound("candle"))
        ));
    }
}
