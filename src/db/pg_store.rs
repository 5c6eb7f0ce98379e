// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::document_store::{CollectionPath, DocumentStore, Scope},
};

// Todos os documentos vivem na tabela 'documents' (ver migrations/).
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Value>, AppError> {
        let rows = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT data FROM documents WHERE collection_path = $1 ORDER BY created_at ASC",
        )
        .bind(path.as_key())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn get(&self, path: &CollectionPath, id: Uuid) -> Result<Option<Value>, AppError> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT data FROM documents WHERE collection_path = $1 AND id = $2",
        )
        .bind(path.as_key())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|Json(doc)| doc))
    }

    async fn put(&self, path: &CollectionPath, id: Uuid, doc: Value) -> Result<(), AppError> {
        // UPSERT: o documento inteiro é substituído (last-write-wins)
        sqlx::query(
            r#"
            INSERT INTO documents (collection_path, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection_path, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(path.as_key())
        .bind(id)
        .bind(Json(doc))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, path: &CollectionPath, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection_path = $1 AND id = $2")
            .bind(path.as_key())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_where(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, AppError> {
        let rows = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT data FROM documents
            WHERE collection_path = $1 AND data -> $2 = $3
            ORDER BY created_at ASC
            "#,
        )
        .bind(path.as_key())
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn purge_scope(&self, scope: Scope) -> Result<u64, AppError> {
        if scope == Scope::Root {
            return Err(AppError::StorageError("a raiz não pode ser apagada".into()));
        }

        let result = sqlx::query("DELETE FROM documents WHERE collection_path LIKE $1")
            .bind(format!("{}%", scope.prefix()))
            .execute(&self.pool)
            .await?;

        tracing::info!("🧹 {} documentos removidos de {}", result.rows_affected(), scope.prefix());
        Ok(result.rows_affected())
    }
}
