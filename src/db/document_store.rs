// src/db/document_store.rs

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;

// Coleção raiz que agrupa os dados de cada terreiro.
pub const TENANT_ROOT: &str = "saas_clients";

/// Onde uma coleção vive: na raiz (usuários, planos, faturas) ou dentro de um terreiro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Root,
    Tenant(Uuid),
}

impl Scope {
    /// Prefixo comum a todas as subcoleções do escopo.
    pub fn prefix(&self) -> String {
        match self {
            Scope::Root => String::new(),
            Scope::Tenant(client_id) => format!("{TENANT_ROOT}/{client_id}/"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    pub scope: Scope,
    pub collection: &'static str,
}

impl CollectionPath {
    pub fn new(scope: Scope, collection: &'static str) -> Self {
        Self { scope, collection }
    }

    /// Ex.: "saas_clients/{id}/members" ou "users".
    pub fn as_key(&self) -> String {
        format!("{}{}", self.scope.prefix(), self.collection)
    }
}

/// Armazenamento de documentos JSON endereçados por (coleção, id).
///
/// Escritas são "last-write-wins": `put` substitui o documento inteiro.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, path: &CollectionPath) -> Result<Vec<Value>, AppError>;

    async fn get(&self, path: &CollectionPath, id: Uuid) -> Result<Option<Value>, AppError>;

    async fn put(&self, path: &CollectionPath, id: Uuid, doc: Value) -> Result<(), AppError>;

    /// Retorna `true` se algo foi removido.
    async fn delete(&self, path: &CollectionPath, id: Uuid) -> Result<bool, AppError>;

    /// Documentos cujo campo de topo `field` é igual a `value`.
    async fn find_where(
        &self,
        path: &CollectionPath,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, AppError>;

    /// Apaga todas as subcoleções de um escopo de terreiro.
    async fn purge_scope(&self, scope: Scope) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_tenant_scoped_paths() {
        let client_id = Uuid::nil();
        let path = CollectionPath::new(Scope::Tenant(client_id), "members");
        assert_eq!(
            path.as_key(),
            "saas_clients/00000000-0000-0000-0000-000000000000/members"
        );
        assert_eq!(CollectionPath::new(Scope::Root, "users").as_key(), "users");
    }
}
