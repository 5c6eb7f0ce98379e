// src/db/user_repo.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        document_store::{DocumentStore, Scope},
        repository::Repository,
    },
    models::auth::User,
};

// O repositório de usuários, responsável pela coleção raiz 'users'
#[derive(Clone)]
pub struct UserRepository {
    users: Repository<User>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Repository::new(store),
        }
    }

    // Busca um usuário pelo seu e-mail (normalizado em minúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .find_where(Scope::Root, "email", &email)
            .await?
            .into_iter()
            .next())
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.users.find(Scope::Root, id).await
    }

    // Cria um novo usuário; e-mail repetido vira conflito
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }
        self.users.save(Scope::Root, user).await
    }

    pub async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<User>, AppError> {
        self.users.find_where(Scope::Root, "clientId", client_id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.users.delete_existing(Scope::Root, id).await
    }
}
