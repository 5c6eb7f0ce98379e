// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Scope,
    models::auth::{User, UserRole},
};

// O nome do nosso cabeçalho HTTP customizado
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

// O terreiro resolvido pelo tenant_guard para esta requisição.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl TenantContext {
    /// Escopo das subcoleções saas_clients/{id}/...
    pub fn scope(&self) -> Scope {
        Scope::Tenant(self.0)
    }
}

/// Lê o X-Tenant-ID (se presente). Valor que não é UUID é erro.
pub fn tenant_header(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(value) = headers.get(TENANT_ID_HEADER) else {
        return Ok(None);
    };

    let value_str = value.to_str().map_err(|_| AppError::TenantRequired)?;
    Uuid::parse_str(value_str.trim())
        .map(Some)
        .map_err(|_| AppError::TenantRequired)
}

/// Decide qual terreiro o usuário acessa.
///
/// Usuários Master escolhem pelo cabeçalho; os demais ficam presos ao seu
/// próprio terreiro e o cabeçalho, se vier, tem que bater.
pub fn resolve_tenant(user: &User, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    match user.role {
        UserRole::Master => requested.ok_or(AppError::TenantRequired),
        UserRole::Admin | UserRole::Operator => {
            let own = user.client_id.ok_or(AppError::TenantRequired)?;
            match requested {
                Some(other) if other != own => Err(AppError::Forbidden("tenant".into())),
                _ => Ok(own),
            }
        }
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::TenantRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole, client_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            name: "Teste".into(),
            password_hash: String::new(),
            role,
            client_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn tenant_users_are_pinned_to_their_client() {
        let own = Uuid::new_v4();
        let admin = user(UserRole::Admin, Some(own));

        assert_eq!(resolve_tenant(&admin, None).unwrap(), own);
        assert_eq!(resolve_tenant(&admin, Some(own)).unwrap(), own);
        assert!(matches!(
            resolve_tenant(&admin, Some(Uuid::new_v4())),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn master_must_pick_a_tenant() {
        let master = user(UserRole::Master, None);
        let target = Uuid::new_v4();

        assert!(matches!(resolve_tenant(&master, None), Err(AppError::TenantRequired)));
        assert_eq!(resolve_tenant(&master, Some(target)).unwrap(), target);
    }

    #[test]
    fn rejects_malformed_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(tenant_header(&headers).unwrap(), None);

        headers.insert(TENANT_ID_HEADER, "not-a-uuid".parse().unwrap());
        assert!(tenant_header(&headers).is_err());
    }
}
