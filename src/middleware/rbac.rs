// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::UserRole,
};

/// Uma permissão registrada estaticamente (ver `permission!`).
#[derive(Debug, Serialize)]
pub struct Permission {
    pub slug: &'static str,
    pub description: &'static str,
    // Papéis do terreiro que a possuem; Master possui todas
    pub roles: &'static [UserRole],
}

inventory::collect!(Permission);

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    const SLUG: &'static str;
}

pub fn role_has_permission(role: UserRole, slug: &str) -> bool {
    if role == UserRole::Master {
        return true;
    }
    inventory::iter::<Permission>
        .into_iter()
        .any(|p| p.slug == slug && p.roles.contains(&role))
}

/// Todas as permissões, ordenadas pelo slug.
pub fn all_permissions() -> Vec<&'static Permission> {
    let mut permissions: Vec<&'static Permission> = inventory::iter::<Permission>.into_iter().collect();
    permissions.sort_by_key(|p| p.slug);
    permissions
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        if !role_has_permission(user.0.role, T::SLUG) {
            tracing::warn!("🚫 {} sem a permissão '{}'", user.0.email, T::SLUG);
            return Err(AppError::Forbidden(T::SLUG.to_string()));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---
macro_rules! permission {
    ($name:ident, $slug:literal, $description:literal, [$($role:ident),*]) => {
        pub struct $name;

        impl PermissionDef for $name {
            const SLUG: &'static str = $slug;
        }

        inventory::submit! {
            Permission {
                slug: $slug,
                description: $description,
                roles: &[$(UserRole::$role),*],
            }
        }
    };
}

permission!(PermMembersRead, "members:read", "Consultar filhos da casa e entidades", [Admin, Operator]);
permission!(PermMembersWrite, "members:write", "Cadastrar e editar filhos da casa", [Admin]);
permission!(PermInventoryRead, "inventory:read", "Consultar o almoxarifado", [Admin, Operator]);
permission!(PermInventoryWrite, "inventory:write", "Movimentar o almoxarifado", [Admin, Operator]);
permission!(PermFinanceRead, "finance:read", "Relatórios financeiros", [Admin]);
permission!(PermFinanceWrite, "finance:write", "Mensalidades e doações", [Admin]);
permission!(PermCoursesRead, "courses:read", "Consultar cursos e matrículas", [Admin, Operator]);
permission!(PermCoursesWrite, "courses:write", "Gerenciar cursos EAD", [Admin]);
permission!(PermCanteen, "canteen:write", "Operar a cantina", [Admin, Operator]);
permission!(PermEventsRead, "events:read", "Consultar o calendário", [Admin, Operator]);
permission!(PermEventsWrite, "events:write", "Editar o calendário", [Admin]);
permission!(PermAttendance, "attendance:write", "Fazer a chamada", [Admin, Operator]);
permission!(PermCardsIssue, "cards:issue", "Emitir carteirinhas e certificados", [Admin]);
permission!(PermEmail, "email:use", "Usar o cliente de e-mail", [Admin, Operator]);
permission!(PermSettingsWrite, "settings:write", "Alterar a configuração do terreiro", [Admin]);
permission!(PermUsersManage, "users:manage", "Gerenciar usuários do terreiro", [Admin]);
permission!(PermBackup, "backup:manage", "Exportar e importar backups", [Admin]);
permission!(PermMaster, "master:manage", "Painel master (planos, afiliados, cobrança)", []);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_the_registry() {
        assert!(role_has_permission(UserRole::Operator, PermAttendance::SLUG));
        assert!(!role_has_permission(UserRole::Operator, PermFinanceRead::SLUG));
        assert!(role_has_permission(UserRole::Admin, PermFinanceRead::SLUG));
        assert!(!role_has_permission(UserRole::Admin, PermMaster::SLUG));
        assert!(role_has_permission(UserRole::Master, PermMaster::SLUG));
    }

    #[test]
    fn registry_lists_every_permission_once() {
        let slugs: Vec<&str> = all_permissions().iter().map(|p| p.slug).collect();
        assert!(slugs.contains(&"master:manage"));
        let mut deduped = slugs.clone();
        deduped.dedup();
        assert_eq!(slugs, deduped);
    }
}
