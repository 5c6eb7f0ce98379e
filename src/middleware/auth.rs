// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        tenancy::{resolve_tenant, tenant_header, TenantContext},
    },
    models::auth::{User, UserRole},
};

type BearerHeader = TypedHeader<Authorization<Bearer>>;

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

async fn authenticate(app_state: &AppState, bearer: Option<BearerHeader>) -> Result<User, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;
    app_state.auth_service.validate_token(bearer.token()).await
}

/// Rotas que só exigem login (perfil, painel master).
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&app_state, bearer)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Rotas de um terreiro: autentica, resolve o X-Tenant-ID e barra clientes bloqueados.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<BearerHeader>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let user = authenticate(&app_state, bearer).await.map_err(to_api)?;
    let requested = tenant_header(request.headers()).map_err(to_api)?;
    let client_id = resolve_tenant(&user, requested).map_err(to_api)?;

    let client = app_state
        .tenant_service
        .get_client(client_id)
        .await
        .map_err(to_api)?;

    if user.role != UserRole::Master && !client.status.allows_access() {
        tracing::warn!("⛔ Acesso negado ao terreiro {} ({:?})", client.id, client.status);
        return Err(to_api(AppError::TenantBlocked));
    }

    request.extensions_mut().insert(AuthenticatedUser(user));
    request.extensions_mut().insert(TenantContext(client.id));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
