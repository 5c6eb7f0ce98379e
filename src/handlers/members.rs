// src/handlers/members.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermMembersRead, PermMembersWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        events::AttendanceSummary,
        members::{Member, SaveEntityPayload, SaveMemberPayload, SetPaymentPayload, SpiritualEntity},
    },
};

// ---
// Filhos da casa
// ---

#[utoipa::path(
    get,
    path = "/api/members",
    tag = "Members",
    responses((status = 200, description = "Membros do terreiro", body = Vec<Member>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersRead>,
) -> Result<impl IntoResponse, ApiError> {
    let mut members = app_state
        .member_service
        .get_all_members(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    members.sort_by(|a, b| a.name.cmp(&b.name));

    Ok((StatusCode::OK, Json(members)))
}

#[utoipa::path(
    get,
    path = "/api/members/{member_id}",
    tag = "Members",
    responses(
        (status = 200, description = "Membro", body = Member),
        (status = 404, description = "Membro não encontrado")
    ),
    params(
        ("member_id" = Uuid, Path, description = "ID do Membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersRead>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .member_service
        .get_member(tenant.0, member_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(member)))
}

// POST /api/members (sem id cria; com id substitui)
#[utoipa::path(
    post,
    path = "/api/members",
    tag = "Members",
    request_body = SaveMemberPayload,
    responses(
        (status = 200, description = "Membro salvo", body = Member),
        (status = 403, description = "Limite de membros do plano atingido")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn save_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersWrite>,
    Json(payload): Json<SaveMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .member_service
        .save_member(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(member)))
}

#[utoipa::path(
    put,
    path = "/api/members/{member_id}/payments",
    tag = "Members",
    request_body = SetPaymentPayload,
    responses((status = 200, description = "Mensalidade atualizada", body = Member)),
    params(
        ("member_id" = Uuid, Path, description = "ID do Membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersWrite>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<SetPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .member_service
        .set_payment(tenant.0, member_id, &payload.month, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(member)))
}

#[utoipa::path(
    delete,
    path = "/api/members/{member_id}",
    tag = "Members",
    responses((status = 204, description = "Membro removido")),
    params(
        ("member_id" = Uuid, Path, description = "ID do Membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersWrite>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .member_service
        .delete_member(tenant.0, member_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// Frequência do membro nas chamadas
#[utoipa::path(
    get,
    path = "/api/members/{member_id}/attendance",
    tag = "Members",
    responses((status = 200, description = "Resumo de presença", body = AttendanceSummary)),
    params(
        ("member_id" = Uuid, Path, description = "ID do Membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn member_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersRead>,
    Path(member_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    app_state
        .member_service
        .get_member(tenant.0, member_id)
        .await
        .map_err(to_api)?;
    let summary = app_state
        .attendance_service
        .member_summary(tenant.0, member_id)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(summary)))
}

// ---
// Entidades (guias)
// ---

#[utoipa::path(
    get,
    path = "/api/entities",
    tag = "Members",
    responses((status = 200, description = "Entidades cadastradas", body = Vec<SpiritualEntity>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn list_entities(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersRead>,
) -> Result<impl IntoResponse, ApiError> {
    let entities = app_state
        .entity_service
        .get_all_entities(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entities)))
}

#[utoipa::path(
    post,
    path = "/api/entities",
    tag = "Members",
    request_body = SaveEntityPayload,
    responses((status = 200, description = "Entidade salva", body = SpiritualEntity)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn save_entity(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersWrite>,
    Json(payload): Json<SaveEntityPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entity = app_state
        .entity_service
        .save_entity(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entity)))
}

#[utoipa::path(
    delete,
    path = "/api/entities/{entity_id}",
    tag = "Members",
    responses((status = 204, description = "Entidade removida (e desvinculada dos membros)")),
    params(
        ("entity_id" = Uuid, Path, description = "ID da Entidade"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_entity(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersWrite>,
    Path(entity_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .entity_service
        .delete_entity(tenant.0, entity_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
