// src/handlers/email.rs

use axum::{
    extract::{Path, Query, State},
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
        rbac::{PermEmail, RequirePermission},
        tenancy::TenantContext,
    },
    models::email::{
        EmailAccount, EmailMessage, Folder, FolderFilter, MailboxSnapshot, SaveAccountPayload,
        SendMessagePayload,
    },
};

// ---
// Contas
// ---

#[utoipa::path(
    get,
    path = "/api/email/accounts",
    tag = "Email",
    responses((status = 200, description = "Contas configuradas", body = Vec<EmailAccount>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
) -> Result<impl IntoResponse, ApiError> {
    let accounts = app_state
        .email_service
        .list_accounts(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(accounts)))
}

#[utoipa::path(
    post,
    path = "/api/email/accounts",
    tag = "Email",
    request_body = SaveAccountPayload,
    responses((status = 200, description = "Conta salva", body = EmailAccount)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn save_account(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Json(payload): Json<SaveAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let account = app_state
        .email_service
        .save_account(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(account)))
}

#[utoipa::path(
    delete,
    path = "/api/email/accounts/{account_id}",
    tag = "Email",
    responses((status = 204, description = "Conta e mensagens removidas")),
    params(
        ("account_id" = Uuid, Path, description = "ID da Conta"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_account(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .email_service
        .delete_account(tenant.0, account_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Mensagens
// ---

#[utoipa::path(
    get,
    path = "/api/email/accounts/{account_id}/messages",
    tag = "Email",
    responses((status = 200, description = "Mensagens da pasta", body = Vec<EmailMessage>)),
    params(
        ("account_id" = Uuid, Path, description = "ID da Conta"),
        ("folder" = Option<Folder>, Query, description = "INBOX (padrão), SENT ou TRASH"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Path(account_id): Path<Uuid>,
    Query(filter): Query<FolderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .email_service
        .list(tenant.0, account_id, filter.folder.unwrap_or(Folder::Inbox))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}

// "Verificar e-mails": demora de propósito, como um servidor remoto
#[utoipa::path(
    post,
    path = "/api/email/accounts/{account_id}/check",
    tag = "Email",
    responses((status = 200, description = "Caixa de entrada", body = MailboxSnapshot)),
    params(
        ("account_id" = Uuid, Path, description = "ID da Conta"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_mail(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = app_state
        .email_service
        .check_mail(tenant.0, account_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(snapshot)))
}

#[utoipa::path(
    post,
    path = "/api/email/accounts/{account_id}/send",
    tag = "Email",
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem enviada", body = EmailMessage),
        (status = 400, description = "Destinatário inválido")
    ),
    params(
        ("account_id" = Uuid, Path, description = "ID da Conta"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state
        .email_service
        .send_message(tenant.0, account_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    post,
    path = "/api/email/messages/{message_id}/read",
    tag = "Email",
    responses((status = 200, description = "Mensagem marcada como lida", body = EmailMessage)),
    params(
        ("message_id" = Uuid, Path, description = "ID da Mensagem"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .email_service
        .mark_read(tenant.0, message_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(message)))
}

#[utoipa::path(
    post,
    path = "/api/email/messages/{message_id}/trash",
    tag = "Email",
    responses((status = 200, description = "Mensagem movida para a lixeira", body = EmailMessage)),
    params(
        ("message_id" = Uuid, Path, description = "ID da Mensagem"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_to_trash(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .email_service
        .move_to_trash(tenant.0, message_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(message)))
}

#[utoipa::path(
    delete,
    path = "/api/email/messages/{message_id}",
    tag = "Email",
    responses((status = 204, description = "Mensagem apagada")),
    params(
        ("message_id" = Uuid, Path, description = "ID da Mensagem"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_message(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEmail>,
    Path(message_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .email_service
        .delete_message(tenant.0, message_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
