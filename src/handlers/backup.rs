// src/handlers/backup.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermBackup, RequirePermission},
        tenancy::TenantContext,
    },
    models::dashboard::{ImportSummary, TenantBackup},
};

// O navegador baixa como arquivo
#[utoipa::path(
    get,
    path = "/api/backup",
    tag = "Backup",
    responses((status = 200, description = "Backup JSON de todas as coleções", body = TenantBackup)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn export_backup(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermBackup>,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let backup = app_state.backup_service.export(tenant.0).await.map_err(to_api)?;
    let body = serde_json::to_vec_pretty(&backup)
        .map_err(|e| to_api(AppError::from(e)))?;

    let filename = format!("backup_{}_{}.json", tenant.0, backup.exported_at.format("%Y%m%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/backup",
    tag = "Backup",
    request_body = TenantBackup,
    responses(
        (status = 200, description = "Documentos restaurados por coleção", body = ImportSummary),
        (status = 400, description = "Backup de outro terreiro")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn import_backup(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermBackup>,
    Json(backup): Json<TenantBackup>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .backup_service
        .import(tenant.0, backup)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}
