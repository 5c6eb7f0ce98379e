// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        dates::Month,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFinanceRead, PermFinanceWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        events::MonthFilter,
        finance::{Donation, MonthlyReport, SaveDonationPayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/finance/donations",
    tag = "Finance",
    responses((status = 200, description = "Doações", body = Vec<Donation>)),
    params(
        ("month" = Option<String>, Query, description = "AAAA-MM"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_donations(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Query(filter): Query<MonthFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let month = filter.month.as_deref().map(Month::parse).transpose().map_err(to_api)?;
    let donations = app_state
        .finance_service
        .list_donations(tenant.0, month)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(donations)))
}

#[utoipa::path(
    post,
    path = "/api/finance/donations",
    tag = "Finance",
    request_body = SaveDonationPayload,
    responses((status = 200, description = "Doação salva", body = Donation)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn save_donation(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Json(payload): Json<SaveDonationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let donation = app_state
        .finance_service
        .save_donation(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(donation)))
}

#[utoipa::path(
    delete,
    path = "/api/finance/donations/{donation_id}",
    tag = "Finance",
    responses((status = 204, description = "Doação removida")),
    params(
        ("donation_id" = Uuid, Path, description = "ID da Doação"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_donation(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(donation_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .finance_service
        .delete_donation(tenant.0, donation_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// Conciliação das mensalidades do mês
#[utoipa::path(
    get,
    path = "/api/finance/report",
    tag = "Finance",
    responses(
        (status = 200, description = "Relatório mensal", body = MonthlyReport),
        (status = 400, description = "Mês inválido")
    ),
    params(
        ("month" = String, Query, description = "AAAA-MM"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_report(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Query(filter): Query<MonthFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let raw = filter.month.unwrap_or_default();
    let month = Month::parse(&raw).map_err(to_api)?;
    let report = app_state
        .finance_service
        .monthly_report(tenant.0, month)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(report)))
}
