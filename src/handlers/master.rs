// src/handlers/master.rs
// Painel do dono do SaaS: não usa x-tenant-id, só o papel Master.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
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
        rbac::{PermMaster, RequirePermission},
    },
    models::{
        events::MonthFilter,
        master::{
            Affiliate, BlockOverduePayload, ChangeStatusPayload, CreateClientPayload,
            GenerateInvoicesPayload, Invoice, InvoiceFilter, MasterReport, Plan,
            SaveAffiliatePayload, SavePlanPayload, UpdateClientPayload,
        },
        tenancy::SaasClient,
    },
};

// ---
// Planos
// ---

#[utoipa::path(
    get,
    path = "/api/master/plans",
    tag = "Master",
    responses((status = 200, description = "Planos de assinatura", body = Vec<Plan>)),
    security(("api_jwt" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
) -> Result<impl IntoResponse, ApiError> {
    let plans = app_state
        .master_service
        .list_plans()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plans)))
}

#[utoipa::path(
    post,
    path = "/api/master/plans",
    tag = "Master",
    request_body = SavePlanPayload,
    responses((status = 200, description = "Plano salvo", body = Plan)),
    security(("api_jwt" = []))
)]
pub async fn save_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Json(payload): Json<SavePlanPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let plan = app_state
        .master_service
        .save_plan(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(plan)))
}

#[utoipa::path(
    delete,
    path = "/api/master/plans/{plan_id}",
    tag = "Master",
    responses((status = 204, description = "Plano removido")),
    params(("plan_id" = Uuid, Path, description = "ID do Plano")),
    security(("api_jwt" = []))
)]
pub async fn delete_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .master_service
        .delete_plan(plan_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Afiliados
// ---

#[utoipa::path(
    get,
    path = "/api/master/affiliates",
    tag = "Master",
    responses((status = 200, description = "Afiliados", body = Vec<Affiliate>)),
    security(("api_jwt" = []))
)]
pub async fn list_affiliates(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
) -> Result<impl IntoResponse, ApiError> {
    let affiliates = app_state
        .master_service
        .list_affiliates()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(affiliates)))
}

#[utoipa::path(
    post,
    path = "/api/master/affiliates",
    tag = "Master",
    request_body = SaveAffiliatePayload,
    responses(
        (status = 200, description = "Afiliado salvo", body = Affiliate),
        (status = 409, description = "Código já usado por outro afiliado")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_affiliate(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Json(payload): Json<SaveAffiliatePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let affiliate = app_state
        .master_service
        .save_affiliate(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(affiliate)))
}

#[utoipa::path(
    delete,
    path = "/api/master/affiliates/{affiliate_id}",
    tag = "Master",
    responses((status = 204, description = "Afiliado removido")),
    params(("affiliate_id" = Uuid, Path, description = "ID do Afiliado")),
    security(("api_jwt" = []))
)]
pub async fn delete_affiliate(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Path(affiliate_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .master_service
        .delete_affiliate(affiliate_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Terreiros (clientes do SaaS)
// ---

#[utoipa::path(
    get,
    path = "/api/master/clients",
    tag = "Master",
    responses((status = 200, description = "Todos os terreiros", body = Vec<SaasClient>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
) -> Result<impl IntoResponse, ApiError> {
    let mut clients = app_state
        .tenant_service
        .list_clients()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    clients.sort_by(|a, b| a.name.cmp(&b.name));

    Ok((StatusCode::OK, Json(clients)))
}

#[utoipa::path(
    post,
    path = "/api/master/clients",
    tag = "Master",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Terreiro criado com o usuário administrador", body = SaasClient),
        (status = 409, description = "E-mail do administrador já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let (client, _admin) = app_state
        .master_service
        .create_client(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    put,
    path = "/api/master/clients/{client_id}",
    tag = "Master",
    request_body = UpdateClientPayload,
    responses((status = 200, description = "Terreiro atualizado", body = SaasClient)),
    params(("client_id" = Uuid, Path, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state
        .master_service
        .update_client(client_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(client)))
}

// Bloqueio / liberação manual
#[utoipa::path(
    patch,
    path = "/api/master/clients/{client_id}/status",
    tag = "Master",
    request_body = ChangeStatusPayload,
    responses((status = 200, description = "Situação alterada", body = SaasClient)),
    params(("client_id" = Uuid, Path, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn change_client_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state
        .tenant_service
        .change_status(client_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(client)))
}

#[utoipa::path(
    delete,
    path = "/api/master/clients/{client_id}",
    tag = "Master",
    responses((status = 204, description = "Terreiro e todos os seus dados removidos")),
    params(("client_id" = Uuid, Path, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .master_service
        .delete_client(client_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Cobrança
// ---

#[utoipa::path(
    post,
    path = "/api/master/invoices/generate",
    tag = "Master",
    request_body = GenerateInvoicesPayload,
    responses(
        (status = 200, description = "Faturas criadas nesta execução", body = Vec<Invoice>),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Json(payload): Json<GenerateInvoicesPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let month = Month::parse(&payload.month).map_err(to_api)?;
    let created = app_state
        .master_service
        .generate_invoices(month)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/master/invoices",
    tag = "Master",
    responses((status = 200, description = "Faturas", body = Vec<Invoice>)),
    params(
        ("month" = Option<String>, Query, description = "AAAA-MM"),
        ("clientId" = Option<Uuid>, Query, description = "Filtra por terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Query(filter): Query<InvoiceFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let invoices = app_state
        .master_service
        .list_invoices(filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoices)))
}

#[utoipa::path(
    post,
    path = "/api/master/invoices/{invoice_id}/pay",
    tag = "Master",
    responses(
        (status = 200, description = "Fatura quitada", body = Invoice),
        (status = 409, description = "Fatura já encerrada")
    ),
    params(("invoice_id" = Uuid, Path, description = "ID da Fatura")),
    security(("api_jwt" = []))
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .master_service
        .mark_paid(invoice_id, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/master/invoices/{invoice_id}/cancel",
    tag = "Master",
    responses(
        (status = 200, description = "Fatura cancelada", body = Invoice),
        (status = 409, description = "Fatura já encerrada")
    ),
    params(("invoice_id" = Uuid, Path, description = "ID da Fatura")),
    security(("api_jwt" = []))
)]
pub async fn cancel_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .master_service
        .cancel_invoice(invoice_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(invoice)))
}

// Rotina de inadimplência (pode ser chamada por um cron externo)
#[utoipa::path(
    post,
    path = "/api/master/block-overdue",
    tag = "Master",
    request_body = BlockOverduePayload,
    responses((status = 200, description = "Terreiros bloqueados nesta execução", body = Vec<SaasClient>)),
    security(("api_jwt" = []))
)]
pub async fn block_overdue(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Json(payload): Json<BlockOverduePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let today = payload.today.unwrap_or_else(|| Utc::now().date_naive());

    let blocked = app_state
        .master_service
        .block_overdue(today, payload.grace_days)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(blocked)))
}

#[utoipa::path(
    get,
    path = "/api/master/report",
    tag = "Master",
    responses((status = 200, description = "Receita do mês e comissões", body = MasterReport)),
    params(("month" = Option<String>, Query, description = "AAAA-MM (padrão: mês atual)")),
    security(("api_jwt" = []))
)]
pub async fn report(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermMaster>,
    Query(filter): Query<MonthFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let month = match filter.month.as_deref() {
        Some(raw) => Month::parse(raw).map_err(to_api)?,
        None => Month::of(Utc::now().date_naive()),
    };
    let report = app_state.master_service.report(month).await.map_err(to_api)?;

    Ok((StatusCode::OK, Json(report)))
}
