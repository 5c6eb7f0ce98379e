// src/handlers/documents.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    common::{
        dates::Month,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermCardsIssue, PermFinanceRead, PermMembersRead, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        events::MonthFilter,
        id_cards::{CardLogFilter, IdCardLog, IssueCardsPayload},
    },
};

// Configura os Headers para o navegador baixar ou mostrar o PDF
fn pdf_attachment(filename: &str, pdf_bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{filename}\"");
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf_bytes,
    )
        .into_response()
}

// POST /api/id-cards: uma página por membro
#[utoipa::path(
    post,
    path = "/api/id-cards",
    tag = "Documents",
    request_body = IssueCardsPayload,
    responses(
        (status = 200, description = "PDF das carteirinhas", content_type = "application/pdf"),
        (status = 404, description = "Membro não encontrado")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn issue_cards(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
    _guard: RequirePermission<PermCardsIssue>,
    Json(payload): Json<IssueCardsPayload>,
) -> Result<Response, ApiError> {
    let issued = app_state
        .id_card_service
        .issue_cards(tenant.0, &payload.member_ids, &user.email)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(pdf_attachment("carteirinhas.pdf", issued.pdf))
}

#[utoipa::path(
    get,
    path = "/api/id-cards/logs",
    tag = "Documents",
    responses((status = 200, description = "Histórico de emissões", body = Vec<IdCardLog>)),
    params(
        ("memberId" = Option<Uuid>, Query, description = "Filtra por membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_card_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermMembersRead>,
    Query(filter): Query<CardLogFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .id_card_service
        .list_logs(tenant.0, filter.member_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(logs)))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/{enrollment_id}/certificate",
    tag = "Documents",
    responses(
        (status = 200, description = "PDF do certificado", content_type = "application/pdf"),
        (status = 422, description = "Curso ainda não concluído")
    ),
    params(
        ("enrollment_id" = Uuid, Path, description = "ID da Matrícula"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn certificate_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCardsIssue>,
    Path(enrollment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .course_service
        .certificate_pdf(tenant.0, enrollment_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(pdf_attachment(&format!("certificado_{enrollment_id}.pdf"), pdf_bytes))
}

// Versão para impressão do relatório mensal
#[utoipa::path(
    get,
    path = "/api/finance/report/pdf",
    tag = "Documents",
    responses((status = 200, description = "PDF do relatório mensal", content_type = "application/pdf")),
    params(
        ("month" = String, Query, description = "AAAA-MM"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn finance_report_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermFinanceRead>,
    Query(filter): Query<MonthFilter>,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let raw = filter.month.unwrap_or_default();
    let month = Month::parse(&raw).map_err(to_api)?;
    let pdf_bytes = app_state
        .finance_service
        .report_pdf(tenant.0, month)
        .await
        .map_err(to_api)?;

    Ok(pdf_attachment(&format!("relatorio_{month}.pdf"), pdf_bytes))
}
