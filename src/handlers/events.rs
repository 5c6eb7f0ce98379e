// src/handlers/events.rs

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
        rbac::{PermAttendance, PermEventsRead, PermEventsWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::events::{
        AttendanceSession, CalendarEvent, MonthFilter, MoveEventPayload, RecordAttendancePayload,
        SaveEventPayload,
    },
};

// ---
// Calendário
// ---

#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    responses((status = 200, description = "Eventos por data e horário", body = Vec<CalendarEvent>)),
    params(
        ("month" = Option<String>, Query, description = "AAAA-MM"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEventsRead>,
    Query(filter): Query<MonthFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let month = filter.month.as_deref().map(Month::parse).transpose().map_err(to_api)?;
    let events = app_state
        .event_service
        .list_events(tenant.0, month)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(events)))
}

#[utoipa::path(
    post,
    path = "/api/events",
    tag = "Events",
    request_body = SaveEventPayload,
    responses((status = 200, description = "Evento salvo", body = CalendarEvent)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn save_event(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEventsWrite>,
    Json(payload): Json<SaveEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let event = app_state
        .event_service
        .save_event(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(event)))
}

// Arrastar e soltar no calendário
#[utoipa::path(
    patch,
    path = "/api/events/{event_id}/date",
    tag = "Events",
    request_body = MoveEventPayload,
    responses((status = 200, description = "Evento remarcado", body = CalendarEvent)),
    params(
        ("event_id" = Uuid, Path, description = "ID do Evento"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_event(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEventsWrite>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<MoveEventPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let event = app_state
        .event_service
        .move_event(tenant.0, event_id, payload.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(event)))
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}",
    tag = "Events",
    responses((status = 204, description = "Evento removido")),
    params(
        ("event_id" = Uuid, Path, description = "ID do Evento"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_event(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermEventsWrite>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .event_service
        .delete_event(tenant.0, event_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Chamada
// ---

#[utoipa::path(
    post,
    path = "/api/attendance",
    tag = "Events",
    request_body = RecordAttendancePayload,
    responses((status = 200, description = "Chamada gravada (substitui a do mesmo dia/evento)", body = AttendanceSession)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn record_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermAttendance>,
    Json(payload): Json<RecordAttendancePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .attendance_service
        .record(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    tag = "Events",
    responses((status = 200, description = "Chamadas registradas", body = Vec<AttendanceSession>)),
    params(
        ("month" = Option<String>, Query, description = "AAAA-MM"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermAttendance>,
    Query(filter): Query<MonthFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let month = filter.month.as_deref().map(Month::parse).transpose().map_err(to_api)?;
    let sessions = app_state
        .attendance_service
        .list_sessions(tenant.0, month)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(sessions)))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{session_id}",
    tag = "Events",
    responses((status = 204, description = "Chamada removida")),
    params(
        ("session_id" = Uuid, Path, description = "ID da Chamada"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermAttendance>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .attendance_service
        .delete_session(tenant.0, session_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
