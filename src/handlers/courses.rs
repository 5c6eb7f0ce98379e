// src/handlers/courses.rs

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
        rbac::{PermCoursesRead, PermCoursesWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::courses::{Course, EnrollPayload, Enrollment, EnrollmentFilter, SaveCoursePayload},
};

#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "Courses",
    responses((status = 200, description = "Cursos do terreiro", body = Vec<Course>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn list_courses(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesRead>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = app_state
        .course_service
        .get_all_courses(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{course_id}",
    tag = "Courses",
    responses(
        (status = 200, description = "Curso com as aulas", body = Course),
        (status = 404, description = "Curso não encontrado")
    ),
    params(
        ("course_id" = Uuid, Path, description = "ID do Curso"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_course(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesRead>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = app_state
        .course_service
        .get_course(tenant.0, course_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "Courses",
    request_body = SaveCoursePayload,
    responses((status = 200, description = "Curso salvo", body = Course)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn save_course(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesWrite>,
    Json(payload): Json<SaveCoursePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let course = app_state
        .course_service
        .save_course(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(course)))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}",
    tag = "Courses",
    responses((status = 204, description = "Curso removido com as matrículas")),
    params(
        ("course_id" = Uuid, Path, description = "ID do Curso"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_course(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesWrite>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .course_service
        .delete_course(tenant.0, course_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Matrículas
// ---

#[utoipa::path(
    post,
    path = "/api/courses/{course_id}/enrollments",
    tag = "Courses",
    request_body = EnrollPayload,
    responses(
        (status = 201, description = "Membro matriculado", body = Enrollment),
        (status = 409, description = "Membro já matriculado")
    ),
    params(
        ("course_id" = Uuid, Path, description = "ID do Curso"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn enroll(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesWrite>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<EnrollPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = app_state
        .course_service
        .enroll(tenant.0, course_id, payload.member_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    get,
    path = "/api/enrollments",
    tag = "Courses",
    responses((status = 200, description = "Matrículas", body = Vec<Enrollment>)),
    params(
        ("courseId" = Option<Uuid>, Query, description = "Filtra por curso"),
        ("memberId" = Option<Uuid>, Query, description = "Filtra por membro"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_enrollments(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesRead>,
    Query(filter): Query<EnrollmentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollments = app_state
        .course_service
        .list_enrollments(tenant.0, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(enrollments)))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{enrollment_id}",
    tag = "Courses",
    responses((status = 204, description = "Matrícula cancelada")),
    params(
        ("enrollment_id" = Uuid, Path, description = "ID da Matrícula"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_enrollment(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesWrite>,
    Path(enrollment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .course_service
        .cancel_enrollment(tenant.0, enrollment_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// O aluno (ou a secretaria) marca a aula como assistida
#[utoipa::path(
    post,
    path = "/api/enrollments/{enrollment_id}/lessons/{lesson_id}/complete",
    tag = "Courses",
    responses(
        (status = 200, description = "Progresso recalculado", body = Enrollment),
        (status = 404, description = "Aula não pertence ao curso")
    ),
    params(
        ("enrollment_id" = Uuid, Path, description = "ID da Matrícula"),
        ("lesson_id" = Uuid, Path, description = "ID da Aula"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_lesson(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCoursesRead>,
    Path((enrollment_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = app_state
        .course_service
        .complete_lesson(tenant.0, enrollment_id, lesson_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(enrollment)))
}
