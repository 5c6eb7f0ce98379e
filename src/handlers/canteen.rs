// src/handlers/canteen.rs

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
        rbac::{PermCanteen, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        canteen::{CanteenProduct, CanteenSale, RegisterSalePayload, SaveProductPayload},
        events::MonthFilter,
    },
};

#[utoipa::path(
    get,
    path = "/api/canteen/products",
    tag = "Canteen",
    responses((status = 200, description = "Cardápio da cantina", body = Vec<CanteenProduct>)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCanteen>,
) -> Result<impl IntoResponse, ApiError> {
    let mut products = app_state
        .canteen_service
        .get_all_products(tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    products.sort_by(|a, b| a.name.cmp(&b.name));

    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    post,
    path = "/api/canteen/products",
    tag = "Canteen",
    request_body = SaveProductPayload,
    responses((status = 200, description = "Produto salvo", body = CanteenProduct)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn save_product(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCanteen>,
    Json(payload): Json<SaveProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .canteen_service
        .save_product(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/canteen/products/{product_id}",
    tag = "Canteen",
    responses((status = 204, description = "Produto removido")),
    params(
        ("product_id" = Uuid, Path, description = "ID do Produto"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCanteen>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .canteen_service
        .delete_product(tenant.0, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/canteen/sales",
    tag = "Canteen",
    request_body = RegisterSalePayload,
    responses(
        (status = 201, description = "Venda registrada", body = CanteenSale),
        (status = 422, description = "Produto inativo ou sem estoque")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")),
    security(("api_jwt" = []))
)]
pub async fn register_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCanteen>,
    Json(payload): Json<RegisterSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sale = app_state
        .canteen_service
        .register_sale(tenant.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/api/canteen/sales",
    tag = "Canteen",
    responses((status = 200, description = "Vendas, mais recentes primeiro", body = Vec<CanteenSale>)),
    params(
        ("month" = Option<String>, Query, description = "AAAA-MM"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCanteen>,
    Query(filter): Query<MonthFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let month = filter.month.as_deref().map(Month::parse).transpose().map_err(to_api)?;
    let sales = app_state
        .canteen_service
        .list_sales(tenant.0, month)
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(sales)))
}

// Estorno: devolve o estoque
#[utoipa::path(
    delete,
    path = "/api/canteen/sales/{sale_id}",
    tag = "Canteen",
    responses((status = 204, description = "Venda estornada")),
    params(
        ("sale_id" = Uuid, Path, description = "ID da Venda"),
        ("x-tenant-id" = Uuid, Header, description = "ID do Terreiro")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _guard: RequirePermission<PermCanteen>,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .canteen_service
        .delete_sale(tenant.0, sale_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
