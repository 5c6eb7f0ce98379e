// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, tenant_guard},
};

pub fn build_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/signup", post(handlers::auth::signup));

    // Só exigem login
    let profile_routes = Router::new()
        .route("/api/users/me", get(handlers::auth::get_me))
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let master_routes = Router::new()
        .route(
            "/plans",
            get(handlers::master::list_plans).post(handlers::master::save_plan),
        )
        .route("/plans/{plan_id}", delete(handlers::master::delete_plan))
        .route(
            "/affiliates",
            get(handlers::master::list_affiliates).post(handlers::master::save_affiliate),
        )
        .route("/affiliates/{affiliate_id}", delete(handlers::master::delete_affiliate))
        .route(
            "/clients",
            get(handlers::master::list_clients).post(handlers::master::create_client),
        )
        .route(
            "/clients/{client_id}",
            put(handlers::master::update_client).delete(handlers::master::delete_client),
        )
        .route("/clients/{client_id}/status", patch(handlers::master::change_client_status))
        .route("/invoices", get(handlers::master::list_invoices))
        .route("/invoices/generate", post(handlers::master::generate_invoices))
        .route("/invoices/{invoice_id}/pay", post(handlers::master::mark_paid))
        .route("/invoices/{invoice_id}/cancel", post(handlers::master::cancel_invoice))
        .route("/block-overdue", post(handlers::master::block_overdue))
        .route("/report", get(handlers::master::report))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Tudo que vive dentro de um terreiro (X-Tenant-ID)
    let tenant_routes = Router::new()
        .route(
            "/api/users",
            get(handlers::auth::list_users).post(handlers::auth::create_user),
        )
        .route("/api/users/{user_id}", delete(handlers::auth::delete_user))
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        // Filhos da casa e entidades
        .route(
            "/api/members",
            get(handlers::members::list_members).post(handlers::members::save_member),
        )
        .route(
            "/api/members/{member_id}",
            get(handlers::members::get_member).delete(handlers::members::delete_member),
        )
        .route("/api/members/{member_id}/payments", put(handlers::members::set_payment))
        .route("/api/members/{member_id}/attendance", get(handlers::members::member_attendance))
        .route(
            "/api/entities",
            get(handlers::members::list_entities).post(handlers::members::save_entity),
        )
        .route("/api/entities/{entity_id}", delete(handlers::members::delete_entity))
        // Almoxarifado
        .route(
            "/api/inventory/categories",
            get(handlers::inventory::get_all_categories).post(handlers::inventory::create_category),
        )
        .route(
            "/api/inventory/categories/{category_id}",
            put(handlers::inventory::update_category).delete(handlers::inventory::delete_category),
        )
        .route(
            "/api/inventory/items",
            get(handlers::inventory::get_all_items).post(handlers::inventory::create_item),
        )
        .route("/api/inventory/items/low-stock", get(handlers::inventory::low_stock))
        .route(
            "/api/inventory/items/{item_id}",
            put(handlers::inventory::update_item).delete(handlers::inventory::delete_item),
        )
        .route("/api/inventory/items/{item_id}/adjust", post(handlers::inventory::adjust_stock))
        .route("/api/inventory/logs", get(handlers::inventory::list_logs))
        // Cursos EAD
        .route(
            "/api/courses",
            get(handlers::courses::list_courses).post(handlers::courses::save_course),
        )
        .route(
            "/api/courses/{course_id}",
            get(handlers::courses::get_course).delete(handlers::courses::delete_course),
        )
        .route("/api/courses/{course_id}/enrollments", post(handlers::courses::enroll))
        .route("/api/enrollments", get(handlers::courses::list_enrollments))
        .route("/api/enrollments/{enrollment_id}", delete(handlers::courses::cancel_enrollment))
        .route(
            "/api/enrollments/{enrollment_id}/lessons/{lesson_id}/complete",
            post(handlers::courses::complete_lesson),
        )
        .route(
            "/api/enrollments/{enrollment_id}/certificate",
            get(handlers::documents::certificate_pdf),
        )
        // Cantina
        .route(
            "/api/canteen/products",
            get(handlers::canteen::list_products).post(handlers::canteen::save_product),
        )
        .route("/api/canteen/products/{product_id}", delete(handlers::canteen::delete_product))
        .route(
            "/api/canteen/sales",
            get(handlers::canteen::list_sales).post(handlers::canteen::register_sale),
        )
        .route("/api/canteen/sales/{sale_id}", delete(handlers::canteen::delete_sale))
        // Calendário e chamada
        .route(
            "/api/events",
            get(handlers::events::list_events).post(handlers::events::save_event),
        )
        .route("/api/events/{event_id}", delete(handlers::events::delete_event))
        .route("/api/events/{event_id}/date", patch(handlers::events::move_event))
        .route(
            "/api/attendance",
            get(handlers::events::list_attendance).post(handlers::events::record_attendance),
        )
        .route("/api/attendance/{session_id}", delete(handlers::events::delete_attendance))
        // Documentos
        .route("/api/id-cards", post(handlers::documents::issue_cards))
        .route("/api/id-cards/logs", get(handlers::documents::list_card_logs))
        // E-mail
        .route(
            "/api/email/accounts",
            get(handlers::email::list_accounts).post(handlers::email::save_account),
        )
        .route("/api/email/accounts/{account_id}", delete(handlers::email::delete_account))
        .route(
            "/api/email/accounts/{account_id}/messages",
            get(handlers::email::list_messages),
        )
        .route("/api/email/accounts/{account_id}/check", post(handlers::email::check_mail))
        .route("/api/email/accounts/{account_id}/send", post(handlers::email::send_message))
        .route("/api/email/messages/{message_id}", delete(handlers::email::delete_message))
        .route("/api/email/messages/{message_id}/read", post(handlers::email::mark_read))
        .route("/api/email/messages/{message_id}/trash", post(handlers::email::move_to_trash))
        // Financeiro
        .route(
            "/api/finance/donations",
            get(handlers::finance::list_donations).post(handlers::finance::save_donation),
        )
        .route("/api/finance/donations/{donation_id}", delete(handlers::finance::delete_donation))
        .route("/api/finance/report", get(handlers::finance::monthly_report))
        .route("/api/finance/report/pdf", get(handlers::documents::finance_report_pdf))
        // Backup
        .route(
            "/api/backup",
            get(handlers::backup::export_backup).post(handlers::backup::import_backup),
        )
        // route_layer: caminho inexistente continua 404
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), tenant_guard));

    // Combina tudo no router principal
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/permissions", get(handlers::rbac::list_permissions))
        .nest("/api/auth", auth_routes)
        .nest("/api/master", master_routes)
        .merge(profile_routes)
        .merge(tenant_routes)
        .with_state(app_state)
}
