// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::signup,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::create_user,
        handlers::auth::delete_user,

        // --- RBAC ---
        handlers::rbac::list_permissions,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Dashboard ---
        handlers::dashboard::get_summary,

        // --- Members ---
        handlers::members::list_members,
        handlers::members::get_member,
        handlers::members::save_member,
        handlers::members::set_payment,
        handlers::members::delete_member,
        handlers::members::member_attendance,
        handlers::members::list_entities,
        handlers::members::save_entity,
        handlers::members::delete_entity,

        // --- INVENTORY ---
        handlers::inventory::get_all_categories,
        handlers::inventory::create_category,
        handlers::inventory::update_category,
        handlers::inventory::delete_category,
        handlers::inventory::get_all_items,
        handlers::inventory::low_stock,
        handlers::inventory::create_item,
        handlers::inventory::update_item,
        handlers::inventory::adjust_stock,
        handlers::inventory::delete_item,
        handlers::inventory::list_logs,

        // --- Courses ---
        handlers::courses::list_courses,
        handlers::courses::get_course,
        handlers::courses::save_course,
        handlers::courses::delete_course,
        handlers::courses::enroll,
        handlers::courses::list_enrollments,
        handlers::courses::cancel_enrollment,
        handlers::courses::complete_lesson,

        // --- Canteen ---
        handlers::canteen::list_products,
        handlers::canteen::save_product,
        handlers::canteen::delete_product,
        handlers::canteen::register_sale,
        handlers::canteen::list_sales,
        handlers::canteen::delete_sale,

        // --- Events ---
        handlers::events::list_events,
        handlers::events::save_event,
        handlers::events::move_event,
        handlers::events::delete_event,
        handlers::events::record_attendance,
        handlers::events::list_attendance,
        handlers::events::delete_attendance,

        // --- Documents ---
        handlers::documents::issue_cards,
        handlers::documents::list_card_logs,
        handlers::documents::certificate_pdf,
        handlers::documents::finance_report_pdf,

        // --- Email ---
        handlers::email::list_accounts,
        handlers::email::save_account,
        handlers::email::delete_account,
        handlers::email::list_messages,
        handlers::email::check_mail,
        handlers::email::send_message,
        handlers::email::mark_read,
        handlers::email::move_to_trash,
        handlers::email::delete_message,

        // --- Finance ---
        handlers::finance::list_donations,
        handlers::finance::save_donation,
        handlers::finance::delete_donation,
        handlers::finance::monthly_report,

        // --- Backup ---
        handlers::backup::export_backup,
        handlers::backup::import_backup,

        // --- Master ---
        handlers::master::list_plans,
        handlers::master::save_plan,
        handlers::master::delete_plan,
        handlers::master::list_affiliates,
        handlers::master::save_affiliate,
        handlers::master::delete_affiliate,
        handlers::master::list_clients,
        handlers::master::create_client,
        handlers::master::update_client,
        handlers::master::change_client_status,
        handlers::master::delete_client,
        handlers::master::generate_invoices,
        handlers::master::list_invoices,
        handlers::master::mark_paid,
        handlers::master::cancel_invoice,
        handlers::master::block_overdue,
        handlers::master::report,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::SignupPayload,
            models::auth::CreateUserPayload,
            models::auth::AuthResponse,

            // --- Settings ---
            models::settings::CardField,
            models::settings::LayoutField,
            models::settings::CardLayout,
            models::settings::FeeSchedule,
            models::settings::SystemConfig,
            models::settings::UpdateSettingsRequest,

            // --- DASHBOARD / BACKUP ---
            models::dashboard::DashboardSummary,
            models::dashboard::TenantBackup,
            models::dashboard::ImportSummary,

            // --- Members ---
            models::members::MemberStatus,
            models::members::PaymentStatus,
            models::members::Member,
            models::members::SaveMemberPayload,
            models::members::SetPaymentPayload,
            models::members::SpiritualEntity,
            models::members::SaveEntityPayload,

            // --- Inventory ---
            models::inventory::InventoryCategory,
            models::inventory::InventoryItem,
            models::inventory::StockLogType,
            models::inventory::StockLog,
            models::inventory::SaveCategoryPayload,
            models::inventory::SaveItemPayload,
            models::inventory::AdjustStockPayload,

            // --- Courses ---
            models::courses::Lesson,
            models::courses::Course,
            models::courses::EnrollmentStatus,
            models::courses::Enrollment,
            models::courses::LessonPayload,
            models::courses::SaveCoursePayload,
            models::courses::EnrollPayload,

            // --- Canteen ---
            models::canteen::CanteenProduct,
            models::canteen::CanteenSaleLine,
            models::canteen::CanteenSale,
            models::canteen::SaveProductPayload,
            models::canteen::SaleLinePayload,
            models::canteen::RegisterSalePayload,

            // --- Events ---
            models::events::EventKind,
            models::events::CalendarEvent,
            models::events::SaveEventPayload,
            models::events::MoveEventPayload,
            models::events::AttendanceSession,
            models::events::RecordAttendancePayload,
            models::events::AttendanceSummary,

            // --- Documents ---
            models::id_cards::IdCardLog,
            models::id_cards::IssueCardsPayload,

            // --- Email ---
            models::email::EmailAccount,
            models::email::Folder,
            models::email::EmailMessage,
            models::email::SaveAccountPayload,
            models::email::SendMessagePayload,
            models::email::MailboxSnapshot,

            // --- FINANCE ---
            models::finance::DonationKind,
            models::finance::Donation,
            models::finance::SaveDonationPayload,
            models::finance::FeeCategory,
            models::finance::MemberFeeLine,
            models::finance::MonthlyReport,

            // --- TENANCY / MASTER ---
            models::tenancy::ClientStatus,
            models::tenancy::SaasClient,
            models::master::Plan,
            models::master::SavePlanPayload,
            models::master::Affiliate,
            models::master::SaveAffiliatePayload,
            models::master::CreateClientPayload,
            models::master::UpdateClientPayload,
            models::master::ChangeStatusPayload,
            models::master::InvoiceStatus,
            models::master::Invoice,
            models::master::GenerateInvoicesPayload,
            models::master::BlockOverduePayload,
            models::master::AffiliateCommission,
            models::master::MasterReport,
        )
    ),
    tags(
        (name = "Auth", description = "Login e cadastro self-service"),
        (name = "Users", description = "Usuários do terreiro"),
        (name = "RBAC", description = "Permissões por papel"),
        (name = "Settings", description = "Configurações do Terreiro"),
        (name = "Dashboard", description = "Indicadores da tela inicial"),
        (name = "Members", description = "Filhos da casa e entidades"),
        (name = "Inventory", description = "Almoxarifado"),
        (name = "Courses", description = "Cursos EAD e matrículas"),
        (name = "Canteen", description = "Cantina"),
        (name = "Events", description = "Calendário e chamada"),
        (name = "Documents", description = "Carteirinhas, certificados e relatórios em PDF"),
        (name = "Email", description = "Cliente de e-mail simulado"),
        (name = "Finance", description = "Mensalidades e doações"),
        (name = "Backup", description = "Exportação e restauração"),
        (name = "Master", description = "Planos, afiliados e cobrança do SaaS")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
