pub mod attendance_service;
pub mod auth;
pub mod backup_service;
pub mod canteen_service;
pub mod course_service;
pub mod dashboard_service;
pub mod document_service;
pub mod email_service;
pub mod entity_service;
pub mod event_service;
pub mod finance_service;
pub mod id_card_service;
pub mod inventory_service;
pub mod master_service;
pub mod member_service;
pub mod settings_service;
pub mod tenancy_service;
