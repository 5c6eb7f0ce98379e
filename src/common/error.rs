// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erros de domínio. Cada variante vira um código i18n e um status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Permissão negada: {0}")]
    Forbidden(String),

    #[error("Não é possível remover o próprio usuário")]
    CannotDeleteSelf,

    #[error("Terreiro não informado")]
    TenantRequired,

    #[error("Terreiro bloqueado ou cancelado")]
    TenantBlocked,

    // O argumento é a chave do recurso ("member", "course", ...)
    #[error("Recurso não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Categoria em uso: {0}")]
    CategoryInUse(String),

    #[error("Estoque insuficiente: {0}")]
    InsufficientStock(String),

    #[error("Produto inativo: {0}")]
    ProductInactive(String),

    #[error("Mês inválido: {0}")]
    InvalidMonth(String),

    #[error("Limite de membros do plano atingido: {0}")]
    MemberLimitReached(u32),

    #[error("Membro já matriculado neste curso")]
    AlreadyEnrolled,

    #[error("Curso ainda não concluído")]
    CourseNotCompleted,

    #[error("Código de afiliado já existe: {0}")]
    AffiliateCodeAlreadyExists(String),

    #[error("Fatura já encerrada")]
    InvoiceClosed,

    #[error("Destinatário inválido: {0}")]
    InvalidRecipient(String),

    #[error("Backup pertence a outro terreiro")]
    BackupTenantMismatch,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro ao gerar PDF: {0}")]
    PdfError(String),

    #[error("Erro de armazenamento: {0}")]
    StorageError(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidMonth(_)
            | AppError::InvalidRecipient(_)
            | AppError::TenantRequired
            | AppError::BackupTenantMismatch => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::TenantBlocked | AppError::CannotDeleteSelf => {
                StatusCode::FORBIDDEN
            }
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::CategoryInUse(_)
            | AppError::AlreadyEnrolled
            | AppError::AffiliateCodeAlreadyExists(_)
            | AppError::InvoiceClosed => StatusCode::CONFLICT,
            AppError::InsufficientStock(_)
            | AppError::ProductInactive(_)
            | AppError::MemberLimitReached(_)
            | AppError::CourseNotCompleted => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave usada no catálogo de mensagens.
    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::CannotDeleteSelf => "cannot_delete_self",
            AppError::TenantRequired => "tenant_required",
            AppError::TenantBlocked => "tenant_blocked",
            AppError::NotFound(_) => "not_found",
            AppError::CategoryInUse(_) => "category_in_use",
            AppError::InsufficientStock(_) => "insufficient_stock",
            AppError::ProductInactive(_) => "product_inactive",
            AppError::InvalidMonth(_) => "invalid_month",
            AppError::MemberLimitReached(_) => "member_limit_reached",
            AppError::AlreadyEnrolled => "already_enrolled",
            AppError::CourseNotCompleted => "course_not_completed",
            AppError::AffiliateCodeAlreadyExists(_) => "affiliate_code_exists",
            AppError::InvoiceClosed => "invoice_closed",
            AppError::InvalidRecipient(_) => "invalid_recipient",
            AppError::BackupTenantMismatch => "backup_tenant_mismatch",
            _ => "internal",
        }
    }

    fn message_arg(&self) -> Option<String> {
        match self {
            AppError::Forbidden(slug) => Some(slug.clone()),
            AppError::NotFound(resource) => Some((*resource).to_string()),
            AppError::CategoryInUse(name)
            | AppError::InsufficientStock(name)
            | AppError::ProductInactive(name)
            | AppError::InvalidMonth(name)
            | AppError::AffiliateCodeAlreadyExists(name)
            | AppError::InvalidRecipient(name) => Some(name.clone()),
            AppError::MemberLimitReached(limit) => Some(limit.to_string()),
            _ => None,
        }
    }

    /// Converte o erro de domínio em resposta HTTP já traduzida.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let error = store.translate(&locale.0, self.message_key(), self.message_arg().as_deref());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                collect_details("", errors, &mut details);
                Some(json!(details))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// Achata erros aninhados: "fees.due_day", "id_card_layout.fields[0].x_percent"
fn collect_details(prefix: &str, errors: &ValidationErrors, details: &mut HashMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{prefix}.{field}") };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(path, messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_details(&path, inner, details),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_details(&format!("{path}[{index}]"), inner, details);
                }
            }
        }
    }
}

// Rejeição de extratores: sem acesso ao Accept-Language, usa o idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &I18nStore::new())
            .into_response()
    }
}

// O erro que efetivamente sai pela API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_http_status() {
        assert_eq!(AppError::CategoryInUse("Velas".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound("member").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::TenantBlocked.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InsufficientStock("Velas".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::StorageError("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn translates_message_with_argument() {
        let store = I18nStore::new();
        let api = AppError::InsufficientStock("Velas".into())
            .to_api_error(&Locale("pt".into()), &store);
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(api.error.contains("Velas"));
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("length");
        err.message = Some("O nome é obrigatório.".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "O nome é obrigatório.");
    }
}
