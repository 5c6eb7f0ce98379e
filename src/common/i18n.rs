// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

const DEFAULT_LANG: &str = "pt";

type Catalog = HashMap<&'static str, &'static str>;

// Catálogo de mensagens de erro por idioma. "{0}" recebe o argumento do erro.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<&'static str, Catalog>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let pt: Catalog = HashMap::from([
            ("validation", "Um ou mais campos são inválidos."),
            ("email_already_exists", "Este e-mail já está em uso."),
            ("invalid_credentials", "E-mail ou senha inválidos."),
            ("invalid_token", "Token de autenticação inválido ou ausente."),
            ("user_not_found", "Usuário não encontrado."),
            ("forbidden", "Você precisa da permissão '{0}' para realizar esta ação."),
            ("cannot_delete_self", "Você não pode remover o seu próprio usuário."),
            ("tenant_required", "O cabeçalho X-Tenant-ID é obrigatório."),
            ("tenant_blocked", "O acesso deste terreiro está suspenso."),
            ("not_found", "Registro não encontrado ({0})."),
            ("category_in_use", "A categoria '{0}' possui itens e não pode ser removida."),
            ("insufficient_stock", "Estoque insuficiente para '{0}'."),
            ("product_inactive", "O produto '{0}' não está disponível para venda."),
            ("invalid_month", "Mês inválido '{0}'. Use o formato AAAA-MM."),
            ("member_limit_reached", "O plano permite no máximo {0} membros."),
            ("already_enrolled", "Este membro já está matriculado no curso."),
            ("course_not_completed", "O curso ainda não foi concluído."),
            ("affiliate_code_exists", "O código de afiliado '{0}' já está em uso."),
            ("invoice_closed", "Esta fatura já foi encerrada."),
            ("invalid_recipient", "Destinatário inválido: {0}."),
            ("backup_tenant_mismatch", "O backup pertence a outro terreiro."),
            ("internal", "Ocorreu um erro inesperado."),
        ]);

        let en: Catalog = HashMap::from([
            ("validation", "One or more fields are invalid."),
            ("email_already_exists", "This e-mail is already in use."),
            ("invalid_credentials", "Invalid e-mail or password."),
            ("invalid_token", "Invalid or missing authentication token."),
            ("user_not_found", "User not found."),
            ("forbidden", "You need the '{0}' permission to perform this action."),
            ("cannot_delete_self", "You cannot delete your own user."),
            ("tenant_required", "The X-Tenant-ID header is required."),
            ("tenant_blocked", "Access to this house is suspended."),
            ("not_found", "Record not found ({0})."),
            ("category_in_use", "Category '{0}' still has items and cannot be removed."),
            ("insufficient_stock", "Insufficient stock for '{0}'."),
            ("product_inactive", "Product '{0}' is not available for sale."),
            ("invalid_month", "Invalid month '{0}'. Use the YYYY-MM format."),
            ("member_limit_reached", "The plan allows at most {0} members."),
            ("already_enrolled", "This member is already enrolled in the course."),
            ("course_not_completed", "The course has not been completed yet."),
            ("affiliate_code_exists", "Affiliate code '{0}' is already in use."),
            ("invoice_closed", "This invoice is already closed."),
            ("invalid_recipient", "Invalid recipient: {0}."),
            ("backup_tenant_mismatch", "The backup belongs to another house."),
            ("internal", "An unexpected error occurred."),
        ]);

        Self {
            catalogs: Arc::new(HashMap::from([("pt", pt), ("en", en)])),
        }
    }

    /// Traduz uma chave; idiomas desconhecidos caem no português.
    pub fn translate(&self, lang: &str, key: &str, arg: Option<&str>) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|c| c.get(key)))
            .copied()
            .unwrap_or(key);

        match arg {
            Some(value) => template.replace("{0}", value),
            None => template.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("fr", "user_not_found", None),
            "Usuário não encontrado."
        );
        assert_eq!(
            store.translate("en", "member_limit_reached", Some("50")),
            "The plan allows at most 50 members."
        );
        assert_eq!(store.translate("en", "unknown_key", None), "unknown_key");
    }
}
