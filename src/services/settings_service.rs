// src/services/settings_service.rs

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{ConfigRepository, Scope},
    models::settings::{SystemConfig, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsService {
    config_repo: ConfigRepository,
}

impl SettingsService {
    pub fn new(config_repo: ConfigRepository) -> Self {
        Self { config_repo }
    }

    /// Configuração do terreiro; sem documento gravado, devolve o padrão.
    pub async fn get_settings(&self, client_id: Uuid) -> Result<SystemConfig, AppError> {
        let config = self
            .config_repo
            .find(Scope::Tenant(client_id), client_id)
            .await?;

        Ok(config.unwrap_or_else(|| SystemConfig::defaults(client_id, "")))
    }

    /// Grava a configuração inicial de um terreiro recém-criado.
    pub async fn init_settings(&self, client_id: Uuid, terreiro_name: &str) -> Result<SystemConfig, AppError> {
        let config = SystemConfig::defaults(client_id, terreiro_name);
        self.config_repo.save(Scope::Tenant(client_id), &config).await?;
        Ok(config)
    }

    pub async fn update_settings(
        &self,
        client_id: Uuid,
        payload: UpdateSettingsRequest,
    ) -> Result<SystemConfig, AppError> {
        payload.validate()?;

        let config = SystemConfig {
            id: client_id,
            terreiro_name: payload.terreiro_name,
            document_number: payload.document_number,
            address: payload.address,
            phone: payload.phone,
            email: payload.email,
            logo_url: payload.logo_url,
            primary_color: payload.primary_color,
            fees: payload.fees,
            id_card_validity_months: payload.id_card_validity_months,
            id_card_layout: payload.id_card_layout,
            certificate_layout: payload.certificate_layout,
            updated_at: Some(Utc::now()),
        };

        self.config_repo.save(Scope::Tenant(client_id), &config).await?;
        tracing::info!("⚙️ Configuração do terreiro {} atualizada", client_id);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::i18n::I18nStore;
    use crate::db::{MemoryDocumentStore, Repository};
    use crate::middleware::i18n::Locale;
    use crate::models::settings::FeeSchedule;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn service() -> SettingsService {
        SettingsService::new(Repository::new(Arc::new(MemoryDocumentStore::new())))
    }

    fn request(config: &SystemConfig) -> UpdateSettingsRequest {
        UpdateSettingsRequest {
            terreiro_name: "Casa de Oxalá".into(),
            document_number: None,
            address: Some("Rua das Flores, 10".into()),
            phone: None,
            email: None,
            logo_url: None,
            primary_color: Some("#ffffff".into()),
            fees: FeeSchedule::default(),
            id_card_validity_months: 24,
            id_card_layout: config.id_card_layout.clone(),
            certificate_layout: config.certificate_layout.clone(),
        }
    }

    #[tokio::test]
    async fn missing_config_falls_back_to_defaults() {
        let client_id = Uuid::new_v4();
        let config = service().get_settings(client_id).await.unwrap();
        assert_eq!(config.id, client_id);
        assert_eq!(config.fees, FeeSchedule::default());
        assert_eq!(config.id_card_validity_months, 12);
    }

    #[tokio::test]
    async fn update_replaces_the_document() {
        let service = service();
        let client_id = Uuid::new_v4();
        let initial = service.init_settings(client_id, "Casa").await.unwrap();

        service.update_settings(client_id, request(&initial)).await.unwrap();

        let stored = service.get_settings(client_id).await.unwrap();
        assert_eq!(stored.terreiro_name, "Casa de Oxalá");
        assert_eq!(stored.id_card_validity_months, 24);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn rejects_positions_outside_the_page() {
        let service = service();
        let client_id = Uuid::new_v4();
        let initial = service.init_settings(client_id, "Casa").await.unwrap();

        let mut payload = request(&initial);
        payload.id_card_layout.fields[0].x_percent = 120.0;

        let Err(AppError::ValidationError(errors)) = service.update_settings(client_id, payload).await
        else {
            panic!("layout fora da página deveria ser recusado");
        };
        let api = AppError::ValidationError(errors).to_api_error(&Locale("pt".into()), &I18nStore::new());
        assert_eq!(api.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(api.details.unwrap()["id_card_layout.fields[0].x_percent"].is_array());
    }

    #[tokio::test]
    async fn rejects_negative_fees_and_bad_due_day() {
        let service = service();
        let client_id = Uuid::new_v4();
        let initial = service.init_settings(client_id, "Casa").await.unwrap();

        let mut payload = request(&initial);
        payload.fees.cambone_fee = Decimal::new(-1, 0);
        payload.fees.due_day = 31;

        let Err(AppError::ValidationError(errors)) = service.update_settings(client_id, payload).await
        else {
            panic!("mensalidade inválida deveria ser recusada");
        };
        let fees = &errors.errors()["fees"];
        assert!(matches!(fees, validator::ValidationErrorsKind::Struct(inner)
            if inner.field_errors().contains_key("cambone_fee")
                && inner.field_errors().contains_key("due_day")));
    }
}
