// src/services/id_card_service.rs

use chrono::{Months, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{IdCardLogRepository, MemberRepository, Scope},
    models::{
        id_cards::IdCardLog,
        members::Member,
        settings::{CardField, SystemConfig},
    },
    services::{
        document_service::{short_code, DocumentService, PageData},
        settings_service::SettingsService,
    },
};

/// Carteirinhas emitidas: o PDF e os registros gravados.
#[derive(Debug)]
pub struct IssuedCards {
    pub pdf: Vec<u8>,
    pub logs: Vec<IdCardLog>,
}

fn card_page(config: &SystemConfig, member: &Member, log: &IdCardLog) -> PageData {
    PageData::default()
        .with(CardField::Name, member.name.clone())
        .with(CardField::Role, member.role_label())
        .with(CardField::MemberCode, format!("Nº {}", log.card_code))
        .with(CardField::TerreiroName, config.terreiro_name.clone())
        .with(CardField::IssueDate, format!("Emissão: {}", log.issued_at.format("%d/%m/%Y")))
        .with(CardField::ValidUntil, format!("Validade: {}", log.valid_until.format("%d/%m/%Y")))
        .with_qr(format!("CARD:{}:{}", member.id, log.card_code))
}

pub fn valid_until(issued_on: NaiveDate, validity_months: u32) -> NaiveDate {
    issued_on
        .checked_add_months(Months::new(validity_months))
        .unwrap_or(issued_on)
}

#[derive(Clone)]
pub struct IdCardService {
    member_repo: MemberRepository,
    log_repo: IdCardLogRepository,
    settings_service: SettingsService,
    document_service: DocumentService,
}

impl IdCardService {
    pub fn new(
        member_repo: MemberRepository,
        log_repo: IdCardLogRepository,
        settings_service: SettingsService,
        document_service: DocumentService,
    ) -> Self {
        Self { member_repo, log_repo, settings_service, document_service }
    }

    /// Gera os registros de emissão (um por membro) sem gravá-los.
    async fn prepare(
        &self,
        client_id: Uuid,
        member_ids: &[Uuid],
        issued_by: &str,
    ) -> Result<(SystemConfig, Vec<(Member, IdCardLog)>), AppError> {
        if member_ids.is_empty() {
            let mut errors = validator::ValidationErrors::new();
            let mut err = validator::ValidationError::new("length");
            err.message = Some("Selecione ao menos um membro.".into());
            errors.add("memberIds", err);
            return Err(AppError::ValidationError(errors));
        }

        let scope = Scope::Tenant(client_id);
        let config = self.settings_service.get_settings(client_id).await?;
        let issued_at = Utc::now();
        let valid_until = valid_until(issued_at.date_naive(), config.id_card_validity_months);

        let mut cards = Vec::with_capacity(member_ids.len());
        for member_id in member_ids {
            let member = self.member_repo.get(scope, *member_id).await?;
            let log = IdCardLog {
                id: Uuid::new_v4(),
                member_id: member.id,
                member_name: member.name.clone(),
                card_code: short_code(),
                issued_at,
                valid_until,
                issued_by: issued_by.to_string(),
            };
            cards.push((member, log));
        }
        Ok((config, cards))
    }

    /// Uma página por membro; os logs só são gravados se o PDF sair.
    pub async fn issue_cards(
        &self,
        client_id: Uuid,
        member_ids: &[Uuid],
        issued_by: &str,
    ) -> Result<IssuedCards, AppError> {
        let (config, cards) = self.prepare(client_id, member_ids, issued_by).await?;

        let pages = cards
            .iter()
            .map(|(member, log)| card_page(&config, member, log))
            .collect();
        let pdf = self
            .document_service
            .render_layout_pages("Carteirinhas", &config.id_card_layout, pages)?;

        let scope = Scope::Tenant(client_id);
        let mut logs = Vec::with_capacity(cards.len());
        for (_, log) in cards {
            self.log_repo.save(scope, &log).await?;
            logs.push(log);
        }

        tracing::info!("🪪 {} carteirinhas emitidas por {}", logs.len(), issued_by);
        Ok(IssuedCards { pdf, logs })
    }

    /// Histórico de emissões, mais recentes primeiro.
    pub async fn list_logs(
        &self,
        client_id: Uuid,
        member_id: Option<Uuid>,
    ) -> Result<Vec<IdCardLog>, AppError> {
        let scope = Scope::Tenant(client_id);
        let mut logs = match member_id {
            Some(member_id) => self.log_repo.find_where(scope, "memberId", member_id).await?,
            None => self.log_repo.get_all(scope).await?,
        };
        logs.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::services::member_service::tests::{member_payload, seed_client};

    #[test]
    fn validity_is_added_in_months() {
        let issued = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(valid_until(issued, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(valid_until(issued, 12), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[tokio::test]
    async fn card_pages_carry_member_data() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let member = state
            .member_service
            .save_member(client_id, member_payload("Ana", false, true))
            .await
            .unwrap();

        let (config, cards) = state
            .id_card_service
            .prepare(client_id, &[member.id], "admin@casa.com")
            .await
            .unwrap();
        let (member, log) = &cards[0];
        let page = card_page(&config, member, log);

        assert_eq!(page.values[&CardField::Name], "Ana");
        assert_eq!(page.values[&CardField::Role], "Cambone");
        assert!(page.qr_payload.as_deref().unwrap().ends_with(&log.card_code));
        assert_eq!(log.valid_until, valid_until(log.issued_at.date_naive(), 12));
    }

    #[tokio::test]
    async fn issuing_requires_members() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;

        assert!(matches!(
            state.id_card_service.issue_cards(client_id, &[], "admin").await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            state.id_card_service.issue_cards(client_id, &[Uuid::new_v4()], "admin").await,
            Err(AppError::NotFound("member"))
        ));
        assert!(state.id_card_service.list_logs(client_id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn issuing_renders_pdf_and_logs_each_member() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let members = &state.member_service;
        let ana = members.save_member(client_id, member_payload("Ana", true, false)).await.unwrap();
        let joao = members.save_member(client_id, member_payload("João", false, true)).await.unwrap();

        let issued = state
            .id_card_service
            .issue_cards(client_id, &[ana.id, joao.id], "admin@casa.com")
            .await
            .unwrap();
        assert!(issued.pdf.starts_with(b"%PDF"));
        assert_eq!(issued.logs.len(), 2);

        let logs = state.id_card_service.list_logs(client_id, None).await.unwrap();
        assert_eq!(logs.len(), 2);
        let for_ana = state.id_card_service.list_logs(client_id, Some(ana.id)).await.unwrap();
        assert_eq!(for_ana.len(), 1);
        assert_eq!(for_ana[0].member_name, "Ana");
    }
}
