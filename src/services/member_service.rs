// src/services/member_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{dates::Month, error::AppError},
    db::{MemberRepository, Scope},
    models::members::{Member, MemberStatus, PaymentStatus, SaveMemberPayload},
    services::tenancy_service::TenantService,
};

#[derive(Clone)]
pub struct MemberService {
    member_repo: MemberRepository,
    tenant_service: TenantService,
}

impl MemberService {
    pub fn new(member_repo: MemberRepository, tenant_service: TenantService) -> Self {
        Self { member_repo, tenant_service }
    }

    pub async fn get_all_members(&self, client_id: Uuid) -> Result<Vec<Member>, AppError> {
        self.member_repo.get_all(Scope::Tenant(client_id)).await
    }

    pub async fn get_member(&self, client_id: Uuid, member_id: Uuid) -> Result<Member, AppError> {
        self.member_repo.get(Scope::Tenant(client_id), member_id).await
    }

    /// Cria (sem id ou id desconhecido) ou substitui o membro inteiro.
    pub async fn save_member(
        &self,
        client_id: Uuid,
        payload: SaveMemberPayload,
    ) -> Result<Member, AppError> {
        let scope = Scope::Tenant(client_id);

        let existing = match payload.id {
            Some(id) => self.member_repo.find(scope, id).await?,
            None => None,
        };

        if existing.is_none() {
            self.check_member_limit(client_id).await?;
        }

        // Meses sempre normalizados para "AAAA-MM"
        let monthly_payments = match payload.monthly_payments {
            Some(payments) => payments
                .into_iter()
                .map(|(month, status)| Ok((Month::parse(&month)?.key(), status)))
                .collect::<Result<_, AppError>>()?,
            None => existing
                .as_ref()
                .map(|m| m.monthly_payments.clone())
                .unwrap_or_default(),
        };

        let now = Utc::now();
        let member = Member {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            birth_date: payload.birth_date,
            address: payload.address,
            photo_url: payload.photo_url,
            is_medium: payload.is_medium,
            is_cambone: payload.is_cambone,
            entity_ids: payload.entity_ids,
            status: payload.status.unwrap_or(MemberStatus::Active),
            joined_at: payload.joined_at,
            monthly_payments,
            notes: payload.notes,
            created_at: existing.as_ref().map(|m| m.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.member_repo.save(scope, &member).await?;
        Ok(member)
    }

    async fn check_member_limit(&self, client_id: Uuid) -> Result<(), AppError> {
        let Some(limit) = self.tenant_service.member_limit(client_id).await? else {
            return Ok(());
        };

        let current = self.member_repo.get_all(Scope::Tenant(client_id)).await?.len();
        if current >= limit as usize {
            tracing::warn!("📛 Terreiro {} atingiu o limite de {} membros", client_id, limit);
            return Err(AppError::MemberLimitReached(limit));
        }
        Ok(())
    }

    /// Marca a mensalidade de um mês ("AAAA-MM").
    pub async fn set_payment(
        &self,
        client_id: Uuid,
        member_id: Uuid,
        month: &str,
        status: PaymentStatus,
    ) -> Result<Member, AppError> {
        let month = Month::parse(month)?;
        let scope = Scope::Tenant(client_id);

        let mut member = self.member_repo.get(scope, member_id).await?;
        member.monthly_payments.insert(month.key(), status);
        member.updated_at = Utc::now();

        self.member_repo.save(scope, &member).await?;
        Ok(member)
    }

    pub async fn delete_member(&self, client_id: Uuid, member_id: Uuid) -> Result<(), AppError> {
        self.member_repo
            .delete_existing(Scope::Tenant(client_id), member_id)
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::models::tenancy::{ClientStatus, SaasClient};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    pub(crate) fn member_payload(name: &str, is_medium: bool, is_cambone: bool) -> SaveMemberPayload {
        SaveMemberPayload {
            id: None,
            name: name.into(),
            email: Some(format!("{}@casa.com", name.to_lowercase())),
            phone: Some("(11) 99999-0000".into()),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 23),
            address: None,
            photo_url: None,
            is_medium,
            is_cambone,
            entity_ids: vec![],
            status: None,
            joined_at: NaiveDate::from_ymd_opt(2020, 1, 15),
            monthly_payments: None,
            notes: Some("Filha de Oxum".into()),
        }
    }

    /// Terreiro gravado direto no repositório (sem custo de bcrypt).
    pub(crate) async fn seed_client(state: &AppState, plan_id: Option<Uuid>) -> Uuid {
        let now = Utc::now();
        let client = SaasClient {
            id: Uuid::new_v4(),
            name: "Tenda de Teste".into(),
            owner_name: "Dono".into(),
            owner_email: "dono@teste.com".into(),
            plan_id,
            affiliate_id: None,
            status: ClientStatus::Active,
            monthly_fee: Decimal::new(4990, 2),
            due_day: 10,
            created_at: now,
            updated_at: now,
        };
        crate::db::ClientRepository::new(state.store.clone())
            .save(Scope::Root, &client)
            .await
            .unwrap();
        client.id
    }

    #[tokio::test]
    async fn saved_member_reads_back_identical() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let members = &state.member_service;

        let mut payload = member_payload("Ana", true, false);
        payload.monthly_payments = Some(BTreeMap::from([("2024-05".to_string(), PaymentStatus::Paid)]));
        let saved = members.save_member(client_id, payload).await.unwrap();

        let fetched = members.get_member(client_id, saved.id).await.unwrap();
        assert_eq!(fetched, saved);
        assert_eq!(fetched.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn resave_keeps_payment_history_and_creation_date() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let members = &state.member_service;

        let saved = members.save_member(client_id, member_payload("Ana", true, false)).await.unwrap();
        members
            .set_payment(client_id, saved.id, "2024-05", PaymentStatus::Exempt)
            .await
            .unwrap();

        let mut edit = member_payload("Ana Maria", true, true);
        edit.id = Some(saved.id);
        let edited = members.save_member(client_id, edit).await.unwrap();

        assert_eq!(edited.name, "Ana Maria");
        assert_eq!(edited.created_at, saved.created_at);
        assert_eq!(edited.monthly_payments.get("2024-05"), Some(&PaymentStatus::Exempt));
        assert_eq!(members.get_all_members(client_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_payment_rejects_malformed_month() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let saved = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();

        assert!(matches!(
            state
                .member_service
                .set_payment(client_id, saved.id, "05/2024", PaymentStatus::Paid)
                .await,
            Err(AppError::InvalidMonth(_))
        ));
    }

    #[tokio::test]
    async fn plan_limit_blocks_new_members_only() {
        let state = AppState::in_memory();
        let plan = state
            .master_service
            .save_plan(crate::models::master::SavePlanPayload {
                id: None,
                name: "Mini".into(),
                monthly_price: Decimal::ZERO,
                max_members: Some(1),
                features: vec![],
                active: true,
                is_default: false,
            })
            .await
            .unwrap();
        let client_id = seed_client(&state, Some(plan.id)).await;
        let members = &state.member_service;

        let first = members.save_member(client_id, member_payload("Ana", true, false)).await.unwrap();
        assert!(matches!(
            members.save_member(client_id, member_payload("Bento", false, true)).await,
            Err(AppError::MemberLimitReached(1))
        ));

        // Editar quem já existe continua permitido
        let mut edit = member_payload("Ana", false, false);
        edit.id = Some(first.id);
        members.save_member(client_id, edit).await.unwrap();
    }
}
