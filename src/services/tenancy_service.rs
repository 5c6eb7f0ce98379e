// src/services/tenancy_service.rs

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ClientRepository, DocumentStore, PlanRepository, Scope, UserRepository},
    models::{
        auth::{User, UserRole},
        master::{Plan, UpdateClientPayload},
        tenancy::{ClientStatus, SaasClient},
    },
    services::{auth::hash_password, settings_service::SettingsService},
};

/// Dados para abrir um terreiro (cadastro self-service ou painel master).
#[derive(Debug)]
pub struct NewClient {
    pub name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub admin_password: String,
    pub plan_id: Option<Uuid>,
    pub affiliate_id: Option<Uuid>,
    // None: usa o preço do plano
    pub monthly_fee: Option<Decimal>,
    pub due_day: u32,
    pub status: ClientStatus,
}

#[derive(Clone)]
pub struct TenantService {
    client_repo: ClientRepository,
    plan_repo: PlanRepository,
    user_repo: UserRepository,
    settings_service: SettingsService,
    store: Arc<dyn DocumentStore>,
}

impl TenantService {
    pub fn new(
        client_repo: ClientRepository,
        plan_repo: PlanRepository,
        user_repo: UserRepository,
        settings_service: SettingsService,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { client_repo, plan_repo, user_repo, settings_service, store }
    }

    pub async fn get_client(&self, client_id: Uuid) -> Result<SaasClient, AppError> {
        self.client_repo.get(Scope::Root, client_id).await
    }

    pub async fn list_clients(&self) -> Result<Vec<SaasClient>, AppError> {
        self.client_repo.get_all(Scope::Root).await
    }

    /// Plano marcado como padrão (o primeiro ativo, se houver mais de um).
    pub async fn default_plan(&self) -> Result<Option<Plan>, AppError> {
        let plans = self.plan_repo.get_all(Scope::Root).await?;
        Ok(plans.into_iter().find(|p| p.active && p.is_default))
    }

    /// Limite de membros do plano do terreiro. None = ilimitado.
    pub async fn member_limit(&self, client_id: Uuid) -> Result<Option<u32>, AppError> {
        let client = self.get_client(client_id).await?;
        let Some(plan_id) = client.plan_id else {
            return Ok(None);
        };
        let plan = self.plan_repo.find(Scope::Root, plan_id).await?;
        Ok(plan.and_then(|p| p.max_members))
    }

    /// LÓGICA DE NEGÓCIO: cria o terreiro, o usuário administrador e a configuração padrão.
    ///
    /// Sem transação: cada documento é gravado em sequência.
    pub async fn create_client(&self, new: NewClient) -> Result<(SaasClient, User), AppError> {
        let owner_email = new.owner_email.trim().to_lowercase();
        if self.user_repo.find_by_email(&owner_email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let plan = match new.plan_id {
            Some(plan_id) => Some(self.plan_repo.get(Scope::Root, plan_id).await?),
            None => None,
        };
        let monthly_fee = new
            .monthly_fee
            .or(plan.as_ref().map(|p| p.monthly_price))
            .unwrap_or(Decimal::ZERO);

        let password_hash = hash_password(&new.admin_password).await?;

        let now = Utc::now();
        let client = SaasClient {
            id: Uuid::new_v4(),
            name: new.name,
            owner_name: new.owner_name,
            owner_email: owner_email.clone(),
            plan_id: plan.map(|p| p.id),
            affiliate_id: new.affiliate_id,
            status: new.status,
            monthly_fee,
            due_day: new.due_day,
            created_at: now,
            updated_at: now,
        };

        let admin = User {
            id: Uuid::new_v4(),
            email: owner_email,
            name: client.owner_name.clone(),
            password_hash,
            role: UserRole::Admin,
            client_id: Some(client.id),
            created_at: now,
            updated_at: now,
        };

        self.client_repo.save(Scope::Root, &client).await?;
        self.user_repo.create_user(&admin).await?;
        self.settings_service.init_settings(client.id, &client.name).await?;

        tracing::info!("🏠 Terreiro '{}' criado ({:?})", client.name, client.status);
        Ok((client, admin))
    }

    pub async fn update_client(
        &self,
        client_id: Uuid,
        payload: UpdateClientPayload,
    ) -> Result<SaasClient, AppError> {
        let mut client = self.get_client(client_id).await?;

        if let Some(plan_id) = payload.plan_id {
            self.plan_repo.get(Scope::Root, plan_id).await?;
        }

        client.name = payload.name;
        client.plan_id = payload.plan_id;
        client.affiliate_id = payload.affiliate_id;
        client.monthly_fee = payload.monthly_fee;
        client.due_day = payload.due_day;
        client.updated_at = Utc::now();

        self.client_repo.save(Scope::Root, &client).await?;
        Ok(client)
    }

    pub async fn change_status(
        &self,
        client_id: Uuid,
        status: ClientStatus,
    ) -> Result<SaasClient, AppError> {
        let mut client = self.get_client(client_id).await?;
        if client.status != status {
            tracing::info!("🔁 Terreiro {}: {:?} -> {:?}", client.id, client.status, status);
            client.status = status;
            client.updated_at = Utc::now();
            self.client_repo.save(Scope::Root, &client).await?;
        }
        Ok(client)
    }

    /// Remove o terreiro com todas as subcoleções e usuários.
    pub async fn delete_client(&self, client_id: Uuid) -> Result<u64, AppError> {
        let client = self.get_client(client_id).await?;

        let purged = self.store.purge_scope(Scope::Tenant(client.id)).await?;
        for user in self.user_repo.list_by_client(client.id).await? {
            self.user_repo.delete(user.id).await?;
        }
        self.client_repo.delete_existing(Scope::Root, client.id).await?;

        tracing::warn!("🗑️ Terreiro '{}' removido ({} documentos)", client.name, purged);
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::models::members::SaveMemberPayload;

    fn new_client(email: &str) -> NewClient {
        NewClient {
            name: "Centro Espírita Luz".into(),
            owner_name: "Mãe Cida".into(),
            owner_email: email.into(),
            admin_password: "123456".into(),
            plan_id: None,
            affiliate_id: None,
            monthly_fee: Some(Decimal::new(4990, 2)),
            due_day: 5,
            status: ClientStatus::Active,
        }
    }

    #[tokio::test]
    async fn delete_client_purges_everything() {
        let state = AppState::in_memory();
        let tenants = &state.tenant_service;
        let (client, _admin) = tenants.create_client(new_client("cida@luz.com")).await.unwrap();

        state
            .member_service
            .save_member(
                client.id,
                SaveMemberPayload {
                    id: None,
                    name: "Ana".into(),
                    email: None,
                    phone: None,
                    birth_date: None,
                    address: None,
                    photo_url: None,
                    is_medium: true,
                    is_cambone: false,
                    entity_ids: vec![],
                    status: None,
                    joined_at: None,
                    monthly_payments: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let purged = tenants.delete_client(client.id).await.unwrap();
        assert_eq!(purged, 2); // config + membro

        assert!(matches!(tenants.get_client(client.id).await, Err(AppError::NotFound("client"))));
        assert!(state.auth_service.list_tenant_users(client.id).await.unwrap().is_empty());
        assert!(
            state
                .member_service
                .get_all_members(client.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn fee_defaults_to_plan_price() {
        let state = AppState::in_memory();
        let plan = state
            .master_service
            .save_plan(crate::models::master::SavePlanPayload {
                id: None,
                name: "Básico".into(),
                monthly_price: Decimal::new(2990, 2),
                max_members: Some(50),
                features: vec![],
                active: true,
                is_default: true,
            })
            .await
            .unwrap();

        let mut new = new_client("cida@luz.com");
        new.plan_id = Some(plan.id);
        new.monthly_fee = None;
        let (client, _) = state.tenant_service.create_client(new).await.unwrap();

        assert_eq!(client.monthly_fee, Decimal::new(2990, 2));
        assert_eq!(state.tenant_service.member_limit(client.id).await.unwrap(), Some(50));
    }
}
