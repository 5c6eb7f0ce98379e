// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AffiliateRepository, Scope, UserRepository},
    models::{
        auth::{AuthResponse, Claims, CreateUserPayload, SignupPayload, User, UserRole},
        tenancy::ClientStatus,
    },
    services::tenancy_service::{NewClient, TenantService},
};

// Custo baixo só nos testes unitários
const HASH_COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

// Hashing fora do executor assíncrono (bcrypt é caro de propósito)
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, HASH_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    // Executa a verificação em um thread separado
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenant_service: TenantService,
    affiliate_repo: AffiliateRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        tenant_service: TenantService,
        affiliate_repo: AffiliateRepository,
        jwt_secret: String,
    ) -> Self {
        Self { user_repo, tenant_service, affiliate_repo, jwt_secret }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, user: user.public() })
    }

    /// Cadastro self-service: cria o terreiro em período de teste e o seu administrador.
    pub async fn signup(&self, payload: SignupPayload) -> Result<AuthResponse, AppError> {
        let affiliate_id = match payload.affiliate_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                let affiliate = self
                    .affiliate_repo
                    .find_where(Scope::Root, "code", code.to_uppercase())
                    .await?
                    .into_iter()
                    .find(|a| a.active)
                    .ok_or(AppError::NotFound("affiliate"))?;
                Some(affiliate.id)
            }
            _ => None,
        };

        let plan_id = self.tenant_service.default_plan().await?.map(|plan| plan.id);

        let (_client, admin) = self
            .tenant_service
            .create_client(NewClient {
                name: payload.terreiro_name,
                owner_name: payload.owner_name,
                owner_email: payload.email,
                admin_password: payload.password,
                plan_id,
                affiliate_id,
                monthly_fee: None,
                due_day: crate::models::master::default_due_day(),
                status: ClientStatus::Trial,
            })
            .await?;

        let token = self.create_token(admin.id)?;
        Ok(AuthResponse { token, user: admin.public() })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            // usuário removido depois de emitir o token
            .ok_or(AppError::InvalidToken)
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Garante o usuário Master na inicialização. Não mexe na senha se ele já existe.
    pub async fn bootstrap_master(&self, email: &str, password: &str) -> Result<User, AppError> {
        if let Some(existing) = self.user_repo.find_by_email(email).await? {
            tracing::info!("👑 Usuário master {} já existe", existing.email);
            return Ok(existing);
        }

        let now = Utc::now();
        let master = User {
            id: Uuid::new_v4(),
            email: email.trim().to_lowercase(),
            name: "Master".to_string(),
            password_hash: hash_password(password).await?,
            role: UserRole::Master,
            client_id: None,
            created_at: now,
            updated_at: now,
        };
        self.user_repo.create_user(&master).await?;

        tracing::info!("👑 Usuário master {} criado", master.email);
        Ok(master)
    }

    // --- Usuários do terreiro ---

    pub async fn list_tenant_users(&self, client_id: Uuid) -> Result<Vec<User>, AppError> {
        let users = self.user_repo.list_by_client(client_id).await?;
        Ok(users.iter().map(User::public).collect())
    }

    pub async fn create_tenant_user(
        &self,
        client_id: Uuid,
        payload: CreateUserPayload,
    ) -> Result<User, AppError> {
        if payload.role == UserRole::Master {
            return Err(AppError::Forbidden("role".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: payload.email.trim().to_lowercase(),
            name: payload.name,
            password_hash: hash_password(&payload.password).await?,
            role: payload.role,
            client_id: Some(client_id),
            created_at: now,
            updated_at: now,
        };
        self.user_repo.create_user(&user).await?;

        tracing::info!("👤 Usuário {} criado no terreiro {}", user.email, client_id);
        Ok(user.public())
    }

    pub async fn delete_tenant_user(
        &self,
        client_id: Uuid,
        current_user_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        if current_user_id == user_id {
            return Err(AppError::CannotDeleteSelf);
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .filter(|u| u.client_id == Some(client_id))
            .ok_or(AppError::UserNotFound)?;

        self.user_repo.delete(user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::models::master::SaveAffiliatePayload;
    use rust_decimal::Decimal;

    fn signup_payload(email: &str, affiliate_code: Option<&str>) -> SignupPayload {
        SignupPayload {
            terreiro_name: "Tenda Pai Joaquim".into(),
            owner_name: "Pai Jorge".into(),
            email: email.into(),
            password: "axe-123".into(),
            affiliate_code: affiliate_code.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn signup_creates_trial_tenant_and_logs_in() {
        let state = AppState::in_memory();
        let auth = &state.auth_service;

        let response = auth.signup(signup_payload("Pai@Tenda.com", None)).await.unwrap();
        assert_eq!(response.user.role, UserRole::Admin);
        assert!(response.user.password_hash.is_empty());

        let client_id = response.user.client_id.unwrap();
        let client = state.tenant_service.get_client(client_id).await.unwrap();
        assert_eq!(client.status, ClientStatus::Trial);

        let config = state.settings_service.get_settings(client_id).await.unwrap();
        assert_eq!(config.terreiro_name, "Tenda Pai Joaquim");

        let login = auth.login_user("pai@tenda.com", "axe-123").await.unwrap();
        let user = auth.validate_token(&login.token).await.unwrap();
        assert_eq!(user.id, response.user.id);

        assert!(matches!(
            auth.login_user("pai@tenda.com", "errada").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email_and_unknown_affiliate() {
        let state = AppState::in_memory();
        let auth = &state.auth_service;

        auth.signup(signup_payload("pai@tenda.com", None)).await.unwrap();
        assert!(matches!(
            auth.signup(signup_payload("pai@tenda.com", None)).await,
            Err(AppError::EmailAlreadyExists)
        ));
        assert!(matches!(
            auth.signup(signup_payload("outro@tenda.com", Some("NAOEXISTE"))).await,
            Err(AppError::NotFound("affiliate"))
        ));
    }

    #[tokio::test]
    async fn signup_links_affiliate_by_code() {
        let state = AppState::in_memory();
        let affiliate = state
            .master_service
            .save_affiliate(SaveAffiliatePayload {
                id: None,
                name: "Revenda Axé".into(),
                email: "revenda@axe.com".into(),
                code: "AXE10".into(),
                commission_rate: Decimal::new(10, 2),
                active: true,
            })
            .await
            .unwrap();

        let response = state
            .auth_service
            .signup(signup_payload("pai@tenda.com", Some("axe10")))
            .await
            .unwrap();
        let client = state
            .tenant_service
            .get_client(response.user.client_id.unwrap())
            .await
            .unwrap();
        assert_eq!(client.affiliate_id, Some(affiliate.id));
    }

    #[tokio::test]
    async fn tenant_users_cannot_delete_themselves() {
        let state = AppState::in_memory();
        let auth = &state.auth_service;
        let admin = auth.signup(signup_payload("pai@tenda.com", None)).await.unwrap().user;
        let client_id = admin.client_id.unwrap();

        let operator = auth
            .create_tenant_user(
                client_id,
                CreateUserPayload {
                    email: "cantina@tenda.com".into(),
                    name: "Cantina".into(),
                    password: "123456".into(),
                    role: UserRole::Operator,
                },
            )
            .await
            .unwrap();
        assert_eq!(auth.list_tenant_users(client_id).await.unwrap().len(), 2);

        assert!(matches!(
            auth.delete_tenant_user(client_id, admin.id, admin.id).await,
            Err(AppError::CannotDeleteSelf)
        ));
        auth.delete_tenant_user(client_id, admin.id, operator.id).await.unwrap();
        assert_eq!(auth.list_tenant_users(client_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_master_is_idempotent() {
        let state = AppState::in_memory();
        let first = state.auth_service.bootstrap_master("root@saas.com", "segredo").await.unwrap();
        let second = state.auth_service.bootstrap_master("root@saas.com", "outra").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.role, UserRole::Master);
    }
}
