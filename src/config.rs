// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::i18n::I18nStore,
    db::{DocumentStore, MemoryDocumentStore, PgDocumentStore, Repository, UserRepository},
    services::{
        attendance_service::AttendanceService, auth::AuthService, backup_service::BackupService,
        canteen_service::CanteenService, course_service::CourseService,
        dashboard_service::DashboardService, document_service::DocumentService,
        email_service::EmailService, entity_service::EntityService,
        event_service::EventService, finance_service::FinanceService,
        id_card_service::IdCardService, inventory_service::InventoryService,
        master_service::MasterService, member_service::MemberService,
        settings_service::SettingsService, tenancy_service::TenantService,
    },
};

// Variáveis de ambiente lidas na inicialização
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub mail_delay: Duration,
    pub master_email: Option<String>,
    pub master_password: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .context("DB_MAX_CONNECTIONS deve ser um número")?,
            Err(_) => 5,
        };

        let mail_delay_ms: u64 = match env::var("MAIL_DELAY_MS") {
            Ok(value) => value.parse().context("MAIL_DELAY_MS deve ser um número")?,
            Err(_) => 800,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            db_max_connections,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            fonts_dir: env::var("FONTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./fonts")),
            font_family: env::var("FONT_FAMILY").unwrap_or_else(|_| "Roboto".to_string()),
            mail_delay: Duration::from_millis(mail_delay_ms),
            master_email: env::var("MASTER_EMAIL").ok(),
            master_password: env::var("MASTER_PASSWORD").ok(),
        })
    }

    /// Configuração mínima para testes (armazenamento em memória, sem atraso no e-mail).
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            db_max_connections: 1,
            jwt_secret: "segredo-de-teste".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            fonts_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fonts")),
            font_family: "DejaVuSans".to_string(),
            mail_delay: Duration::ZERO,
            master_email: None,
            master_password: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub i18n_store: I18nStore,
    pub settings: Settings,

    pub auth_service: AuthService,
    pub tenant_service: TenantService,
    pub settings_service: SettingsService,
    pub member_service: MemberService,
    pub entity_service: EntityService,
    pub inventory_service: InventoryService,
    pub course_service: CourseService,
    pub canteen_service: CanteenService,
    pub event_service: EventService,
    pub attendance_service: AttendanceService,
    pub id_card_service: IdCardService,
    pub email_service: EmailService,
    pub finance_service: FinanceService,
    pub dashboard_service: DashboardService,
    pub backup_service: BackupService,
    pub master_service: MasterService,
}

impl AppState {
    // Conecta no Postgres quando há DATABASE_URL; senão, tudo em memória.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &settings.database_url {
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;

                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
                Arc::new(PgDocumentStore::new(pool))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL ausente: usando armazenamento em memória");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(settings, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(settings: Settings, store: Arc<dyn DocumentStore>) -> Self {
        let user_repo = UserRepository::new(store.clone());

        let settings_service = SettingsService::new(Repository::new(store.clone()));
        let tenant_service = TenantService::new(
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            user_repo.clone(),
            settings_service.clone(),
            store.clone(),
        );
        let auth_service = AuthService::new(
            user_repo.clone(),
            tenant_service.clone(),
            Repository::new(store.clone()),
            settings.jwt_secret.clone(),
        );
        let member_service = MemberService::new(
            Repository::new(store.clone()),
            tenant_service.clone(),
        );
        let entity_service =
            EntityService::new(Repository::new(store.clone()), Repository::new(store.clone()));
        let inventory_service = InventoryService::new(
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            Repository::new(store.clone()),
        );
        let document_service = DocumentService::new(settings.fonts_dir.clone(), settings.font_family.clone());
        let course_service = CourseService::new(
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            settings_service.clone(),
            document_service.clone(),
        );
        let canteen_service =
            CanteenService::new(Repository::new(store.clone()), Repository::new(store.clone()));
        let event_service = EventService::new(Repository::new(store.clone()));
        let attendance_service = AttendanceService::new(Repository::new(store.clone()));
        let id_card_service = IdCardService::new(
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            settings_service.clone(),
            document_service.clone(),
        );
        let email_service = EmailService::new(
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            settings.mail_delay,
        );
        let finance_service = FinanceService::new(
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            settings_service.clone(),
            document_service.clone(),
        );
        let dashboard_service = DashboardService::new(
            Repository::new(store.clone()),
            event_service.clone(),
            inventory_service.clone(),
            finance_service.clone(),
        );
        let backup_service = BackupService::new(store.clone());
        let master_service = MasterService::new(
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            Repository::new(store.clone()),
            tenant_service.clone(),
        );

        Self {
            store,
            i18n_store: I18nStore::new(),
            settings,
            auth_service,
            tenant_service,
            settings_service,
            member_service,
            entity_service,
            inventory_service,
            course_service,
            canteen_service,
            event_service,
            attendance_service,
            id_card_service,
            email_service,
            finance_service,
            dashboard_service,
            backup_service,
            master_service,
        }
    }

    pub fn in_memory() -> Self {
        Self::with_store(Settings::for_tests(), Arc::new(MemoryDocumentStore::new()))
    }
}
