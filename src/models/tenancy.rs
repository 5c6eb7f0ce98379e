// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{document_store::TENANT_ROOT, repository::Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    Trial,
    Active,
    Blocked,   // Inadimplente
    Cancelled,
}

impl ClientStatus {
    /// Usuários do terreiro só entram com o cliente em teste ou ativo.
    pub fn allows_access(&self) -> bool {
        matches!(self, ClientStatus::Trial | ClientStatus::Active)
    }
}

// ---
// SaasClient (O "Terreiro")
// ---
// Documento raiz em saas_clients/{id}; todas as subcoleções ficam abaixo dele.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaasClient {
    pub id: Uuid,
    #[schema(example = "Tenda de Umbanda Caboclo Pena Branca")]
    pub name: String,
    pub owner_name: String,
    pub owner_email: String,

    pub plan_id: Option<Uuid>,
    pub affiliate_id: Option<Uuid>,
    pub status: ClientStatus,

    // Mensalidade cobrada pelo master (cópia do preço do plano ou valor negociado)
    #[schema(example = "89.90")]
    pub monthly_fee: Decimal,
    #[schema(example = 10)]
    pub due_day: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for SaasClient {
    const COLLECTION: &'static str = TENANT_ROOT;
    const RESOURCE: &'static str = "client";

    fn id(&self) -> Uuid {
        self.id
    }
}
