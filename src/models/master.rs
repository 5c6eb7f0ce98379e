// src/models/master.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::db::repository::Document;
use crate::models::{inventory::validate_not_negative, tenancy::ClientStatus};

// ---
// Plan (Plano de assinatura)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    #[schema(example = "Básico")]
    pub name: String,
    #[schema(example = "49.90")]
    pub monthly_price: Decimal,
    // None = ilimitado
    pub max_members: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    pub active: bool,
    // Plano atribuído no cadastro self-service
    #[serde(default)]
    pub is_default: bool,
}

impl Document for Plan {
    const COLLECTION: &'static str = "plans";
    const RESOURCE: &'static str = "plan";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePlanPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub monthly_price: Decimal,
    pub max_members: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub is_default: bool,
}

fn default_true() -> bool {
    true
}

// ---
// Affiliate (Afiliado / revendedor)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Affiliate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(example = "AXE10")]
    pub code: String,
    // 0.10 = 10% sobre as faturas pagas
    #[schema(example = "0.10")]
    pub commission_rate: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Document for Affiliate {
    const COLLECTION: &'static str = "affiliates";
    const RESOURCE: &'static str = "affiliate";

    fn id(&self) -> Uuid {
        self.id
    }
}

fn validate_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if rate.is_sign_negative() || *rate > Decimal::ONE {
        let mut err = ValidationError::new("range");
        err.message = Some("A comissão deve estar entre 0 e 1.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveAffiliatePayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 3, max = 32, message = "O código deve ter entre 3 e 32 caracteres."))]
    pub code: String,
    #[validate(custom(function = "validate_rate"))]
    pub commission_rate: Decimal,
    #[serde(default = "default_true")]
    pub active: bool,
}

// ---
// Clientes (terreiros) vistos pelo master
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "O nome do terreiro é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O nome do responsável é obrigatório."))]
    pub owner_name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub owner_email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub admin_password: String,
    pub plan_id: Option<Uuid>,
    pub affiliate_id: Option<Uuid>,
    // Sem valor: usa o preço do plano
    pub monthly_fee: Option<Decimal>,
    #[validate(range(min = 1, max = 28, message = "O vencimento deve ser entre 1 e 28."))]
    #[serde(default = "default_due_day")]
    pub due_day: u32,
}

pub(crate) fn default_due_day() -> u32 {
    10
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "O nome do terreiro é obrigatório."))]
    pub name: String,
    pub plan_id: Option<Uuid>,
    pub affiliate_id: Option<Uuid>,
    #[validate(custom(function = "validate_not_negative"))]
    pub monthly_fee: Decimal,
    #[validate(range(min = 1, max = 28, message = "O vencimento deve ser entre 1 e 28."))]
    pub due_day: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusPayload {
    pub status: ClientStatus,
}

// ---
// Invoice (Fatura mensal de um terreiro)
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    #[schema(example = "2024-05")]
    pub month: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Document for Invoice {
    const COLLECTION: &'static str = "billing_invoices";
    const RESOURCE: &'static str = "invoice";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoicesPayload {
    #[schema(example = "2024-05")]
    pub month: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockOverduePayload {
    // Padrão: hoje
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub grace_days: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilter {
    pub month: Option<String>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateCommission {
    pub affiliate_id: Uuid,
    pub affiliate_name: String,
    pub clients: usize,
    pub paid_total: Decimal,
    pub commission: Decimal,
}

// Painel master: totalCollected + totalPending == totalExpected
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MasterReport {
    pub month: String,
    pub total_expected: Decimal,
    pub total_collected: Decimal,
    pub total_pending: Decimal,
    pub invoices: usize,
    pub clients_by_status: BTreeMap<String, usize>,
    pub commissions: Vec<AffiliateCommission>,
    pub total_commission: Decimal,
}
