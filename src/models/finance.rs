// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::Document;
use crate::models::{inventory::validate_not_negative, members::PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationKind {
    Money,
    Goods, // Doação de materiais (velas, flores...)
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub member_id: Option<Uuid>,
    pub donor_name: Option<String>,
    pub kind: DonationKind,
    // Valor estimado no caso de materiais
    #[schema(example = "100.00")]
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Document for Donation {
    const COLLECTION: &'static str = "donations";
    const RESOURCE: &'static str = "donation";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveDonationPayload {
    pub id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub donor_name: Option<String>,
    pub kind: DonationKind,
    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeCategory {
    Medium,
    Cambone,
}

// Uma linha do relatório: o que um membro deve no mês
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberFeeLine {
    pub member_id: Uuid,
    pub member_name: String,
    pub category: FeeCategory,
    pub amount: Decimal,
    pub status: PaymentStatus,
}

// Relatório mensal: totalCollected + totalPending == totalExpected
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    #[schema(example = "2024-05")]
    pub month: String,
    pub total_expected: Decimal,
    pub total_collected: Decimal,
    pub total_pending: Decimal,
    pub paid_count: usize,
    pub pending_count: usize,
    pub exempt_count: usize,
    pub lines: Vec<MemberFeeLine>,

    // Outras receitas do mês (fora da conciliação)
    pub donations_total: Decimal,
    pub canteen_total: Decimal,
}
