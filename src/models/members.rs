// src/models/members.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Exempt, // Isento no mês
}

// ---
// Member (Filho da casa)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    #[schema(example = "Ana de Oxum")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub photo_url: Option<String>,

    pub is_medium: bool,
    pub is_cambone: bool,

    // Guias / entidades que o membro trabalha
    #[serde(default)]
    pub entity_ids: Vec<Uuid>,

    pub status: MemberStatus,
    pub joined_at: Option<NaiveDate>,

    // "2024-05" -> PAID
    #[serde(default)]
    pub monthly_payments: BTreeMap<String, PaymentStatus>,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Member {
    const COLLECTION: &'static str = "members";
    const RESOURCE: &'static str = "member";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Member {
    /// Função exibida na carteirinha.
    pub fn role_label(&self) -> &'static str {
        match (self.is_medium, self.is_cambone) {
            (true, _) => "Médium",
            (false, true) => "Cambone",
            (false, false) => "Membro",
        }
    }
}

// Formulário de criação/edição. Sem `id` cria; com `id` substitui.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveMemberPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_medium: bool,
    #[serde(default)]
    pub is_cambone: bool,
    #[serde(default)]
    pub entity_ids: Vec<Uuid>,
    pub status: Option<MemberStatus>,
    pub joined_at: Option<NaiveDate>,
    // Ausente: mantém o histórico já gravado
    pub monthly_payments: Option<BTreeMap<String, PaymentStatus>>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPaymentPayload {
    #[schema(example = "2024-05")]
    #[validate(length(equal = 7, message = "Use o formato AAAA-MM."))]
    pub month: String,
    pub status: PaymentStatus,
}

// ---
// SpiritualEntity (Guias / Entidades)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpiritualEntity {
    pub id: Uuid,
    #[schema(example = "Caboclo Pena Branca")]
    pub name: String,
    // Linha de trabalho (Caboclos, Pretos-Velhos, Exus...)
    #[schema(example = "Caboclos")]
    pub line: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for SpiritualEntity {
    const COLLECTION: &'static str = "entities";
    const RESOURCE: &'static str = "entity";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveEntityPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "A linha é obrigatória."))]
    pub line: String,
    pub description: Option<String>,
}
