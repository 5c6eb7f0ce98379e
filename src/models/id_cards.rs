// src/models/id_cards.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::repository::Document;

// Registro de emissão de carteirinha (append-only)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdCardLog {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    #[schema(example = "8F3A21C0")]
    pub card_code: String,
    pub issued_at: DateTime<Utc>,
    pub valid_until: NaiveDate,
    pub issued_by: String,
}

impl Document for IdCardLog {
    const COLLECTION: &'static str = "id_card_logs";
    const RESOURCE: &'static str = "id_card_log";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueCardsPayload {
    pub member_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLogFilter {
    pub member_id: Option<Uuid>,
}
