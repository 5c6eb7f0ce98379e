// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::events::CalendarEvent;

// Os cards da tela inicial
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub active_members: usize,
    pub mediums: usize,
    pub cambones: usize,
    pub upcoming_events: Vec<CalendarEvent>, // Próximos 30 dias
    pub low_stock_items: usize,
    pub month: String,
    pub month_expected: Decimal,
    pub month_collected: Decimal,
}

// Backup JSON completo do terreiro
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantBackup {
    pub client_id: Uuid,
    pub exported_at: DateTime<Utc>,
    // nome da coleção -> documentos
    #[schema(value_type = Object)]
    pub collections: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: BTreeMap<String, usize>,
    pub skipped: usize,
}
