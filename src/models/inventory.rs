// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::db::repository::Document;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryCategory {
    pub id: Uuid,
    #[schema(example = "Velas")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for InventoryCategory {
    const COLLECTION: &'static str = "inventory_categories";
    const RESOURCE: &'static str = "inventory_category";

    fn id(&self) -> Uuid {
        self.id
    }
}

// --- 2. Itens ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "Vela branca 7 dias")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "un")]
    pub unit: String,
    #[schema(example = "10")]
    pub current_stock: Decimal,
    #[schema(example = "3")]
    pub min_stock: Decimal,
    // Onde fica guardado (Congá, Depósito...)
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for InventoryItem {
    const COLLECTION: &'static str = "inventory_items";
    const RESOURCE: &'static str = "inventory_item";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

// --- 3. Histórico de estoque (append-only) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockLogType {
    Entrada,
    Saida,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLog {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    // Positivo = entrada, negativo = saída
    #[schema(example = "-3")]
    pub change: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    #[serde(rename = "type")]
    pub kind: StockLogType,
    pub reason: Option<String>,
    pub performed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document for StockLog {
    const COLLECTION: &'static str = "stock_logs";
    const RESOURCE: &'static str = "stock_log";

    fn id(&self) -> Uuid {
        self.id
    }
}

// ---
// Validação Customizada
// ---
pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveItemPayload {
    pub category_id: Uuid,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "A unidade é obrigatória."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub current_stock: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub min_stock: Decimal,

    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    // Positivo = entrada, negativo = saída
    #[schema(example = "-2")]
    pub delta: Decimal,
    pub reason: Option<String>,
}
