// src/models/canteen.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::Document;
use crate::models::inventory::validate_not_negative;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanteenProduct {
    pub id: Uuid,
    #[schema(example = "Pastel de queijo")]
    pub name: String,
    #[schema(example = "8.00")]
    pub price: Decimal,
    // None = não controla estoque
    pub stock: Option<u32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for CanteenProduct {
    const COLLECTION: &'static str = "canteen_products";
    const RESOURCE: &'static str = "canteen_product";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanteenSaleLine {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl CanteenSaleLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CanteenSale {
    pub id: Uuid,
    pub lines: Vec<CanteenSaleLine>,
    pub total: Decimal,
    pub member_id: Option<Uuid>,
    pub sold_at: DateTime<Utc>,
}

impl Document for CanteenSale {
    const COLLECTION: &'static str = "canteen_sales";
    const RESOURCE: &'static str = "canteen_sale";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveProductPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    pub stock: Option<u32>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLinePayload {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSalePayload {
    #[validate(length(min = 1, message = "A venda precisa de pelo menos um item."))]
    #[validate(nested)]
    pub lines: Vec<SaleLinePayload>,
    pub member_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_needs_lines_with_quantity() {
        let empty = RegisterSalePayload { lines: vec![], member_id: None };
        assert!(empty.validate().unwrap_err().field_errors().contains_key("lines"));

        let zero = RegisterSalePayload {
            lines: vec![SaleLinePayload { product_id: Uuid::new_v4(), quantity: 0 }],
            member_id: None,
        };
        assert!(zero.validate().is_err());

        let ok = RegisterSalePayload {
            lines: vec![SaleLinePayload { product_id: Uuid::new_v4(), quantity: 2 }],
            member_id: None,
        };
        assert!(ok.validate().is_ok());
    }
}
