// src/services/inventory_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CategoryRepository, ItemRepository, Scope, StockLogRepository},
    models::inventory::{
        AdjustStockPayload, InventoryCategory, InventoryItem, SaveCategoryPayload, SaveItemPayload,
        StockLog, StockLogType,
    },
};

/// Log de uma mudança de estoque; `None` quando nada mudou.
pub fn stock_log_for_change(
    item: &InventoryItem,
    previous_stock: Decimal,
    reason: Option<String>,
    performed_by: Option<String>,
) -> Option<StockLog> {
    let change = item.current_stock - previous_stock;
    if change.is_zero() {
        return None;
    }

    Some(StockLog {
        id: Uuid::new_v4(),
        item_id: item.id,
        item_name: item.name.clone(),
        change,
        previous_stock,
        new_stock: item.current_stock,
        kind: if change.is_sign_negative() { StockLogType::Saida } else { StockLogType::Entrada },
        reason,
        performed_by,
        created_at: Utc::now(),
    })
}

#[derive(Clone)]
pub struct InventoryService {
    category_repo: CategoryRepository,
    item_repo: ItemRepository,
    log_repo: StockLogRepository,
}

impl InventoryService {
    pub fn new(
        category_repo: CategoryRepository,
        item_repo: ItemRepository,
        log_repo: StockLogRepository,
    ) -> Self {
        Self { category_repo, item_repo, log_repo }
    }

    // --- CATEGORIAS ---

    pub async fn get_all_categories(&self, client_id: Uuid) -> Result<Vec<InventoryCategory>, AppError> {
        self.category_repo.get_all(Scope::Tenant(client_id)).await
    }

    pub async fn save_category(
        &self,
        client_id: Uuid,
        category_id: Option<Uuid>,
        payload: SaveCategoryPayload,
    ) -> Result<InventoryCategory, AppError> {
        let scope = Scope::Tenant(client_id);
        let now = Utc::now();

        let category = match category_id {
            Some(id) => {
                let existing = self.category_repo.get(scope, id).await?;
                InventoryCategory {
                    name: payload.name,
                    description: payload.description,
                    updated_at: now,
                    ..existing
                }
            }
            None => InventoryCategory {
                id: Uuid::new_v4(),
                name: payload.name,
                description: payload.description,
                created_at: now,
                updated_at: now,
            },
        };

        self.category_repo.save(scope, &category).await?;
        Ok(category)
    }

    /// Categoria com itens não pode ser apagada.
    pub async fn delete_category(&self, client_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
        let scope = Scope::Tenant(client_id);
        let category = self.category_repo.get(scope, category_id).await?;

        let items = self.item_repo.find_where(scope, "categoryId", category_id).await?;
        if !items.is_empty() {
            return Err(AppError::CategoryInUse(category.name));
        }

        self.category_repo.delete_existing(scope, category_id).await
    }

    // --- ITENS ---

    pub async fn get_all_items(&self, client_id: Uuid) -> Result<Vec<InventoryItem>, AppError> {
        self.item_repo.get_all(Scope::Tenant(client_id)).await
    }

    pub async fn get_item(&self, client_id: Uuid, item_id: Uuid) -> Result<InventoryItem, AppError> {
        self.item_repo.get(Scope::Tenant(client_id), item_id).await
    }

    pub async fn low_stock(&self, client_id: Uuid) -> Result<Vec<InventoryItem>, AppError> {
        let items = self.get_all_items(client_id).await?;
        Ok(items.into_iter().filter(InventoryItem::is_low_stock).collect())
    }

    pub async fn create_item(
        &self,
        client_id: Uuid,
        payload: SaveItemPayload,
        performed_by: Option<String>,
    ) -> Result<InventoryItem, AppError> {
        let scope = Scope::Tenant(client_id);
        self.category_repo.get(scope, payload.category_id).await?;

        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            category_id: payload.category_id,
            name: payload.name,
            description: payload.description,
            unit: payload.unit,
            current_stock: payload.current_stock,
            min_stock: payload.min_stock,
            location: payload.location,
            created_at: now,
            updated_at: now,
        };

        self.item_repo.save(scope, &item).await?;

        // Estoque inicial entra como uma "entrada"
        if let Some(log) =
            stock_log_for_change(&item, Decimal::ZERO, Some("Estoque inicial".into()), performed_by)
        {
            self.log_repo.save(scope, &log).await?;
        }

        tracing::info!("📦 Item '{}' criado com estoque {}", item.name, item.current_stock);
        Ok(item)
    }

    /// Substitui o item. Se o estoque mudou, grava exatamente um log.
    pub async fn update_item(
        &self,
        client_id: Uuid,
        item_id: Uuid,
        payload: SaveItemPayload,
        performed_by: Option<String>,
    ) -> Result<InventoryItem, AppError> {
        let scope = Scope::Tenant(client_id);
        let existing = self.item_repo.get(scope, item_id).await?;

        if payload.category_id != existing.category_id {
            self.category_repo.get(scope, payload.category_id).await?;
        }

        let item = InventoryItem {
            category_id: payload.category_id,
            name: payload.name,
            description: payload.description,
            unit: payload.unit,
            current_stock: payload.current_stock,
            min_stock: payload.min_stock,
            location: payload.location,
            updated_at: Utc::now(),
            ..existing.clone()
        };

        self.item_repo.save(scope, &item).await?;

        if let Some(log) = stock_log_for_change(
            &item,
            existing.current_stock,
            Some("Ajuste manual".into()),
            performed_by,
        ) {
            tracing::info!("📦 '{}': {} -> {}", item.name, log.previous_stock, log.new_stock);
            self.log_repo.save(scope, &log).await?;
        }

        Ok(item)
    }

    /// Entrada (delta > 0) ou saída (delta < 0). O estoque nunca fica negativo.
    pub async fn adjust_stock(
        &self,
        client_id: Uuid,
        item_id: Uuid,
        payload: AdjustStockPayload,
        performed_by: Option<String>,
    ) -> Result<InventoryItem, AppError> {
        let scope = Scope::Tenant(client_id);
        let mut item = self.item_repo.get(scope, item_id).await?;

        let previous_stock = item.current_stock;
        let new_stock = previous_stock + payload.delta;
        if new_stock < Decimal::ZERO {
            return Err(AppError::InsufficientStock(item.name));
        }

        item.current_stock = new_stock;
        item.updated_at = Utc::now();

        let Some(log) = stock_log_for_change(&item, previous_stock, payload.reason, performed_by) else {
            return Ok(item);
        };

        self.item_repo.save(scope, &item).await?;
        self.log_repo.save(scope, &log).await?;

        if item.is_low_stock() {
            tracing::warn!("⚠️ Estoque baixo: '{}' ({} {})", item.name, item.current_stock, item.unit);
        }
        Ok(item)
    }

    /// Remove o item; o histórico de movimentações é mantido.
    pub async fn delete_item(&self, client_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
        self.item_repo
            .delete_existing(Scope::Tenant(client_id), item_id)
            .await
    }

    // --- HISTÓRICO ---

    /// Mais recentes primeiro.
    pub async fn list_logs(
        &self,
        client_id: Uuid,
        item_id: Option<Uuid>,
    ) -> Result<Vec<StockLog>, AppError> {
        let scope = Scope::Tenant(client_id);
        let mut logs = match item_id {
            Some(item_id) => self.log_repo.find_where(scope, "itemId", item_id).await?,
            None => self.log_repo.get_all(scope).await?,
        };
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::services::member_service::tests::seed_client;

    fn item_payload(category_id: Uuid, stock: i64) -> SaveItemPayload {
        SaveItemPayload {
            category_id,
            name: "Vela branca".into(),
            description: None,
            unit: "un".into(),
            current_stock: Decimal::from(stock),
            min_stock: Decimal::from(3),
            location: Some("Depósito".into()),
        }
    }

    async fn setup() -> (AppState, Uuid, Uuid) {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let category = state
            .inventory_service
            .save_category(
                client_id,
                None,
                SaveCategoryPayload { name: "Velas".into(), description: None },
            )
            .await
            .unwrap();
        (state, client_id, category.id)
    }

    #[tokio::test]
    async fn stock_change_from_10_to_7_logs_one_saida() {
        let (state, client_id, category_id) = setup().await;
        let inventory = &state.inventory_service;

        let item = inventory
            .create_item(client_id, item_payload(category_id, 10), None)
            .await
            .unwrap();
        let before = inventory.list_logs(client_id, Some(item.id)).await.unwrap().len();

        inventory
            .update_item(client_id, item.id, item_payload(category_id, 7), Some("Ana".into()))
            .await
            .unwrap();

        let logs = inventory.list_logs(client_id, Some(item.id)).await.unwrap();
        assert_eq!(logs.len(), before + 1);

        let log = logs
            .iter()
            .find(|l| l.kind == StockLogType::Saida)
            .expect("log de saída");
        assert_eq!(log.change, Decimal::from(-3));
        assert_eq!(log.kind, StockLogType::Saida);
        assert_eq!(log.previous_stock, Decimal::from(10));
        assert_eq!(log.new_stock, Decimal::from(7));
        assert_eq!(serde_json::to_value(log).unwrap()["type"], "saida");
    }

    #[tokio::test]
    async fn unchanged_stock_writes_no_log() {
        let (state, client_id, category_id) = setup().await;
        let inventory = &state.inventory_service;

        let item = inventory
            .create_item(client_id, item_payload(category_id, 0), None)
            .await
            .unwrap();
        inventory
            .update_item(client_id, item.id, item_payload(category_id, 0), None)
            .await
            .unwrap();

        assert!(inventory.list_logs(client_id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleted_item_disappears_but_logs_stay() {
        let (state, client_id, category_id) = setup().await;
        let inventory = &state.inventory_service;

        let item = inventory
            .create_item(client_id, item_payload(category_id, 5), None)
            .await
            .unwrap();
        inventory.delete_item(client_id, item.id).await.unwrap();

        let items = inventory.get_all_items(client_id).await.unwrap();
        assert!(items.iter().all(|i| i.id != item.id));
        assert_eq!(inventory.list_logs(client_id, Some(item.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn adjust_stock_never_goes_negative() {
        let (state, client_id, category_id) = setup().await;
        let inventory = &state.inventory_service;
        let item = inventory
            .create_item(client_id, item_payload(category_id, 2), None)
            .await
            .unwrap();

        let result = inventory
            .adjust_stock(
                client_id,
                item.id,
                AdjustStockPayload { delta: Decimal::from(-3), reason: None },
                None,
            )
            .await;
        assert!(matches!(result, Err(AppError::InsufficientStock(_))));

        let item = inventory
            .adjust_stock(
                client_id,
                item.id,
                AdjustStockPayload { delta: Decimal::from(-2), reason: Some("Gira".into()) },
                None,
            )
            .await
            .unwrap();
        assert!(item.current_stock.is_zero());
        assert_eq!(inventory.low_stock(client_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn category_in_use_cannot_be_deleted() {
        let (state, client_id, category_id) = setup().await;
        let inventory = &state.inventory_service;
        let item = inventory
            .create_item(client_id, item_payload(category_id, 1), None)
            .await
            .unwrap();

        assert!(matches!(
            inventory.delete_category(client_id, category_id).await,
            Err(AppError::CategoryInUse(_))
        ));

        inventory.delete_item(client_id, item.id).await.unwrap();
        inventory.delete_category(client_id, category_id).await.unwrap();
    }
}
