// src/services/canteen_service.rs

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{dates::Month, error::AppError},
    db::{ProductRepository, SaleRepository, Scope},
    models::canteen::{
        CanteenProduct, CanteenSale, CanteenSaleLine, RegisterSalePayload, SaveProductPayload,
    },
};

#[derive(Clone)]
pub struct CanteenService {
    product_repo: ProductRepository,
    sale_repo: SaleRepository,
}

impl CanteenService {
    pub fn new(product_repo: ProductRepository, sale_repo: SaleRepository) -> Self {
        Self { product_repo, sale_repo }
    }

    // --- PRODUTOS ---

    pub async fn get_all_products(&self, client_id: Uuid) -> Result<Vec<CanteenProduct>, AppError> {
        self.product_repo.get_all(Scope::Tenant(client_id)).await
    }

    pub async fn save_product(
        &self,
        client_id: Uuid,
        payload: SaveProductPayload,
    ) -> Result<CanteenProduct, AppError> {
        let scope = Scope::Tenant(client_id);
        let existing = match payload.id {
            Some(id) => self.product_repo.find(scope, id).await?,
            None => None,
        };

        let now = Utc::now();
        let product = CanteenProduct {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            name: payload.name,
            price: payload.price,
            stock: payload.stock,
            active: payload.active,
            created_at: existing.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.product_repo.save(scope, &product).await?;
        Ok(product)
    }

    pub async fn delete_product(&self, client_id: Uuid, product_id: Uuid) -> Result<(), AppError> {
        self.product_repo
            .delete_existing(Scope::Tenant(client_id), product_id)
            .await
    }

    // --- VENDAS ---

    /// Preço vem do cardápio; estoque controlado é baixado. Valida tudo antes de gravar.
    pub async fn register_sale(
        &self,
        client_id: Uuid,
        payload: RegisterSalePayload,
    ) -> Result<CanteenSale, AppError> {
        let scope = Scope::Tenant(client_id);

        let mut products: HashMap<Uuid, CanteenProduct> = HashMap::new();
        let mut lines = Vec::with_capacity(payload.lines.len());

        for line in payload.lines {
            if !products.contains_key(&line.product_id) {
                let product = self.product_repo.get(scope, line.product_id).await?;
                products.insert(line.product_id, product);
            }
            let product = products
                .get_mut(&line.product_id)
                .ok_or(AppError::NotFound("canteen_product"))?;

            if !product.active {
                return Err(AppError::ProductInactive(product.name.clone()));
            }
            if let Some(stock) = product.stock {
                product.stock = Some(
                    stock
                        .checked_sub(line.quantity)
                        .ok_or_else(|| AppError::InsufficientStock(product.name.clone()))?,
                );
            }

            lines.push(CanteenSaleLine {
                product_id: product.id,
                name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.price,
            });
        }

        let now = Utc::now();
        for product in products.values_mut().filter(|p| p.stock.is_some()) {
            product.updated_at = now;
            self.product_repo.save(scope, product).await?;
        }

        let sale = CanteenSale {
            id: Uuid::new_v4(),
            total: lines.iter().map(CanteenSaleLine::subtotal).sum::<Decimal>(),
            lines,
            member_id: payload.member_id,
            sold_at: now,
        };
        self.sale_repo.save(scope, &sale).await?;

        tracing::info!("🥟 Venda {} registrada: R$ {:.2}", sale.id, sale.total);
        Ok(sale)
    }

    /// Vendas (do mês, se informado), mais recentes primeiro.
    pub async fn list_sales(
        &self,
        client_id: Uuid,
        month: Option<Month>,
    ) -> Result<Vec<CanteenSale>, AppError> {
        let mut sales = self.sale_repo.get_all(Scope::Tenant(client_id)).await?;
        if let Some(month) = month {
            sales.retain(|s| month.contains(s.sold_at.date_naive()));
        }
        sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));
        Ok(sales)
    }

    /// Estorna a venda: devolve o estoque dos produtos que ainda existem.
    pub async fn delete_sale(&self, client_id: Uuid, sale_id: Uuid) -> Result<(), AppError> {
        let scope = Scope::Tenant(client_id);
        let sale = self.sale_repo.get(scope, sale_id).await?;

        for line in &sale.lines {
            let Some(mut product) = self.product_repo.find(scope, line.product_id).await? else {
                continue;
            };
            if let Some(stock) = product.stock {
                product.stock = Some(stock.saturating_add(line.quantity));
                product.updated_at = Utc::now();
                self.product_repo.save(scope, &product).await?;
            }
        }

        self.sale_repo.delete_existing(scope, sale.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::models::canteen::SaleLinePayload;
    use crate::services::member_service::tests::seed_client;

    async fn product(state: &AppState, client_id: Uuid, name: &str, cents: i64, stock: Option<u32>) -> CanteenProduct {
        state
            .canteen_service
            .save_product(
                client_id,
                SaveProductPayload {
                    id: None,
                    name: name.into(),
                    price: Decimal::new(cents, 2),
                    stock,
                    active: true,
                },
            )
            .await
            .unwrap()
    }

    fn sale(lines: Vec<(Uuid, u32)>) -> RegisterSalePayload {
        RegisterSalePayload {
            lines: lines
                .into_iter()
                .map(|(product_id, quantity)| SaleLinePayload { product_id, quantity })
                .collect(),
            member_id: None,
        }
    }

    #[tokio::test]
    async fn sale_prices_from_catalog_and_decrements_stock() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let pastel = product(&state, client_id, "Pastel", 800, Some(5)).await;
        let cafe = product(&state, client_id, "Café", 300, None).await;
        let canteen = &state.canteen_service;

        let registered = canteen
            .register_sale(client_id, sale(vec![(pastel.id, 2), (cafe.id, 3), (pastel.id, 1)]))
            .await
            .unwrap();
        assert_eq!(registered.total, Decimal::new(3300, 2));

        let products = canteen.get_all_products(client_id).await.unwrap();
        let pastel_now = products.iter().find(|p| p.id == pastel.id).unwrap();
        assert_eq!(pastel_now.stock, Some(2));

        canteen.delete_sale(client_id, registered.id).await.unwrap();
        let products = canteen.get_all_products(client_id).await.unwrap();
        assert_eq!(products.iter().find(|p| p.id == pastel.id).unwrap().stock, Some(5));
    }

    #[tokio::test]
    async fn sale_fails_without_stock_and_writes_nothing() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let pastel = product(&state, client_id, "Pastel", 800, Some(1)).await;
        let canteen = &state.canteen_service;

        assert!(matches!(
            canteen.register_sale(client_id, sale(vec![(pastel.id, 2)])).await,
            Err(AppError::InsufficientStock(_))
        ));
        assert!(canteen.list_sales(client_id, None).await.unwrap().is_empty());
        let products = canteen.get_all_products(client_id).await.unwrap();
        assert_eq!(products[0].stock, Some(1));
    }

    #[tokio::test]
    async fn inactive_products_cannot_be_sold() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let canteen = &state.canteen_service;
        let bolo = canteen
            .save_product(
                client_id,
                SaveProductPayload {
                    id: None,
                    name: "Bolo".into(),
                    price: Decimal::new(500, 2),
                    stock: None,
                    active: false,
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            canteen.register_sale(client_id, sale(vec![(bolo.id, 1)])).await,
            Err(AppError::ProductInactive(_))
        ));
    }

    #[tokio::test]
    async fn reversing_a_sale_saturates_stock() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let pastel = product(&state, client_id, "Pastel", 800, Some(5)).await;
        let canteen = &state.canteen_service;

        let registered = canteen
            .register_sale(client_id, sale(vec![(pastel.id, 3)]))
            .await
            .unwrap();

        // Estoque reajustado à mão depois da venda
        canteen
            .save_product(
                client_id,
                SaveProductPayload {
                    id: Some(pastel.id),
                    name: "Pastel".into(),
                    price: Decimal::new(800, 2),
                    stock: Some(u32::MAX - 1),
                    active: true,
                },
            )
            .await
            .unwrap();

        canteen.delete_sale(client_id, registered.id).await.unwrap();
        let products = canteen.get_all_products(client_id).await.unwrap();
        assert_eq!(products[0].stock, Some(u32::MAX));
    }
}
