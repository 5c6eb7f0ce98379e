// src/services/backup_service.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CollectionPath, Document, DocumentStore, Scope},
    models::{
        canteen::{CanteenProduct, CanteenSale},
        courses::{Course, Enrollment},
        dashboard::{ImportSummary, TenantBackup},
        email::{EmailAccount, EmailMessage},
        events::{AttendanceSession, CalendarEvent},
        finance::Donation,
        id_cards::IdCardLog,
        inventory::{InventoryCategory, InventoryItem, StockLog},
        members::{Member, SpiritualEntity},
        settings::SystemConfig,
    },
};

/// Uma subcoleção do terreiro e o tipo que os documentos dela precisam ter.
pub struct TenantCollection {
    pub name: &'static str,
    decodes: fn(&Value) -> bool,
}

impl TenantCollection {
    const fn of<T: Document>() -> Self {
        Self { name: T::COLLECTION, decodes: decodes_as::<T> }
    }
}

fn decodes_as<T: Document>(doc: &Value) -> bool {
    T::deserialize(doc).is_ok()
}

/// Todas as subcoleções de um terreiro.
pub const TENANT_COLLECTIONS: &[TenantCollection] = &[
    TenantCollection::of::<SystemConfig>(),
    TenantCollection::of::<Member>(),
    TenantCollection::of::<SpiritualEntity>(),
    TenantCollection::of::<InventoryCategory>(),
    TenantCollection::of::<InventoryItem>(),
    TenantCollection::of::<StockLog>(),
    TenantCollection::of::<Course>(),
    TenantCollection::of::<Enrollment>(),
    TenantCollection::of::<CanteenProduct>(),
    TenantCollection::of::<CanteenSale>(),
    TenantCollection::of::<CalendarEvent>(),
    TenantCollection::of::<AttendanceSession>(),
    TenantCollection::of::<IdCardLog>(),
    TenantCollection::of::<EmailAccount>(),
    TenantCollection::of::<EmailMessage>(),
    TenantCollection::of::<Donation>(),
];

#[derive(Clone)]
pub struct BackupService {
    store: Arc<dyn DocumentStore>,
}

impl BackupService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn export(&self, client_id: Uuid) -> Result<TenantBackup, AppError> {
        let scope = Scope::Tenant(client_id);
        let mut collections = BTreeMap::new();
        for collection in TENANT_COLLECTIONS {
            let docs = self.store.list(&CollectionPath::new(scope, collection.name)).await?;
            collections.insert(collection.name.to_string(), docs);
        }

        tracing::info!("💾 Backup exportado do terreiro {}", client_id);
        Ok(TenantBackup { client_id, exported_at: Utc::now(), collections })
    }

    /// Upsert de cada documento. Coleções desconhecidas, documentos sem `id` e documentos
    /// que não decodificam no tipo da coleção são ignorados.
    pub async fn import(
        &self,
        client_id: Uuid,
        backup: TenantBackup,
    ) -> Result<ImportSummary, AppError> {
        if backup.client_id != client_id {
            return Err(AppError::BackupTenantMismatch);
        }

        let scope = Scope::Tenant(client_id);
        let mut imported = BTreeMap::new();
        let mut skipped = 0;

        for (name, docs) in backup.collections {
            let Some(collection) = TENANT_COLLECTIONS.iter().find(|c| c.name == name) else {
                skipped += docs.len();
                continue;
            };
            let path = CollectionPath::new(scope, collection.name);
            // config/{clientId}: só existe o documento do próprio terreiro
            let single_id = (collection.name == SystemConfig::COLLECTION).then_some(client_id);

            let mut count = 0;
            for doc in docs {
                let id = doc
                    .get("id")
                    .and_then(|v| v.as_str())
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .filter(|id| single_id.is_none_or(|only| only == *id))
                    .filter(|_| (collection.decodes)(&doc));
                match id {
                    Some(id) => {
                        self.store.put(&path, id, doc).await?;
                        count += 1;
                    }
                    None => skipped += 1,
                }
            }
            imported.insert(name, count);
        }

        tracing::info!("💾 Backup importado no terreiro {} ({} ignorados)", client_id, skipped);
        Ok(ImportSummary { imported, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::services::member_service::tests::{member_payload, seed_client};
    use serde_json::json;

    #[tokio::test]
    async fn export_then_import_restores_documents() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let ana = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();

        let backup = state.backup_service.export(client_id).await.unwrap();
        assert_eq!(backup.collections.len(), TENANT_COLLECTIONS.len());
        assert_eq!(backup.collections["members"].len(), 1);

        state.member_service.delete_member(client_id, ana.id).await.unwrap();
        let summary = state.backup_service.import(client_id, backup).await.unwrap();

        assert_eq!(summary.imported["members"], 1);
        assert_eq!(summary.skipped, 0);
        let restored = state.member_service.get_member(client_id, ana.id).await.unwrap();
        assert_eq!(restored, ana);
    }

    #[tokio::test]
    async fn import_rejects_other_tenant_and_skips_bad_docs() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;

        let foreign = TenantBackup {
            client_id: Uuid::new_v4(),
            exported_at: Utc::now(),
            collections: BTreeMap::new(),
        };
        assert!(matches!(
            state.backup_service.import(client_id, foreign).await,
            Err(AppError::BackupTenantMismatch)
        ));

        let backup = TenantBackup {
            client_id,
            exported_at: Utc::now(),
            collections: BTreeMap::from([
                ("donations".to_string(), vec![json!({ "amount": "10.00" })]),
                ("users".to_string(), vec![json!({ "id": Uuid::new_v4() })]),
            ]),
        };
        let summary = state.backup_service.import(client_id, backup).await.unwrap();
        assert_eq!(summary.imported["donations"], 0);
        assert_eq!(summary.skipped, 2);
    }

    #[tokio::test]
    async fn import_skips_documents_that_do_not_fit_the_collection() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let ana = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();

        let backup = state.backup_service.export(client_id).await.unwrap();
        let mut config = backup.collections["config"][0].clone();
        config["id"] = json!(Uuid::new_v4());

        let broken = TenantBackup {
            client_id,
            exported_at: Utc::now(),
            collections: BTreeMap::from([
                (
                    "members".to_string(),
                    vec![json!({ "id": Uuid::new_v4(), "nome": "sem campos" })],
                ),
                ("config".to_string(), vec![config]),
            ]),
        };
        let summary = state.backup_service.import(client_id, broken).await.unwrap();
        assert_eq!(summary.imported["members"], 0);
        assert_eq!(summary.imported["config"], 0);
        assert_eq!(summary.skipped, 2);

        let members = state.member_service.get_all_members(client_id).await.unwrap();
        assert_eq!(members, vec![ana]);
    }
}
