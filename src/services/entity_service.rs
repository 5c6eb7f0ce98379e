// src/services/entity_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EntityRepository, MemberRepository, Scope},
    models::members::{SaveEntityPayload, SpiritualEntity},
};

#[derive(Clone)]
pub struct EntityService {
    entity_repo: EntityRepository,
    member_repo: MemberRepository,
}

impl EntityService {
    pub fn new(entity_repo: EntityRepository, member_repo: MemberRepository) -> Self {
        Self { entity_repo, member_repo }
    }

    pub async fn get_all_entities(&self, client_id: Uuid) -> Result<Vec<SpiritualEntity>, AppError> {
        let mut entities = self.entity_repo.get_all(Scope::Tenant(client_id)).await?;
        entities.sort_by(|a, b| a.line.cmp(&b.line).then_with(|| a.name.cmp(&b.name)));
        Ok(entities)
    }

    pub async fn save_entity(
        &self,
        client_id: Uuid,
        payload: SaveEntityPayload,
    ) -> Result<SpiritualEntity, AppError> {
        let scope = Scope::Tenant(client_id);
        let existing = match payload.id {
            Some(id) => self.entity_repo.find(scope, id).await?,
            None => None,
        };

        let entity = SpiritualEntity {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            name: payload.name,
            line: payload.line,
            description: payload.description,
            created_at: existing.map(|e| e.created_at).unwrap_or_else(Utc::now),
        };

        self.entity_repo.save(scope, &entity).await?;
        Ok(entity)
    }

    /// Remove a entidade e tira o seu id dos membros que a trabalham.
    pub async fn delete_entity(&self, client_id: Uuid, entity_id: Uuid) -> Result<(), AppError> {
        let scope = Scope::Tenant(client_id);
        self.entity_repo.delete_existing(scope, entity_id).await?;

        let mut touched = 0;
        for mut member in self.member_repo.get_all(scope).await? {
            if member.entity_ids.contains(&entity_id) {
                member.entity_ids.retain(|id| *id != entity_id);
                member.updated_at = Utc::now();
                self.member_repo.save(scope, &member).await?;
                touched += 1;
            }
        }

        if touched > 0 {
            tracing::info!("🕯️ Entidade {} removida de {} membros", entity_id, touched);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::services::member_service::tests::{member_payload, seed_client};

    #[tokio::test]
    async fn deleting_an_entity_unlinks_members() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let entities = &state.entity_service;

        let caboclo = entities
            .save_entity(
                client_id,
                SaveEntityPayload {
                    id: None,
                    name: "Caboclo Pena Branca".into(),
                    line: "Caboclos".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let preto_velho = entities
            .save_entity(
                client_id,
                SaveEntityPayload {
                    id: None,
                    name: "Pai Joaquim".into(),
                    line: "Pretos-Velhos".into(),
                    description: None,
                },
            )
            .await
            .unwrap();

        let mut payload = member_payload("Ana", true, false);
        payload.entity_ids = vec![caboclo.id, preto_velho.id];
        let member = state.member_service.save_member(client_id, payload).await.unwrap();

        entities.delete_entity(client_id, caboclo.id).await.unwrap();

        let member = state.member_service.get_member(client_id, member.id).await.unwrap();
        assert_eq!(member.entity_ids, vec![preto_velho.id]);
        assert_eq!(entities.get_all_entities(client_id).await.unwrap().len(), 1);
        assert!(matches!(
            entities.delete_entity(client_id, caboclo.id).await,
            Err(AppError::NotFound("entity"))
        ));
    }
}
