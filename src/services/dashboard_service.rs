// src/services/dashboard_service.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{dates::Month, error::AppError},
    db::{MemberRepository, Scope},
    models::{dashboard::DashboardSummary, members::MemberStatus},
    services::{
        event_service::EventService, finance_service::FinanceService,
        inventory_service::InventoryService,
    },
};

// Janela de "próximos eventos" da tela inicial
const UPCOMING_DAYS: i64 = 30;

#[derive(Clone)]
pub struct DashboardService {
    member_repo: MemberRepository,
    event_service: EventService,
    inventory_service: InventoryService,
    finance_service: FinanceService,
}

impl DashboardService {
    pub fn new(
        member_repo: MemberRepository,
        event_service: EventService,
        inventory_service: InventoryService,
        finance_service: FinanceService,
    ) -> Self {
        Self { member_repo, event_service, inventory_service, finance_service }
    }

    pub async fn summary(&self, client_id: Uuid, today: NaiveDate) -> Result<DashboardSummary, AppError> {
        let members = self.member_repo.get_all(Scope::Tenant(client_id)).await?;
        let active: Vec<_> = members
            .iter()
            .filter(|m| m.status == MemberStatus::Active)
            .collect();

        let upcoming_events = self
            .event_service
            .upcoming(client_id, today, UPCOMING_DAYS)
            .await?;
        let low_stock_items = self.inventory_service.low_stock(client_id).await?.len();
        let report = self
            .finance_service
            .monthly_report(client_id, Month::of(today))
            .await?;

        Ok(DashboardSummary {
            active_members: active.len(),
            mediums: active.iter().filter(|m| m.is_medium).count(),
            cambones: active.iter().filter(|m| m.is_cambone).count(),
            upcoming_events,
            low_stock_items,
            month: report.month,
            month_expected: report.total_expected,
            month_collected: report.total_collected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::models::events::{EventKind, SaveEventPayload};
    use crate::models::members::PaymentStatus;
    use crate::services::member_service::tests::{member_payload, seed_client};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn summary_reflects_members_events_and_fees() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let today = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        let ana = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();
        state
            .member_service
            .save_member(client_id, member_payload("Bento", false, true))
            .await
            .unwrap();
        state
            .member_service
            .set_payment(client_id, ana.id, "2024-05", PaymentStatus::Paid)
            .await
            .unwrap();

        for date in [today, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()] {
            state
                .event_service
                .save_event(
                    client_id,
                    SaveEventPayload {
                        id: None,
                        title: "Gira".into(),
                        description: None,
                        kind: EventKind::Gira,
                        date,
                        start_time: None,
                        end_time: None,
                        location: None,
                        color: None,
                    },
                )
                .await
                .unwrap();
        }

        let summary = state.dashboard_service.summary(client_id, today).await.unwrap();
        assert_eq!(summary.active_members, 2);
        assert_eq!((summary.mediums, summary.cambones), (1, 1));
        assert_eq!(summary.upcoming_events.len(), 1);
        assert_eq!(summary.low_stock_items, 0);
        assert_eq!(summary.month, "2024-05");
        assert_eq!(summary.month_expected, Decimal::new(8000, 2));
        assert_eq!(summary.month_collected, Decimal::new(5000, 2));
    }
}
