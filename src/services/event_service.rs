// src/services/event_service.rs

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::{dates::Month, error::AppError},
    db::{EventRepository, Scope},
    models::events::{CalendarEvent, SaveEventPayload},
};

fn sort_by_schedule(events: &mut [CalendarEvent]) {
    // Eventos sem horário vão para o fim do dia
    events.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.start_time.is_none().cmp(&b.start_time.is_none()))
            .then_with(|| a.start_time.cmp(&b.start_time))
    });
}

#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
}

impl EventService {
    pub fn new(event_repo: EventRepository) -> Self {
        Self { event_repo }
    }

    pub async fn list_events(
        &self,
        client_id: Uuid,
        month: Option<Month>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let mut events = self.event_repo.get_all(Scope::Tenant(client_id)).await?;
        if let Some(month) = month {
            events.retain(|e| month.contains(e.date));
        }
        sort_by_schedule(&mut events);
        Ok(events)
    }

    /// Eventos de `from` até `from + days` (inclusive).
    pub async fn upcoming(
        &self,
        client_id: Uuid,
        from: NaiveDate,
        days: i64,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let until = from + Duration::days(days);
        let mut events = self.event_repo.get_all(Scope::Tenant(client_id)).await?;
        events.retain(|e| e.date >= from && e.date <= until);
        sort_by_schedule(&mut events);
        Ok(events)
    }

    pub async fn save_event(
        &self,
        client_id: Uuid,
        payload: SaveEventPayload,
    ) -> Result<CalendarEvent, AppError> {
        let scope = Scope::Tenant(client_id);
        let existing = match payload.id {
            Some(id) => self.event_repo.find(scope, id).await?,
            None => None,
        };

        let now = Utc::now();
        let event = CalendarEvent {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            title: payload.title,
            description: payload.description,
            kind: payload.kind,
            date: payload.date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            location: payload.location,
            color: payload.color,
            created_at: existing.map(|e| e.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.event_repo.save(scope, &event).await?;
        Ok(event)
    }

    /// Arrastar e soltar: muda só a data, mantendo os horários.
    pub async fn move_event(
        &self,
        client_id: Uuid,
        event_id: Uuid,
        date: NaiveDate,
    ) -> Result<CalendarEvent, AppError> {
        let scope = Scope::Tenant(client_id);
        let mut event = self.event_repo.get(scope, event_id).await?;
        event.date = date;
        event.updated_at = Utc::now();

        self.event_repo.save(scope, &event).await?;
        Ok(event)
    }

    pub async fn delete_event(&self, client_id: Uuid, event_id: Uuid) -> Result<(), AppError> {
        self.event_repo
            .delete_existing(Scope::Tenant(client_id), event_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::models::events::EventKind;
    use crate::services::member_service::tests::seed_client;
    use chrono::NaiveTime;

    fn event_payload(title: &str, date: NaiveDate, start: Option<(u32, u32)>) -> SaveEventPayload {
        SaveEventPayload {
            id: None,
            title: title.into(),
            description: None,
            kind: EventKind::Gira,
            date,
            start_time: start.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            end_time: None,
            location: Some("Terreiro".into()),
            color: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[tokio::test]
    async fn month_listing_is_ordered_by_date_and_time() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let events = &state.event_service;

        events.save_event(client_id, event_payload("Festa", day(20), None)).await.unwrap();
        events.save_event(client_id, event_payload("Gira noite", day(3), Some((20, 0)))).await.unwrap();
        events.save_event(client_id, event_payload("Gira tarde", day(3), Some((15, 0)))).await.unwrap();
        events
            .save_event(client_id, event_payload("Junho", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), None))
            .await
            .unwrap();

        let may = events
            .list_events(client_id, Some(Month::parse("2024-05").unwrap()))
            .await
            .unwrap();
        let titles: Vec<&str> = may.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Gira tarde", "Gira noite", "Festa"]);
    }

    #[tokio::test]
    async fn moving_keeps_times() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let events = &state.event_service;

        let event = events
            .save_event(client_id, event_payload("Gira", day(3), Some((20, 0))))
            .await
            .unwrap();
        let moved = events.move_event(client_id, event.id, day(10)).await.unwrap();

        assert_eq!(moved.date, day(10));
        assert_eq!(moved.start_time, event.start_time);
        assert_eq!(events.upcoming(client_id, day(1), 30).await.unwrap().len(), 1);
        assert!(events.upcoming(client_id, day(11), 30).await.unwrap().is_empty());
    }
}
