// src/models/events.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::db::repository::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Gira,
    Festa,
    Curso,
    Reuniao,
    Outro,
}

// --- Evento do calendário ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    #[schema(example = "Gira de Pretos-Velhos")]
    pub title: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    #[schema(example = "#f59e0b")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for CalendarEvent {
    const COLLECTION: &'static str = "events";
    const RESOURCE: &'static str = "event";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_time_range"))]
pub struct SaveEventPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    pub kind: EventKind,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub color: Option<String>,
}

fn validate_time_range(payload: &SaveEventPayload) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (payload.start_time, payload.end_time) {
        if end < start {
            let mut err = ValidationError::new("time_range");
            err.message = Some("O término não pode ser antes do início.".into());
            return Err(err);
        }
    }
    Ok(())
}

// Arrastar e soltar no calendário
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveEventPayload {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct MonthFilter {
    pub month: Option<String>,
}

// --- Chamada (presença) ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    pub id: Uuid,
    pub date: NaiveDate,
    pub event_id: Option<Uuid>,
    #[serde(default)]
    pub present_member_ids: Vec<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for AttendanceSession {
    const COLLECTION: &'static str = "attendance";
    const RESOURCE: &'static str = "attendance";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendancePayload {
    pub date: NaiveDate,
    pub event_id: Option<Uuid>,
    #[serde(default)]
    pub present_member_ids: Vec<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub member_id: Uuid,
    pub sessions_total: usize,
    pub sessions_attended: usize,
    // 0..=100, arredondado para baixo
    pub attendance_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(start: Option<&str>, end: Option<&str>) -> SaveEventPayload {
        SaveEventPayload {
            id: None,
            title: "Gira de Caboclos".into(),
            description: None,
            kind: EventKind::Gira,
            date: NaiveDate::from_ymd_opt(2024, 5, 18).unwrap(),
            start_time: start.map(|t| t.parse().unwrap()),
            end_time: end.map(|t| t.parse().unwrap()),
            location: None,
            color: None,
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let errors = payload(Some("20:00:00"), Some("19:30:00")).validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));

        assert!(payload(Some("20:00:00"), Some("20:00:00")).validate().is_ok());
        assert!(payload(None, Some("19:30:00")).validate().is_ok());
    }
}
