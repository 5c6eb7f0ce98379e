// src/services/attendance_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{dates::Month, error::AppError},
    db::{AttendanceRepository, Scope},
    models::events::{AttendanceSession, AttendanceSummary, RecordAttendancePayload},
};

#[derive(Clone)]
pub struct AttendanceService {
    attendance_repo: AttendanceRepository,
}

impl AttendanceService {
    pub fn new(attendance_repo: AttendanceRepository) -> Self {
        Self { attendance_repo }
    }

    /// Uma chamada por (data, evento): gravar de novo substitui a lista de presentes.
    pub async fn record(
        &self,
        client_id: Uuid,
        payload: RecordAttendancePayload,
    ) -> Result<AttendanceSession, AppError> {
        let scope = Scope::Tenant(client_id);

        let existing = self
            .attendance_repo
            .find_where(scope, "date", payload.date)
            .await?
            .into_iter()
            .find(|s| s.event_id == payload.event_id);

        let mut present = payload.present_member_ids;
        present.sort();
        present.dedup();

        let now = Utc::now();
        let session = match existing {
            Some(session) => AttendanceSession {
                present_member_ids: present,
                notes: payload.notes,
                updated_at: now,
                ..session
            },
            None => AttendanceSession {
                id: Uuid::new_v4(),
                date: payload.date,
                event_id: payload.event_id,
                present_member_ids: present,
                notes: payload.notes,
                created_at: now,
                updated_at: now,
            },
        };

        self.attendance_repo.save(scope, &session).await?;
        tracing::info!("📋 Chamada de {}: {} presentes", session.date, session.present_member_ids.len());
        Ok(session)
    }

    pub async fn list_sessions(
        &self,
        client_id: Uuid,
        month: Option<Month>,
    ) -> Result<Vec<AttendanceSession>, AppError> {
        let mut sessions = self.attendance_repo.get_all(Scope::Tenant(client_id)).await?;
        if let Some(month) = month {
            sessions.retain(|s| month.contains(s.date));
        }
        sessions.sort_by_key(|s| s.date);
        Ok(sessions)
    }

    pub async fn delete_session(&self, client_id: Uuid, session_id: Uuid) -> Result<(), AppError> {
        self.attendance_repo
            .delete_existing(Scope::Tenant(client_id), session_id)
            .await
    }

    /// Frequência do membro sobre todas as chamadas registradas.
    pub async fn member_summary(
        &self,
        client_id: Uuid,
        member_id: Uuid,
    ) -> Result<AttendanceSummary, AppError> {
        let sessions = self.attendance_repo.get_all(Scope::Tenant(client_id)).await?;
        let sessions_total = sessions.len();
        let sessions_attended = sessions
            .iter()
            .filter(|s| s.present_member_ids.contains(&member_id))
            .count();

        let attendance_percent = if sessions_total == 0 {
            0
        } else {
            (sessions_attended * 100 / sessions_total) as u8
        };

        Ok(AttendanceSummary { member_id, sessions_total, sessions_attended, attendance_percent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::services::member_service::tests::seed_client;
    use chrono::NaiveDate;

    fn payload(day: u32, present: Vec<Uuid>) -> RecordAttendancePayload {
        RecordAttendancePayload {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            event_id: None,
            present_member_ids: present,
            notes: None,
        }
    }

    #[tokio::test]
    async fn recording_the_same_day_replaces_the_session() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let attendance = &state.attendance_service;
        let (ana, bento) = (Uuid::new_v4(), Uuid::new_v4());

        let first = attendance.record(client_id, payload(3, vec![ana])).await.unwrap();
        let second = attendance
            .record(client_id, payload(3, vec![ana, bento, ana]))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.present_member_ids.len(), 2);
        assert_eq!(attendance.list_sessions(client_id, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn summary_counts_sessions_attended() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let attendance = &state.attendance_service;
        let ana = Uuid::new_v4();

        attendance.record(client_id, payload(3, vec![ana])).await.unwrap();
        attendance.record(client_id, payload(10, vec![])).await.unwrap();
        attendance.record(client_id, payload(17, vec![ana])).await.unwrap();

        let summary = attendance.member_summary(client_id, ana).await.unwrap();
        assert_eq!(summary.sessions_total, 3);
        assert_eq!(summary.sessions_attended, 2);
        assert_eq!(summary.attendance_percent, 66);
    }
}
