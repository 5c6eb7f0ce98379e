// src/services/course_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CourseRepository, EnrollmentRepository, MemberRepository, Scope},
    models::{
        courses::{
            Course, Enrollment, EnrollmentFilter, EnrollmentStatus, Lesson, SaveCoursePayload,
        },
        settings::CardField,
    },
    services::{
        document_service::{short_code, DocumentService, PageData},
        settings_service::SettingsService,
    },
};

/// floor(concluídas * 100 / total); curso sem aulas fica em 0.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (completed.min(total) * 100 / total) as u8
}

#[derive(Clone)]
pub struct CourseService {
    course_repo: CourseRepository,
    enrollment_repo: EnrollmentRepository,
    member_repo: MemberRepository,
    settings_service: SettingsService,
    document_service: DocumentService,
}

impl CourseService {
    pub fn new(
        course_repo: CourseRepository,
        enrollment_repo: EnrollmentRepository,
        member_repo: MemberRepository,
        settings_service: SettingsService,
        document_service: DocumentService,
    ) -> Self {
        Self { course_repo, enrollment_repo, member_repo, settings_service, document_service }
    }

    // --- CURSOS ---

    pub async fn get_all_courses(&self, client_id: Uuid) -> Result<Vec<Course>, AppError> {
        self.course_repo.get_all(Scope::Tenant(client_id)).await
    }

    pub async fn get_course(&self, client_id: Uuid, course_id: Uuid) -> Result<Course, AppError> {
        self.course_repo.get(Scope::Tenant(client_id), course_id).await
    }

    pub async fn save_course(
        &self,
        client_id: Uuid,
        payload: SaveCoursePayload,
    ) -> Result<Course, AppError> {
        let scope = Scope::Tenant(client_id);
        let existing = match payload.id {
            Some(id) => self.course_repo.find(scope, id).await?,
            None => None,
        };

        // A ordem do formulário define a posição
        let lessons = payload
            .lessons
            .into_iter()
            .enumerate()
            .map(|(index, lesson)| Lesson {
                id: lesson.id.unwrap_or_else(Uuid::new_v4),
                title: lesson.title,
                content: lesson.content,
                video_url: lesson.video_url,
                position: index as u32 + 1,
            })
            .collect();

        let now = Utc::now();
        let course = Course {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            title: payload.title,
            description: payload.description,
            instructor: payload.instructor,
            cover_url: payload.cover_url,
            workload_hours: payload.workload_hours,
            published: payload.published,
            lessons,
            created_at: existing.map(|c| c.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.course_repo.save(scope, &course).await?;
        Ok(course)
    }

    /// Apaga o curso e as matrículas dele.
    pub async fn delete_course(&self, client_id: Uuid, course_id: Uuid) -> Result<(), AppError> {
        let scope = Scope::Tenant(client_id);
        self.course_repo.delete_existing(scope, course_id).await?;

        let enrollments = self.enrollment_repo.find_where(scope, "courseId", course_id).await?;
        for enrollment in &enrollments {
            self.enrollment_repo.delete(scope, enrollment.id).await?;
        }

        tracing::info!("🎓 Curso {} removido com {} matrículas", course_id, enrollments.len());
        Ok(())
    }

    // --- MATRÍCULAS ---

    pub async fn enroll(
        &self,
        client_id: Uuid,
        course_id: Uuid,
        member_id: Uuid,
    ) -> Result<Enrollment, AppError> {
        let scope = Scope::Tenant(client_id);
        self.course_repo.get(scope, course_id).await?;
        self.member_repo.get(scope, member_id).await?;

        let already = self
            .enrollment_repo
            .find_where(scope, "courseId", course_id)
            .await?
            .iter()
            .any(|e| e.member_id == member_id);
        if already {
            return Err(AppError::AlreadyEnrolled);
        }

        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            course_id,
            member_id,
            enrolled_at: Utc::now(),
            completed_lessons: Vec::new(),
            progress: 0,
            status: EnrollmentStatus::InProgress,
            completed_at: None,
            certificate_code: None,
        };

        self.enrollment_repo.save(scope, &enrollment).await?;
        Ok(enrollment)
    }

    pub async fn list_enrollments(
        &self,
        client_id: Uuid,
        filter: EnrollmentFilter,
    ) -> Result<Vec<Enrollment>, AppError> {
        let scope = Scope::Tenant(client_id);
        let enrollments = match filter.course_id {
            Some(course_id) => self.enrollment_repo.find_where(scope, "courseId", course_id).await?,
            None => self.enrollment_repo.get_all(scope).await?,
        };

        Ok(enrollments
            .into_iter()
            .filter(|e| filter.member_id.is_none_or(|member_id| e.member_id == member_id))
            .collect())
    }

    pub async fn cancel_enrollment(&self, client_id: Uuid, enrollment_id: Uuid) -> Result<(), AppError> {
        self.enrollment_repo
            .delete_existing(Scope::Tenant(client_id), enrollment_id)
            .await
    }

    /// Marca a aula como concluída (idempotente) e recalcula o progresso.
    pub async fn complete_lesson(
        &self,
        client_id: Uuid,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Enrollment, AppError> {
        let scope = Scope::Tenant(client_id);
        let mut enrollment = self.enrollment_repo.get(scope, enrollment_id).await?;
        let course = self.course_repo.get(scope, enrollment.course_id).await?;

        if !course.lessons.iter().any(|l| l.id == lesson_id) {
            return Err(AppError::NotFound("lesson"));
        }
        if !enrollment.completed_lessons.contains(&lesson_id) {
            enrollment.completed_lessons.push(lesson_id);
        }

        // Aulas removidas do curso não contam
        let completed = course
            .lessons
            .iter()
            .filter(|l| enrollment.completed_lessons.contains(&l.id))
            .count();
        enrollment.progress = progress_percent(completed, course.lessons.len());

        if enrollment.progress == 100 && enrollment.status != EnrollmentStatus::Completed {
            enrollment.status = EnrollmentStatus::Completed;
            enrollment.completed_at = Some(Utc::now());
            tracing::info!("🎓 Matrícula {} concluída: {}", enrollment.id, course.title);
        }
        if enrollment.status == EnrollmentStatus::Completed && enrollment.certificate_code.is_none() {
            enrollment.certificate_code = Some(short_code());
        }

        self.enrollment_repo.save(scope, &enrollment).await?;
        Ok(enrollment)
    }

    /// PDF do certificado, no layout configurado pelo terreiro.
    pub async fn certificate_pdf(&self, client_id: Uuid, enrollment_id: Uuid) -> Result<Vec<u8>, AppError> {
        let scope = Scope::Tenant(client_id);
        let enrollment = self.enrollment_repo.get(scope, enrollment_id).await?;

        let (Some(completed_at), Some(code)) = (enrollment.completed_at, &enrollment.certificate_code)
        else {
            return Err(AppError::CourseNotCompleted);
        };

        let course = self.course_repo.get(scope, enrollment.course_id).await?;
        let member = self.member_repo.get(scope, enrollment.member_id).await?;
        let config = self.settings_service.get_settings(client_id).await?;

        let page = PageData::default()
            .with(CardField::Name, member.name)
            .with(CardField::CourseTitle, course.title.clone())
            .with(CardField::Workload, format!("Carga horária: {} horas", course.workload_hours))
            .with(
                CardField::CompletionDate,
                format!("Concluído em {}", completed_at.format("%d/%m/%Y")),
            )
            .with(CardField::TerreiroName, config.terreiro_name)
            .with(CardField::MemberCode, code.clone())
            .with(CardField::IssueDate, Utc::now().format("%d/%m/%Y").to_string())
            .with_qr(format!("CERT:{code}"));

        self.document_service.render_layout_pages(
            &format!("Certificado - {}", course.title),
            &config.certificate_layout,
            vec![page],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppState;
    use crate::models::courses::LessonPayload;
    use crate::services::member_service::tests::{member_payload, seed_client};

    fn course_payload(lessons: usize) -> SaveCoursePayload {
        SaveCoursePayload {
            id: None,
            title: "Fundamentos da Umbanda".into(),
            description: None,
            instructor: Some("Pai Jorge".into()),
            cover_url: None,
            workload_hours: 20,
            published: true,
            lessons: (1..=lessons)
                .map(|n| LessonPayload {
                    id: None,
                    title: format!("Aula {n}"),
                    content: None,
                    video_url: None,
                })
                .collect(),
        }
    }

    #[test]
    fn progress_is_floored() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[tokio::test]
    async fn completing_all_lessons_issues_one_certificate_code() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let courses = &state.course_service;

        let course = courses.save_course(client_id, course_payload(2)).await.unwrap();
        let member = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();
        let enrollment = courses.enroll(client_id, course.id, member.id).await.unwrap();

        let first = courses
            .complete_lesson(client_id, enrollment.id, course.lessons[0].id)
            .await
            .unwrap();
        assert_eq!(first.progress, 50);
        assert_eq!(first.status, EnrollmentStatus::InProgress);

        // Repetir a mesma aula não muda nada
        let again = courses
            .complete_lesson(client_id, enrollment.id, course.lessons[0].id)
            .await
            .unwrap();
        assert_eq!(again.completed_lessons.len(), 1);

        let done = courses
            .complete_lesson(client_id, enrollment.id, course.lessons[1].id)
            .await
            .unwrap();
        assert_eq!(done.progress, 100);
        assert_eq!(done.status, EnrollmentStatus::Completed);
        let code = done.certificate_code.clone().unwrap();

        let repeated = courses
            .complete_lesson(client_id, enrollment.id, course.lessons[1].id)
            .await
            .unwrap();
        assert_eq!(repeated.certificate_code, Some(code));
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_a_conflict() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let courses = &state.course_service;
        let course = courses.save_course(client_id, course_payload(1)).await.unwrap();
        let member = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();

        courses.enroll(client_id, course.id, member.id).await.unwrap();
        assert!(matches!(
            courses.enroll(client_id, course.id, member.id).await,
            Err(AppError::AlreadyEnrolled)
        ));
        assert!(matches!(
            courses.enroll(client_id, course.id, Uuid::new_v4()).await,
            Err(AppError::NotFound("member"))
        ));
    }

    #[tokio::test]
    async fn deleting_a_course_removes_its_enrollments() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let courses = &state.course_service;
        let course = courses.save_course(client_id, course_payload(1)).await.unwrap();
        let member = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();
        courses.enroll(client_id, course.id, member.id).await.unwrap();

        courses.delete_course(client_id, course.id).await.unwrap();

        let left = courses
            .list_enrollments(client_id, EnrollmentFilter { course_id: None, member_id: None })
            .await
            .unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn certificate_requires_completion() {
        let state = AppState::in_memory();
        let client_id = seed_client(&state, None).await;
        let courses = &state.course_service;
        let course = courses.save_course(client_id, course_payload(1)).await.unwrap();
        let member = state
            .member_service
            .save_member(client_id, member_payload("Ana", true, false))
            .await
            .unwrap();
        let enrollment = courses.enroll(client_id, course.id, member.id).await.unwrap();

        assert!(matches!(
            courses.certificate_pdf(client_id, enrollment.id).await,
            Err(AppError::CourseNotCompleted)
        ));

        courses
            .complete_lesson(client_id, enrollment.id, course.lessons[0].id)
            .await
            .unwrap();
        let pdf = courses.certificate_pdf(client_id, enrollment.id).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
