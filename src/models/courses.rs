// src/models/courses.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::repository::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    #[schema(example = "Introdução às sete linhas")]
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub position: u32,
}

// --- Curso EAD ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    #[schema(example = "Fundamentos da Umbanda")]
    pub title: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub cover_url: Option<String>,
    #[schema(example = 20)]
    pub workload_hours: u32,
    pub published: bool,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Course {
    const COLLECTION: &'static str = "courses";
    const RESOURCE: &'static str = "course";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub member_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_lessons: Vec<Uuid>,
    // 0..=100
    pub progress: u8,
    pub status: EnrollmentStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub certificate_code: Option<String>,
}

impl Document for Enrollment {
    const COLLECTION: &'static str = "enrollments";
    const RESOURCE: &'static str = "enrollment";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonPayload {
    // Manter o id preserva o progresso de quem já concluiu a aula
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O título da aula é obrigatório."))]
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveCoursePayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub workload_hours: u32,
    #[serde(default)]
    pub published: bool,
    #[validate(nested)]
    #[serde(default)]
    pub lessons: Vec<LessonPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollPayload {
    pub member_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentFilter {
    pub course_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
}
