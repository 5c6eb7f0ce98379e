// src/handlers/rbac.rs

use axum::Json;

use crate::middleware::rbac::{all_permissions, Permission};

// GET /api/permissions (para o frontend saber o que mostrar na tela de usuários)
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses((status = 200, description = "Permissões do sistema e os papéis que as possuem"))
)]
pub async fn list_permissions() -> Json<Vec<&'static Permission>> {
    Json(all_permissions())
}
