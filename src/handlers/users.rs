// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{RequireCapability, RootOnly},
    models::auth::{UpdatePermissionsPayload, User},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Todos os usuários", body = [User])),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireCapability<RootOnly>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = app_state.user_repo.list().await?;
    Ok(Json(users))
}

// Atualiza as flags de permissão de um usuário. As flags valem para admins;
// o root ignora todas elas (ver EffectivePermissions).
#[utoipa::path(
    put,
    path = "/api/users/{id}/permissions",
    tag = "Users",
    request_body = UpdatePermissionsPayload,
    responses(
        (status = 200, description = "Permissões atualizadas", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do usuário")),
    security(("api_jwt" = []))
)]
pub async fn update_permissions(
    State(app_state): State<AppState>,
    _guard: RequireCapability<RootOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePermissionsPayload>,
) -> Result<Json<User>, AppError> {
    let user = app_state
        .user_repo
        .update_permissions(id, payload.can_edit, payload.can_upload, payload.can_download)
        .await?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(user))
}
