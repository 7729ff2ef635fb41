// src/handlers/team.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::{PageParams, Paginated},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{registered_permissions, PermTeamManage, PermissionEntry, RequirePermission},
    },
    models::team::{CreateMemberPayload, TeamFilter, TeamMember, UpdateMemberPayload},
};

#[utoipa::path(
    post,
    path = "/api/v1/team",
    tag = "Team",
    request_body = CreateMemberPayload,
    responses(
        (status = 201, description = "Membro cadastrado", body = TeamMember),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermTeamManage>,
    Json(payload): Json<CreateMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .team_service
        .create_member(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    get,
    path = "/api/v1/team",
    tag = "Team",
    params(TeamFilter, PageParams),
    responses(
        (status = 200, description = "Equipe", body = Paginated<TeamMember>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<TeamFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .team_service
        .list_members(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(members)))
}

#[utoipa::path(
    get,
    path = "/api/v1/team/{id}",
    tag = "Team",
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro", body = TeamMember),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_member(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .team_service
        .get_member(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(member)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/team/{id}",
    tag = "Team",
    request_body = UpdateMemberPayload,
    params(("id" = Uuid, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro atualizado", body = TeamMember)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermTeamManage>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let member = app_state
        .team_service
        .update_member(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(member)))
}

// GET /api/v1/permissions
// Catálogo estático; não consulta o banco.
#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    tag = "Team",
    responses(
        (status = 200, description = "Permissões e papéis que as possuem", body = Vec<PermissionEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_permissions() -> Json<Vec<PermissionEntry>> {
    Json(registered_permissions())
}
