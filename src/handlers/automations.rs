// src/handlers/automations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermAutomationsManage, RequirePermission},
    },
    models::automation::{AutomationFilter, AutomationRule, CreateAutomationPayload, UpdateAutomationPayload},
};

#[utoipa::path(
    post,
    path = "/api/v1/automations",
    tag = "Automations",
    request_body = CreateAutomationPayload,
    responses(
        (status = 201, description = "Regra criada", body = AutomationRule),
        (status = 400, description = "Configuração incompatível com a ação")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_automation(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    _guard: RequirePermission<PermAutomationsManage>,
    Json(payload): Json<CreateAutomationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let rule = app_state
        .automation_service
        .create_rule(admin.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(rule)))
}

#[utoipa::path(
    get,
    path = "/api/v1/automations",
    tag = "Automations",
    params(AutomationFilter),
    responses(
        (status = 200, description = "Regras de automação", body = Vec<AutomationRule>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_automations(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAutomationsManage>,
    Query(filter): Query<AutomationFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state
        .automation_service
        .list_rules(filter.event)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rules)))
}

#[utoipa::path(
    get,
    path = "/api/v1/automations/{id}",
    tag = "Automations",
    params(("id" = Uuid, Path, description = "ID da regra")),
    responses(
        (status = 200, description = "Regra", body = AutomationRule),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_automation(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAutomationsManage>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rule = app_state
        .automation_service
        .get_rule(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rule)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/automations/{id}",
    tag = "Automations",
    request_body = UpdateAutomationPayload,
    params(("id" = Uuid, Path, description = "ID da regra")),
    responses(
        (status = 200, description = "Regra atualizada", body = AutomationRule)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_automation(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAutomationsManage>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAutomationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let rule = app_state
        .automation_service
        .update_rule(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rule)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/automations/{id}",
    tag = "Automations",
    params(("id" = Uuid, Path, description = "ID da regra")),
    responses(
        (status = 204, description = "Regra removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_automation(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAutomationsManage>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .automation_service
        .delete_rule(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
