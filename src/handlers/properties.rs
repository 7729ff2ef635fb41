// src/handlers/properties.rs

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
        rbac::{PermPropertiesWrite, RequirePermission},
    },
    models::property::{Building, BuildingFilter, BuildingPayload, Unit, UnitPayload, UpdateUnitPayload},
};

// --- EMPREENDIMENTOS ---

#[utoipa::path(
    post,
    path = "/api/v1/buildings",
    tag = "Properties",
    request_body = BuildingPayload,
    responses(
        (status = 201, description = "Empreendimento criado", body = Building)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPropertiesWrite>,
    Json(payload): Json<BuildingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .property_service
        .create_building(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(building)))
}

#[utoipa::path(
    get,
    path = "/api/v1/buildings",
    tag = "Properties",
    params(BuildingFilter, PageParams),
    responses(
        (status = 200, description = "Empreendimentos", body = Paginated<Building>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_buildings(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<BuildingFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let buildings = app_state
        .property_service
        .list_buildings(&app_state.db_pool, &filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(buildings)))
}

#[utoipa::path(
    get,
    path = "/api/v1/buildings/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do empreendimento")),
    responses(
        (status = 200, description = "Empreendimento", body = Building),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_building(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let building = app_state
        .property_service
        .get_building(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(building)))
}

#[utoipa::path(
    put,
    path = "/api/v1/buildings/{id}",
    tag = "Properties",
    request_body = BuildingPayload,
    params(("id" = Uuid, Path, description = "ID do empreendimento")),
    responses(
        (status = 200, description = "Empreendimento atualizado", body = Building)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_building(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPropertiesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BuildingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .property_service
        .update_building(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(building)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/buildings/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do empreendimento")),
    responses(
        (status = 204, description = "Empreendimento removido"),
        (status = 409, description = "Ainda possui unidades")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_building(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPropertiesWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .property_service
        .delete_building(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// --- UNIDADES ---

#[utoipa::path(
    post,
    path = "/api/v1/buildings/{id}/units",
    tag = "Properties",
    request_body = UnitPayload,
    params(("id" = Uuid, Path, description = "ID do empreendimento")),
    responses(
        (status = 201, description = "Unidade criada", body = Unit),
        (status = 409, description = "Número de unidade repetido no empreendimento")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPropertiesWrite>,
    Path(building_id): Path<Uuid>,
    Json(payload): Json<UnitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unit = app_state
        .property_service
        .create_unit(&app_state.db_pool, building_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(unit)))
}

#[utoipa::path(
    get,
    path = "/api/v1/buildings/{id}/units",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do empreendimento")),
    responses(
        (status = 200, description = "Unidades do empreendimento", body = Vec<Unit>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_units(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(building_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let units = app_state
        .property_service
        .list_units(&app_state.db_pool, building_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(units)))
}

#[utoipa::path(
    get,
    path = "/api/v1/units/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 200, description = "Unidade", body = Unit),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let unit = app_state
        .property_service
        .get_unit(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(unit)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/units/{id}",
    tag = "Properties",
    request_body = UpdateUnitPayload,
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 200, description = "Unidade atualizada", body = Unit)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPropertiesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUnitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unit = app_state
        .property_service
        .update_unit(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(unit)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/units/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID da unidade")),
    responses(
        (status = 204, description = "Unidade removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPropertiesWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .property_service
        .delete_unit(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
