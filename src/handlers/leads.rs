// src/handlers/leads.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermLeadsAssign, PermLeadsWrite, PermSellerLeadsWrite, RequirePermission},
    },
    models::lead::{
        AssignLeadPayload, ConvertSellerLeadPayload, CreateLeadPayload, CreateSellerLeadPayload, Lead, LeadFilter,
        LeadStatusPayload, LeadSummary, SellerLead, SellerLeadConversion, SellerLeadFilter, SellerLeadStatusPayload,
        UpdateLeadPayload, UpdateSellerLeadPayload,
    },
};

// =============================================================================
//  1. LEADS DE COMPRADORES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    _guard: RequirePermission<PermLeadsWrite>,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .create(&member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lead)))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "Leads",
    params(LeadFilter, PageParams),
    responses(
        (status = 200, description = "Leads com dados do contato", body = Paginated<LeadSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<LeadFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = app_state
        .lead_service
        .list(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leads)))
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead", body = LeadSummary),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    request_body = UpdateLeadPayload,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead atualizado", body = Lead)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermLeadsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/{id}/status",
    tag = "Leads",
    request_body = LeadStatusPayload,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Status alterado", body = Lead),
        (status = 400, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_lead_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermLeadsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .change_status(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

#[utoipa::path(
    post,
    path = "/api/v1/leads/{id}/assign",
    tag = "Leads",
    request_body = AssignLeadPayload,
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Responsável alterado", body = Lead)
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    _guard: RequirePermission<PermLeadsAssign>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .assign(id, payload.member_id, &member)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 204, description = "Lead removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermLeadsWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .lead_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. CAPTAÇÕES (PROPRIETÁRIOS)
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/seller-leads",
    tag = "Seller Leads",
    request_body = CreateSellerLeadPayload,
    responses(
        (status = 201, description = "Captação criada", body = SellerLead)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_seller_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    _guard: RequirePermission<PermSellerLeadsWrite>,
    Json(payload): Json<CreateSellerLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let seller_lead = app_state
        .seller_lead_service
        .create(&member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(seller_lead)))
}

#[utoipa::path(
    get,
    path = "/api/v1/seller-leads",
    tag = "Seller Leads",
    params(SellerLeadFilter, PageParams),
    responses(
        (status = 200, description = "Captações", body = Paginated<SellerLead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_seller_leads(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<SellerLeadFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let seller_leads = app_state
        .seller_lead_service
        .list(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(seller_leads)))
}

#[utoipa::path(
    get,
    path = "/api/v1/seller-leads/{id}",
    tag = "Seller Leads",
    params(("id" = Uuid, Path, description = "ID da captação")),
    responses(
        (status = 200, description = "Captação", body = SellerLead),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_seller_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let seller_lead = app_state
        .seller_lead_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(seller_lead)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/seller-leads/{id}",
    tag = "Seller Leads",
    request_body = UpdateSellerLeadPayload,
    params(("id" = Uuid, Path, description = "ID da captação")),
    responses(
        (status = 200, description = "Captação atualizada", body = SellerLead)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_seller_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermSellerLeadsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSellerLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let seller_lead = app_state
        .seller_lead_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(seller_lead)))
}

#[utoipa::path(
    post,
    path = "/api/v1/seller-leads/{id}/status",
    tag = "Seller Leads",
    request_body = SellerLeadStatusPayload,
    params(("id" = Uuid, Path, description = "ID da captação")),
    responses(
        (status = 200, description = "Status alterado", body = SellerLead),
        (status = 400, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_seller_lead_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermSellerLeadsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SellerLeadStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let seller_lead = app_state
        .seller_lead_service
        .change_status(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(seller_lead)))
}

// POST /api/v1/seller-leads/{id}/convert
// Cria o anúncio e marca a captação como `listed` na mesma transação.
#[utoipa::path(
    post,
    path = "/api/v1/seller-leads/{id}/convert",
    tag = "Seller Leads",
    request_body = ConvertSellerLeadPayload,
    params(("id" = Uuid, Path, description = "ID da captação")),
    responses(
        (status = 201, description = "Anúncio criado a partir da captação", body = SellerLeadConversion),
        (status = 400, description = "Captação sem contrato assinado")
    ),
    security(("api_jwt" = []))
)]
pub async fn convert_seller_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    _guard: RequirePermission<PermSellerLeadsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConvertSellerLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let conversion = app_state
        .seller_lead_service
        .convert(id, &member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(conversion)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/seller-leads/{id}",
    tag = "Seller Leads",
    params(("id" = Uuid, Path, description = "ID da captação")),
    responses(
        (status = 204, description = "Captação removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_seller_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermSellerLeadsWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .seller_lead_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
