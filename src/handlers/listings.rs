// src/handlers/listings.rs

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
        rbac::{PermListingsApprove, PermListingsWrite, RequirePermission},
    },
    models::listing::{
        CreateListingPayload, Listing, ListingDetail, ListingFilter, ListingStatusPayload, MediaItem, MediaPayload,
        RejectListingPayload, UpdateListingPayload,
    },
};

// =============================================================================
//  1. ANÚNCIOS
// =============================================================================

// POST /api/v1/listings
// Unidade nova (opcional), anúncio e mídias iniciais numa única transação.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    tag = "Listings",
    request_body = CreateListingPayload,
    responses(
        (status = 201, description = "Anúncio criado como rascunho", body = ListingDetail),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    _guard: RequirePermission<PermListingsWrite>,
    Json(payload): Json<CreateListingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detail = app_state
        .listing_service
        .create(&member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "Listings",
    params(ListingFilter, PageParams),
    responses(
        (status = 200, description = "Anúncios", body = Paginated<Listing>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_listings(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<ListingFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let listings = app_state
        .listing_service
        .list(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listings)))
}

#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Anúncio com unidade, empreendimento e mídias", body = ListingDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .listing_service
        .get_detail(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    request_body = UpdateListingPayload,
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Anúncio atualizado", body = Listing)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let listing = app_state
        .listing_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 204, description = "Anúncio removido")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .listing_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. APROVAÇÃO DE CATÁLOGO E STATUS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/submit",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Enviado para aprovação", body = Listing),
        (status = 400, description = "Anúncio sem mídias")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = app_state
        .listing_service
        .submit_for_approval(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/approve",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Publicado no catálogo", body = Listing),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    _guard: RequirePermission<PermListingsApprove>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = app_state
        .listing_service
        .approve(id, &member)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/reject",
    tag = "Listings",
    request_body = RejectListingPayload,
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Devolvido para rascunho", body = Listing)
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_listing(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsApprove>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectListingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let listing = app_state
        .listing_service
        .reject(id, &payload.reason)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/status",
    tag = "Listings",
    request_body = ListingStatusPayload,
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Status alterado", body = Listing),
        (status = 400, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_listing_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ListingStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = app_state
        .listing_service
        .change_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(listing)))
}

// =============================================================================
//  3. MÍDIAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/media",
    tag = "Listings",
    request_body = MediaPayload,
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 201, description = "Mídia adicionada", body = MediaItem)
    ),
    security(("api_jwt" = []))
)]
pub async fn add_media(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsWrite>,
    Path(listing_id): Path<Uuid>,
    Json(payload): Json<MediaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let media = app_state
        .listing_service
        .add_media(listing_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(media)))
}

#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}/media",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Mídias em ordem de exibição", body = Vec<MediaItem>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_media(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let media = app_state
        .listing_service
        .list_media(listing_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(media)))
}

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/media/{media_id}/cover",
    tag = "Listings",
    params(
        ("id" = Uuid, Path, description = "ID do anúncio"),
        ("media_id" = Uuid, Path, description = "ID da mídia")
    ),
    responses(
        (status = 200, description = "Nova capa do anúncio", body = MediaItem)
    ),
    security(("api_jwt" = []))
)]
pub async fn set_cover(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsWrite>,
    Path((listing_id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let media = app_state
        .listing_service
        .set_cover(listing_id, media_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(media)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}/media/{media_id}",
    tag = "Listings",
    params(
        ("id" = Uuid, Path, description = "ID do anúncio"),
        ("media_id" = Uuid, Path, description = "ID da mídia")
    ),
    responses(
        (status = 204, description = "Mídia removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_media(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermListingsWrite>,
    Path((listing_id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .listing_service
        .delete_media(listing_id, media_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
