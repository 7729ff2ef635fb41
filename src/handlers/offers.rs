// src/handlers/offers.rs

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
        rbac::{PermOffersRespond, PermOffersWrite, RequirePermission},
    },
    models::offer::{CounterOfferPayload, CreateOfferPayload, Offer, OfferFilter, ReviseOfferPayload},
};

#[utoipa::path(
    post,
    path = "/api/v1/offers",
    tag = "Offers",
    request_body = CreateOfferPayload,
    responses(
        (status = 201, description = "Proposta registrada", body = Offer),
        (status = 409, description = "Anúncio indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOffersWrite>,
    Json(payload): Json<CreateOfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let offer = app_state
        .offer_service
        .create(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(offer)))
}

#[utoipa::path(
    get,
    path = "/api/v1/offers",
    tag = "Offers",
    params(OfferFilter, PageParams),
    responses(
        (status = 200, description = "Propostas", body = Paginated<Offer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<OfferFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let offers = app_state
        .offer_service
        .list(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offers)))
}

#[utoipa::path(
    get,
    path = "/api/v1/offers/{id}",
    tag = "Offers",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta", body = Offer),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .offer_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/counter",
    tag = "Offers",
    request_body = CounterOfferPayload,
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Contraproposta registrada", body = Offer)
    ),
    security(("api_jwt" = []))
)]
pub async fn counter_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOffersRespond>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CounterOfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let offer = app_state
        .offer_service
        .counter(id, payload.counter_amount)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/revise",
    tag = "Offers",
    request_body = ReviseOfferPayload,
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta revisada pelo comprador", body = Offer)
    ),
    security(("api_jwt" = []))
)]
pub async fn revise_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOffersWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviseOfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let offer = app_state
        .offer_service
        .revise(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

// POST /api/v1/offers/{id}/accept
// Recusa as demais propostas abertas e coloca o anúncio em negociação.
#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/accept",
    tag = "Offers",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta aceita", body = Offer),
        (status = 409, description = "Proposta expirada ou anúncio indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOffersRespond>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .offer_service
        .accept(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/reject",
    tag = "Offers",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta recusada", body = Offer)
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOffersRespond>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .offer_service
        .reject(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}

#[utoipa::path(
    post,
    path = "/api/v1/offers/{id}/withdraw",
    tag = "Offers",
    params(("id" = Uuid, Path, description = "ID da proposta")),
    responses(
        (status = 200, description = "Proposta retirada pelo comprador", body = Offer)
    ),
    security(("api_jwt" = []))
)]
pub async fn withdraw_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOffersWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .offer_service
        .withdraw(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(offer)))
}
