// src/handlers/coins.rs

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
        rbac::{PermCoinsManage, RequirePermission},
    },
    models::coins::{
        AdjustCoinsPayload, CoinBalance, CreditLedgerEntry, CreditRule, LeaderboardEntry, LeaderboardParams,
        UpsertRulePayload,
    },
};

// --- EXTRATO E SALDO ---

#[utoipa::path(
    get,
    path = "/api/v1/coins/ledger",
    tag = "Coins",
    params(PageParams),
    responses(
        (status = 200, description = "Meu extrato de moedas", body = Paginated<CreditLedgerEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_ledger(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let ledger = app_state
        .coin_service
        .ledger(member.id, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ledger)))
}

#[utoipa::path(
    get,
    path = "/api/v1/coins/members/{id}/ledger",
    tag = "Coins",
    params(("id" = Uuid, Path, description = "ID do membro"), PageParams),
    responses(
        (status = 200, description = "Extrato do membro", body = Paginated<CreditLedgerEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn member_ledger(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCoinsManage>,
    Path(member_id): Path<Uuid>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let ledger = app_state
        .coin_service
        .ledger(member_id, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ledger)))
}

#[utoipa::path(
    get,
    path = "/api/v1/coins/balance",
    tag = "Coins",
    responses(
        (status = 200, description = "Meu saldo", body = CoinBalance)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_balance(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let balance = app_state
        .coin_service
        .balance(member.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(balance)))
}

#[utoipa::path(
    get,
    path = "/api/v1/coins/leaderboard",
    tag = "Coins",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Ranking de membros ativos por saldo", body = Vec<LeaderboardEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn leaderboard(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .coin_service
        .leaderboard(params.limit)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

// POST /api/v1/coins/adjust
// Lançamento manual; o saldo nunca fica negativo.
#[utoipa::path(
    post,
    path = "/api/v1/coins/adjust",
    tag = "Coins",
    request_body = AdjustCoinsPayload,
    responses(
        (status = 201, description = "Ajuste lançado", body = CreditLedgerEntry),
        (status = 400, description = "Saldo ficaria negativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(admin): AuthenticatedUser,
    _guard: RequirePermission<PermCoinsManage>,
    Json(payload): Json<AdjustCoinsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let entry = app_state
        .coin_service
        .adjust(admin.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// --- REGRAS ---

#[utoipa::path(
    get,
    path = "/api/v1/coins/rules",
    tag = "Coins",
    responses(
        (status = 200, description = "Regras de premiação", body = Vec<CreditRule>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_rules(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state
        .coin_service
        .list_rules()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rules)))
}

#[utoipa::path(
    put,
    path = "/api/v1/coins/rules",
    tag = "Coins",
    request_body = UpsertRulePayload,
    responses(
        (status = 200, description = "Regra criada ou atualizada pela chave", body = CreditRule)
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_rule(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCoinsManage>,
    Json(payload): Json<UpsertRulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let rule = app_state
        .coin_service
        .upsert_rule(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rule)))
}
