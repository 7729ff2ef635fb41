// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::dashboard::RoleDashboard,
};

// GET /api/v1/dashboard
// O conteúdo depende do papel de quem chama (campo `role` na resposta).
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Painel do papel do usuário", body = RoleDashboard)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .for_member(&app_state.db_pool, &member)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::debug!(member_id = %member.id, role = dashboard.role().as_str(), "Painel montado");

    Ok((StatusCode::OK, Json(dashboard)))
}
