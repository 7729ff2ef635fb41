// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
};

// GET /api/v1/listings/{id}/brochure
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}/brochure",
    tag = "Listings",
    params(("id" = Uuid, Path, description = "ID do anúncio")),
    responses(
        (status = 200, description = "Folheto em PDF", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Anúncio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn listing_brochure(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(listing_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pdf_bytes = app_state
        .document_service
        .listing_brochure(&app_state.db_pool, listing_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    // inline: o navegador mostra o PDF em vez de baixar
    let disposition = format!("inline; filename=\"anuncio_{}.pdf\"", listing_id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (header::CONTENT_DISPOSITION, disposition.as_str()),
    ];

    Ok((headers, pdf_bytes).into_response())
}
