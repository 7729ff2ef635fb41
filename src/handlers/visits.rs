// src/handlers/visits.rs

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
        rbac::{PermToursManage, PermVisitsComplete, PermVisitsSchedule, RequirePermission},
    },
    models::visit::{
        AttachVisitPayload, CancelVisitPayload, CompleteVisitPayload, CreateTourPayload, RescheduleVisitPayload,
        ScheduleVisitPayload, TourDetail, TourFilter, TourStatusPayload, Visit, VisitFilter, VisitTour,
    },
};

// =============================================================================
//  1. VISITAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/visits",
    tag = "Visits",
    request_body = ScheduleVisitPayload,
    responses(
        (status = 201, description = "Visita agendada", body = Visit),
        (status = 409, description = "Horário ocupado ou anúncio indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn schedule_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    _guard: RequirePermission<PermVisitsSchedule>,
    Json(payload): Json<ScheduleVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let visit = app_state
        .visit_service
        .schedule(&member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(visit)))
}

#[utoipa::path(
    get,
    path = "/api/v1/visits",
    tag = "Visits",
    params(VisitFilter, PageParams),
    responses(
        (status = 200, description = "Visitas", body = Paginated<Visit>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_visits(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<VisitFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let visits = app_state
        .visit_service
        .list(&filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visits)))
}

#[utoipa::path(
    get,
    path = "/api/v1/visits/{id}",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita", body = Visit),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

// POST /api/v1/visits/{id}/confirm
// Gera o OTP e envia ao comprador.
#[utoipa::path(
    post,
    path = "/api/v1/visits/{id}/confirm",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita confirmada, OTP enviado", body = Visit),
        (status = 400, description = "Visita não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermVisitsSchedule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .confirm(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

#[utoipa::path(
    post,
    path = "/api/v1/visits/{id}/resend-otp",
    tag = "Visits",
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Novo OTP enviado", body = Visit)
    ),
    security(("api_jwt" = []))
)]
pub async fn resend_otp(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermVisitsSchedule>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .resend_otp(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

#[utoipa::path(
    post,
    path = "/api/v1/visits/{id}/reschedule",
    tag = "Visits",
    request_body = RescheduleVisitPayload,
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita reagendada (volta a pendente)", body = Visit),
        (status = 409, description = "Horário ocupado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reschedule_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermVisitsSchedule>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RescheduleVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let visit = app_state
        .visit_service
        .reschedule(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

#[utoipa::path(
    post,
    path = "/api/v1/visits/{id}/cancel",
    tag = "Visits",
    request_body = CancelVisitPayload,
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita cancelada", body = Visit)
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermVisitsSchedule>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let visit = app_state
        .visit_service
        .cancel(id, &payload.reason)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

// POST /api/v1/visits/{id}/complete
#[utoipa::path(
    post,
    path = "/api/v1/visits/{id}/complete",
    tag = "Visits",
    request_body = CompleteVisitPayload,
    params(("id" = Uuid, Path, description = "ID da visita")),
    responses(
        (status = 200, description = "Visita concluída", body = Visit),
        (status = 400, description = "OTP inválido ou expirado"),
        (status = 409, description = "Visita já concluída")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermVisitsComplete>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let visit = app_state
        .visit_service
        .complete(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

// =============================================================================
//  2. ROTEIROS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/tours",
    tag = "Tours",
    request_body = CreateTourPayload,
    responses(
        (status = 201, description = "Roteiro criado", body = VisitTour)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tour(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermToursManage>,
    Json(payload): Json<CreateTourPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tour = app_state
        .visit_service
        .create_tour(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tour)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tours",
    tag = "Tours",
    params(TourFilter),
    responses(
        (status = 200, description = "Roteiros", body = Vec<VisitTour>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tours(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<TourFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let tours = app_state
        .visit_service
        .list_tours(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tours)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tours/{id}",
    tag = "Tours",
    params(("id" = Uuid, Path, description = "ID do roteiro")),
    responses(
        (status = 200, description = "Roteiro com as visitas em ordem de horário", body = TourDetail),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tour(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .visit_service
        .tour_detail(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tours/{id}/visits",
    tag = "Tours",
    request_body = AttachVisitPayload,
    params(("id" = Uuid, Path, description = "ID do roteiro")),
    responses(
        (status = 200, description = "Visita incluída no roteiro", body = Visit),
        (status = 409, description = "Visita de outro lead ou já encerrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn attach_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermToursManage>,
    Path(tour_id): Path<Uuid>,
    Json(payload): Json<AttachVisitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .attach_visit(tour_id, payload.visit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tours/{id}/visits/{visit_id}",
    tag = "Tours",
    params(
        ("id" = Uuid, Path, description = "ID do roteiro"),
        ("visit_id" = Uuid, Path, description = "ID da visita")
    ),
    responses(
        (status = 200, description = "Visita retirada do roteiro", body = Visit)
    ),
    security(("api_jwt" = []))
)]
pub async fn detach_visit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermToursManage>,
    Path((tour_id, visit_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let visit = app_state
        .visit_service
        .detach_visit(tour_id, visit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(visit)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tours/{id}/status",
    tag = "Tours",
    request_body = TourStatusPayload,
    params(("id" = Uuid, Path, description = "ID do roteiro")),
    responses(
        (status = 200, description = "Status alterado", body = VisitTour),
        (status = 400, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_tour_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermToursManage>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TourStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let tour = app_state
        .visit_service
        .change_tour_status(id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tour)))
}
