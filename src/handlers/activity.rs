// src/handlers/activity.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::activity::{
        Communication, CreateCommunicationPayload, CreateNotePayload, CreateTaskPayload, EntityRef, Note, Task,
        TaskFilter, TaskStatusPayload, UpdateNotePayload, UpdateTaskPayload,
    },
};

// =============================================================================
//  1. NOTAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/notes",
    tag = "Activity",
    request_body = CreateNotePayload,
    responses(
        (status = 201, description = "Nota criada", body = Note),
        (status = 404, description = "Entidade não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_note(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    Json(payload): Json<CreateNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let note = app_state
        .activity_service
        .create_note(&app_state.db_pool, &member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(note)))
}

// Fixadas primeiro, depois as mais recentes
#[utoipa::path(
    get,
    path = "/api/v1/notes",
    tag = "Activity",
    params(EntityRef),
    responses(
        (status = 200, description = "Notas da entidade", body = Vec<Note>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notes(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(entity): Query<EntityRef>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = app_state
        .activity_service
        .list_notes(&app_state.db_pool, &entity)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(notes)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/notes/{id}",
    tag = "Activity",
    request_body = UpdateNotePayload,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota atualizada", body = Note),
        (status = 403, description = "Apenas o autor ou um administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_note(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let note = app_state
        .activity_service
        .update_note(&app_state.db_pool, &member, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(note)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notes/{id}",
    tag = "Activity",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 204, description = "Nota removida"),
        (status = 403, description = "Apenas o autor ou um administrador")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_note(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .activity_service
        .delete_note(&app_state.db_pool, &member, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. COMUNICAÇÕES
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/communications",
    tag = "Activity",
    request_body = CreateCommunicationPayload,
    responses(
        (status = 201, description = "Contato registrado", body = Communication)
    ),
    security(("api_jwt" = []))
)]
pub async fn log_communication(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    Json(payload): Json<CreateCommunicationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let communication = app_state
        .activity_service
        .log_communication(&app_state.db_pool, &member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(communication)))
}

#[utoipa::path(
    get,
    path = "/api/v1/communications",
    tag = "Activity",
    params(EntityRef),
    responses(
        (status = 200, description = "Histórico de contatos da entidade", body = Vec<Communication>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_communications(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(entity): Query<EntityRef>,
) -> Result<impl IntoResponse, ApiError> {
    let communications = app_state
        .activity_service
        .list_communications(&app_state.db_pool, &entity)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(communications)))
}

// =============================================================================
//  3. TAREFAS
// =============================================================================

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    tag = "Activity",
    request_body = CreateTaskPayload,
    responses(
        (status = 201, description = "Tarefa criada", body = Task)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .activity_service
        .create_task(&app_state.db_pool, &member, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    tag = "Activity",
    params(TaskFilter, PageParams),
    responses(
        (status = 200, description = "Tarefas", body = Paginated<Task>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<TaskFilter>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let tasks = app_state
        .activity_service
        .list_tasks(&app_state.db_pool, &filter, &page)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tasks)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "Activity",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa", body = Task),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_task(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let task = app_state
        .activity_service
        .get_task(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(task)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    tag = "Activity",
    request_body = UpdateTaskPayload,
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Tarefa atualizada", body = Task)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(member): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let task = app_state
        .activity_service
        .update_task(&app_state.db_pool, &member, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(task)))
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/status",
    tag = "Activity",
    request_body = TaskStatusPayload,
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 200, description = "Status alterado", body = Task),
        (status = 400, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_task_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let task = app_state
        .activity_service
        .change_task_status(&app_state.db_pool, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(task)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "Activity",
    params(("id" = Uuid, Path, description = "ID da tarefa")),
    responses(
        (status = 204, description = "Tarefa removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .activity_service
        .delete_task(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
