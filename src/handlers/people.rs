// src/handlers/people.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        person::{
            AlertPayload, CreatePersonPayload, ManagerSummary, Person, ReportPayload,
            UpdateRolesPayload,
        },
        transaction::OTHER_SITE,
    },
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Todas as pessoas", body = [Person])),
    security(("api_jwt" = []))
)]
pub async fn list_people(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let people = app_state
        .person_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(people))
}

// GET /api/users/managers
#[utoipa::path(
    get,
    path = "/api/users/managers",
    tag = "Users",
    responses((status = 200, description = "Gerentes disponíveis", body = [ManagerSummary])),
    security(("api_jwt" = []))
)]
pub async fn list_managers(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let managers = app_state
        .person_service
        .list_managers()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(managers))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    responses(
        (status = 200, description = "A pessoa", body = Person),
        (status = 404, description = "Pessoa não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn get_person(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let person = app_state
        .person_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(person))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreatePersonPayload,
    responses(
        (status = 201, description = "Pessoa cadastrada", body = Person),
        (status = 403, description = "Sem cargo para cadastrar"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_person(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreatePersonPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let person = app_state
        .person_service
        .create(
            &user,
            &payload.email,
            &payload.name,
            &payload.site,
            payload.manager,
            payload.roles,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(person)))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    responses(
        (status = 204, description = "Pessoa removida"),
        (status = 403, description = "Apenas HR/admin"),
        (status = 404, description = "Pessoa não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn delete_person(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .person_service
        .delete(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/users/{id}/alert
#[utoipa::path(
    post,
    path = "/api/users/{id}/alert",
    tag = "Users",
    request_body = AlertPayload,
    responses(
        (status = 200, description = "Status de alerta atualizado", body = Person),
        (status = 403, description = "Sem relação com a pessoa")
    ),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn update_alert(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AlertPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let person = app_state
        .person_service
        .update_alert(&user, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(person))
}

// PUT /api/users/{id}/status
#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    tag = "Users",
    request_body = ReportPayload,
    responses(
        (status = 200, description = "Relato registrado", body = Person),
        (status = 400, description = "Localização obrigatória para o site 'other'")
    ),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn report_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReportPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let person = app_state
        .person_service
        .report(&user, id, &payload.status, payload.location.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(person))
}

// PUT /api/users/{id}/roles
#[utoipa::path(
    put,
    path = "/api/users/{id}/roles",
    tag = "Users",
    request_body = UpdateRolesPayload,
    responses(
        (status = 200, description = "Cargos atualizados", body = Person),
        (status = 403, description = "Sem permissão para estes cargos/sites")
    ),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn update_roles(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolesPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let person = app_state
        .person_service
        .update_roles(&user, id, payload.roles)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(person))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteOptions {
    // Sites que podem ter gerente de site
    pub managed: Vec<String>,
    // Tudo que a pessoa pode escolher, incluindo "other"
    pub all: Vec<String>,
}

// GET /api/sites
#[utoipa::path(
    get,
    path = "/api/sites",
    tag = "Users",
    responses((status = 200, description = "Opções de site", body = SiteOptions)),
    security(("api_jwt" = []))
)]
pub async fn list_sites(State(app_state): State<AppState>, _user: AuthenticatedUser) -> Json<SiteOptions> {
    let managed = app_state.config.managed_sites.clone();
    let mut all = managed.clone();
    if !all.iter().any(|s| s == OTHER_SITE) {
        all.push(OTHER_SITE.to_string());
    }
    Json(SiteOptions { managed, all })
}
