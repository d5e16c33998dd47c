// src/handlers/moves.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        person::Person,
        transaction::{Leg, Transaction},
    },
    services::authorizer::MovePermissions,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestMovePayload {
    // Sem origem, vale o site atual da pessoa
    #[schema(example = "mbt")]
    pub origin: Option<String>,

    #[validate(length(min = 1, message = "O destino é obrigatório."))]
    #[schema(example = "kir")]
    pub target: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmLegPayload {
    pub originator: Leg,

    // Confirmações não podem ser desfeitas; `false` é rejeitado
    #[serde(default = "confirmed")]
    #[schema(example = true)]
    pub status: bool,
}

fn confirmed() -> bool {
    true
}

// POST /api/users/{id}/move
#[utoipa::path(
    post,
    path = "/api/users/{id}/move",
    tag = "Moves",
    request_body = RequestMovePayload,
    responses(
        (status = 201, description = "Transferência pendente criada (substitui a anterior)", body = Transaction),
        (status = 404, description = "Pessoa não encontrada")
    ),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn request_move(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RequestMovePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let transaction = app_state
        .move_service
        .request_move(&user, id, payload.origin.as_deref(), &payload.target)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// PATCH /api/users/{id}/move
#[utoipa::path(
    patch,
    path = "/api/users/{id}/move",
    tag = "Moves",
    request_body = ConfirmLegPayload,
    responses(
        (status = 200, description = "Lado confirmado; resolvida quando os dois confirmam", body = Person),
        (status = 403, description = "Sem autoridade sobre este lado"),
        (status = 409, description = "Sem transferência pendente ou lado já confirmado")
    ),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn confirm_leg(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmLegPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if !payload.status {
        return Err(AppError::InvalidTransition("confirmations cannot be withdrawn".into())
            .to_api_error(&locale, &app_state.i18n_store));
    }

    let person: Person = app_state
        .move_service
        .confirm_leg(&user, id, payload.originator)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(person))
}

// GET /api/users/{id}/move/permissions
#[utoipa::path(
    get,
    path = "/api/users/{id}/move/permissions",
    tag = "Moves",
    responses((status = 200, description = "Quais lados o usuário pode confirmar", body = MovePermissions)),
    params(("id" = Uuid, Path, description = "ID da pessoa")),
    security(("api_jwt" = []))
)]
pub async fn move_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let permissions = app_state
        .move_service
        .permissions(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(permissions))
}
