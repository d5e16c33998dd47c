// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::person::Person,
};

// O guardião das rotas protegidas: valida o Bearer e carrega a pessoa
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store));
    };

    let person = app_state
        .auth_service
        .validate_token(bearer.token())
        .await
        .map_err(|e| {
            // Token de alguém que já foi removido do diretório também é inválido
            let e = match e {
                AppError::PersonNotFound => AppError::InvalidToken,
                other => other,
            };
            e.to_api_error(&locale, &app_state.i18n_store)
        })?;

    // Insere a pessoa nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(person));
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Person);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError {
                status: axum::http::StatusCode::UNAUTHORIZED,
                error: "Invalid or missing authentication token.".into(),
                details: None,
            })
    }
}
