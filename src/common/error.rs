use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Pessoa não encontrada")]
    PersonNotFound,

    #[error("Permissão negada")]
    PermissionDenied,

    #[error("Nenhuma transferência pendente")]
    NoActiveTransaction,

    #[error("Transição inválida: {0}")]
    InvalidTransition(String),

    #[error("A transferência foi alterada por outra requisição")]
    ConcurrentModification,

    #[error("Localização obrigatória para o site 'other'")]
    LocationRequired,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Chave da mensagem no I18nStore.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidToken => "invalid_token",
            AppError::PersonNotFound => "person_not_found",
            AppError::PermissionDenied => "permission_denied",
            AppError::NoActiveTransaction => "no_active_transaction",
            AppError::InvalidTransition(_) => "invalid_transition",
            AppError::ConcurrentModification => "concurrent_modification",
            AppError::LocationRequired => "location_required",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::JwtError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::LocationRequired => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::PersonNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::NoActiveTransaction
            | AppError::InvalidTransition(_)
            | AppError::ConcurrentModification => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para a resposta HTTP, traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n_store: &I18nStore) -> ApiError {
        let status = self.status();
        let error = i18n_store.translate(&locale.0, self.code());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(json!(details))
            }
            AppError::InvalidTransition(reason) => Some(json!({ "reason": reason })),
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = ?e, "Erro Interno do Servidor: {}", e);
                None
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// O erro que de fato vai para o cliente
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}
