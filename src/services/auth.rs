// src/services/auth.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PersonStore,
    models::{auth::Claims, person::Person},
};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn PersonStore>,
    jwt_secret: String,
    token_ttl_days: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn PersonStore>, jwt_secret: String, token_ttl_days: i64) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl_days,
        }
    }

    /// Identifica a pessoa pelo e-mail e emite o token.
    pub async fn identify(&self, email: &str) -> Result<String, AppError> {
        let person = self
            .store
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::PersonNotFound)?;

        tracing::info!(person_id = %person.id, "Pessoa identificada");
        self.create_token(person.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Person, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.store
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::PersonNotFound)
    }

    pub fn create_token(&self, person_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = Duration::try_days(self.token_ttl_days)
            .filter(|ttl| *ttl > Duration::zero())
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                anyhow::anyhow!("Validade de token fora do intervalo: {} dias", self.token_ttl_days)
            })?;

        let claims = Claims {
            sub: person_id,
            exp: unix_seconds(expires_at.timestamp())?,
            iat: unix_seconds(now.timestamp())?,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

fn unix_seconds(timestamp: i64) -> Result<usize, AppError> {
    usize::try_from(timestamp)
        .map_err(|_| anyhow::anyhow!("Timestamp anterior a 1970: {timestamp}").into())
}
