// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Identificação por e-mail (não há senha: o diretório de pessoas é a fonte de verdade)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IdentifyPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "john@example.com")]
    pub email: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID da pessoa)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
