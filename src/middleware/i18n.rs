// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Idiomas que o I18nStore conhece, em ordem de preferência do servidor
const SUPPORTED_LANGS: &[&str] = &["en", "pt"];

// Extrator de idioma: "pt-BR,pt;q=0.9" -> "pt"
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(SUPPORTED_LANGS[0].to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                // Reduz cada tag ao idioma base antes de cruzar com os suportados
                accept_language::parse(header_str)
                    .into_iter()
                    .map(|tag| tag.split('-').next().unwrap_or(&tag).to_lowercase())
                    .find(|base| SUPPORTED_LANGS.contains(&base.as_str()))
            });

        Ok(lang.map(Locale).unwrap_or_default())
    }
}
