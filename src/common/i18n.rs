// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invalid_token", "Invalid or missing authentication token."),
    ("person_not_found", "Person not found."),
    ("permission_denied", "You do not have permission to perform this action."),
    ("no_active_transaction", "There is no pending move for this person."),
    ("invalid_transition", "This move can no longer be changed that way."),
    ("concurrent_modification", "The move was changed by someone else. Please try again."),
    ("location_required", "A location is required when the site is 'other'."),
    ("internal_error", "An unexpected error occurred."),
];

const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("email_already_exists", "Este e-mail já está em uso."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("person_not_found", "Pessoa não encontrada."),
    ("permission_denied", "Você não tem permissão para realizar esta ação."),
    ("no_active_transaction", "Não há transferência pendente para esta pessoa."),
    ("invalid_transition", "Esta transferência não pode mais ser alterada assim."),
    ("concurrent_modification", "A transferência foi alterada por outra pessoa. Tente novamente."),
    ("location_required", "A localização é obrigatória quando o site é 'other'."),
    ("internal_error", "Ocorreu um erro inesperado."),
];

// Tabelas de mensagens por idioma. Idioma desconhecido cai no inglês.
#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        let mut messages = HashMap::new();
        messages.insert("en", EN.iter().copied().collect());
        messages.insert("pt", PT.iter().copied().collect());
        Self { messages }
    }
}

impl I18nStore {
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|table| table.get(key))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|table| table.get(key)))
            .map(|m| m.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
