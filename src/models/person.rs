// src/models/person.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::role::{Role, RoleKind, RoleSet};
use crate::models::transaction::Transaction;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "alert_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    Good,
    Bad,
}

// Referência ao gerente direto (o "personnel manager" desta pessoa)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerRef {
    pub id: Uuid,
    #[schema(example = "Jane Doe")]
    pub name: String,
}

// ---
// Person (a pessoa rastreada e, ao mesmo tempo, o usuário do sistema)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "mbt")]
    pub site: String,
    pub manager: Option<ManagerRef>,
    pub alert_status: AlertStatus,
    #[schema(example = "home")]
    pub report_status: String,
    #[schema(example = "jerusalem")]
    pub location: String,
    pub updated_at: DateTime<Utc>,
    pub transaction: Option<Transaction>,
    #[schema(value_type = Vec<Object>)]
    pub roles: Vec<Role>,
}

impl Person {
    pub fn is_managed_by(&self, user_id: Uuid) -> bool {
        self.manager.as_ref().is_some_and(|m| m.id == user_id)
    }

    pub fn holds(&self, kind: RoleKind) -> bool {
        self.roles.holds(kind)
    }
}

// O que o repositório precisa para inserir uma pessoa nova
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub email: String,
    pub name: String,
    pub site: String,
    pub manager_id: Option<Uuid>,
    pub roles: Vec<Role>,
}

// Resumo usado pelo formulário de "adicionar pessoa"
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerSummary {
    pub user_id: Uuid,
    pub name: String,
    pub site: String,
}

impl From<&Person> for ManagerSummary {
    fn from(person: &Person) -> Self {
        Self {
            user_id: person.id,
            name: person.name.clone(),
            site: person.site.clone(),
        }
    }
}

// ---
// Validação Customizada
// ---
pub(crate) fn validate_roles(roles: &[Role]) -> Result<(), ValidationError> {
    if roles.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Pelo menos um cargo deve ser selecionado.".into());
        return Err(err);
    }

    let empty_site_manager = roles
        .iter()
        .filter_map(Role::sites)
        .any(|sites| sites.is_empty() || sites.iter().any(|s| s.trim().is_empty()));

    if empty_site_manager {
        let mut err = ValidationError::new("siteManagerSites");
        err.message = Some("O gerente de site precisa de pelo menos um site.".into());
        return Err(err);
    }

    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "john@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "John Doe")]
    pub name: String,

    #[validate(length(min = 1, message = "O site é obrigatório."))]
    #[schema(example = "mbt")]
    pub site: String,

    pub manager: Option<Uuid>,

    #[validate(custom(function = "validate_roles"))]
    #[schema(value_type = Vec<Object>)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolesPayload {
    #[validate(custom(function = "validate_roles"))]
    #[schema(value_type = Vec<Object>)]
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub status: AlertStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    #[validate(length(min = 1, message = "O status é obrigatório."))]
    #[schema(example = "home")]
    pub status: String,

    // Só é usado quando o site da pessoa é "other"
    #[serde(default)]
    #[schema(example = "jerusalem")]
    pub location: Option<String>,
}
