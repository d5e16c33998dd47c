// src/models/transaction.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Sentinela para um site fora do conjunto administrado.
pub const OTHER_SITE: &str = "other";

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Resolved,
}

// Um dos dois lados da transferência. Cada lado é confirmado de forma independente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Leg {
    Origin,
    Target,
}

impl Leg {
    pub fn as_str(self) -> &'static str {
        match self {
            Leg::Origin => "origin",
            Leg::Target => "target",
        }
    }
}

// Transferência de uma pessoa de `origin` para `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    #[schema(example = "mbt")]
    pub origin: String,
    #[schema(example = "kir")]
    pub target: String,
    pub origin_confirmation: bool,
    pub target_confirmation: bool,
    pub status: TransactionStatus,
    pub requested_by: Option<Uuid>,
    // Contador de concorrência otimista. Incrementa a cada confirmação.
    #[schema(example = 0)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(origin: String, target: String, requested_by: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            target,
            origin_confirmation: false,
            target_confirmation: false,
            status: TransactionStatus::Pending,
            requested_by,
            version: 0,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn site(&self, leg: Leg) -> &str {
        match leg {
            Leg::Origin => &self.origin,
            Leg::Target => &self.target,
        }
    }

    pub fn is_confirmed(&self, leg: Leg) -> bool {
        match leg {
            Leg::Origin => self.origin_confirmation,
            Leg::Target => self.target_confirmation,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Regra de resolução: os dois lados precisam confirmar.
    pub fn settles_with(&self, leg: Leg) -> bool {
        match leg {
            Leg::Origin => self.target_confirmation,
            Leg::Target => self.origin_confirmation,
        }
    }

    /// Aplica a confirmação em memória. Quem chama já validou a transição.
    pub fn confirm(&mut self, leg: Leg, now: DateTime<Utc>) {
        let resolves = self.settles_with(leg);
        match leg {
            Leg::Origin => self.origin_confirmation = true,
            Leg::Target => self.target_confirmation = true,
        }
        if resolves {
            self.status = TransactionStatus::Resolved;
            self.resolved_at = Some(now);
        }
        self.version += 1;
    }
}

// O que o serviço pede ao repositório: "confirme este lado se ninguém mexeu antes".
#[derive(Debug, Clone)]
pub struct ConfirmationUpdate {
    pub transaction_id: Uuid,
    pub expected_version: i64,
    pub leg: Leg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_confirmation_keeps_the_transaction_pending() {
        let mut tx = Transaction::new("mbt".into(), "kir".into(), None);
        tx.confirm(Leg::Origin, Utc::now());

        assert!(tx.origin_confirmation);
        assert!(!tx.target_confirmation);
        assert!(tx.is_pending());
        assert_eq!(tx.version, 1);
    }

    #[test]
    fn second_leg_resolves() {
        let mut tx = Transaction::new("mbt".into(), "kir".into(), None);
        tx.confirm(Leg::Target, Utc::now());
        tx.confirm(Leg::Origin, Utc::now());

        assert_eq!(tx.status, TransactionStatus::Resolved);
        assert!(tx.resolved_at.is_some());
        assert_eq!(tx.version, 2);
    }
}
