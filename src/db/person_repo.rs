// src/db/person_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::PersonStore;
use crate::{
    common::error::AppError,
    models::{
        person::{AlertStatus, ManagerRef, NewPerson, Person},
        role::Role,
        transaction::{ConfirmationUpdate, Leg, Transaction, TransactionStatus},
    },
};

// Pessoa + nome do gerente + transferência (se houver), numa única consulta
const PERSON_SELECT: &str = r#"
    SELECT
        p.id, p.email, p.name, p.site, p.manager_id,
        m.name AS manager_name,
        p.alert_status, p.report_status, p.location, p.roles, p.updated_at,
        t.id AS tx_id, t.origin AS tx_origin, t.target AS tx_target,
        t.origin_confirmation AS tx_origin_confirmation,
        t.target_confirmation AS tx_target_confirmation,
        t.status AS tx_status, t.requested_by AS tx_requested_by,
        t.version AS tx_version, t.created_at AS tx_created_at,
        t.resolved_at AS tx_resolved_at
    FROM persons p
    LEFT JOIN persons m ON m.id = p.manager_id
    LEFT JOIN move_transactions t ON t.person_id = p.id
"#;

#[derive(Debug, FromRow)]
struct PersonRow {
    id: Uuid,
    email: String,
    name: String,
    site: String,
    manager_id: Option<Uuid>,
    manager_name: Option<String>,
    alert_status: AlertStatus,
    report_status: String,
    location: String,
    roles: Json<Vec<Role>>,
    updated_at: DateTime<Utc>,
    tx_id: Option<Uuid>,
    tx_origin: Option<String>,
    tx_target: Option<String>,
    tx_origin_confirmation: Option<bool>,
    tx_target_confirmation: Option<bool>,
    tx_status: Option<TransactionStatus>,
    tx_requested_by: Option<Uuid>,
    tx_version: Option<i64>,
    tx_created_at: Option<DateTime<Utc>>,
    tx_resolved_at: Option<DateTime<Utc>>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        let transaction = match (row.tx_id, row.tx_origin, row.tx_target, row.tx_status, row.tx_created_at) {
            (Some(id), Some(origin), Some(target), Some(status), Some(created_at)) => Some(Transaction {
                id,
                origin,
                target,
                origin_confirmation: row.tx_origin_confirmation.unwrap_or(false),
                target_confirmation: row.tx_target_confirmation.unwrap_or(false),
                status,
                requested_by: row.tx_requested_by,
                version: row.tx_version.unwrap_or(0),
                created_at,
                resolved_at: row.tx_resolved_at,
            }),
            _ => None,
        };

        Person {
            id: row.id,
            email: row.email,
            name: row.name,
            site: row.site,
            manager: row.manager_id.map(|id| ManagerRef {
                id,
                name: row.manager_name.unwrap_or_default(),
            }),
            alert_status: row.alert_status,
            report_status: row.report_status,
            location: row.location,
            updated_at: row.updated_at,
            transaction,
            roles: row.roles.0,
        }
    }
}

#[derive(Debug, FromRow)]
struct ConfirmedRow {
    status: TransactionStatus,
    target: String,
}

// O repositório de pessoas sobre Postgres
#[derive(Clone)]
pub struct PgPersonRepository {
    pool: PgPool,
}

impl PgPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonStore for PgPersonRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, AppError> {
        let row = sqlx::query_as::<_, PersonRow>(&format!("{PERSON_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Person::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Person>, AppError> {
        let row = sqlx::query_as::<_, PersonRow>(&format!(
            "{PERSON_SELECT} WHERE lower(p.email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Person::from))
    }

    async fn list(&self) -> Result<Vec<Person>, AppError> {
        let rows = sqlx::query_as::<_, PersonRow>(&format!("{PERSON_SELECT} ORDER BY p.name, p.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Person::from).collect())
    }

    async fn insert(&self, new_person: NewPerson) -> Result<Person, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO persons (email, name, site, location, manager_id, roles)
            VALUES ($1, $2, $3, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&new_person.email)
        .bind(&new_person.name)
        .bind(&new_person.site)
        .bind(new_person.manager_id)
        .bind(Json(&new_person.roles))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })?;

        self.find_by_id(id).await?.ok_or(AppError::PersonNotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        // manager_id tem ON DELETE SET NULL e a transferência ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_alert(&self, id: Uuid, status: AlertStatus) -> Result<Option<Person>, AppError> {
        let result = sqlx::query(
            "UPDATE persons SET alert_status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn update_report(
        &self,
        id: Uuid,
        status: &str,
        location: &str,
    ) -> Result<Option<Person>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE persons
            SET report_status = $2, location = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(location)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn replace_roles(&self, id: Uuid, roles: Vec<Role>) -> Result<Option<Person>, AppError> {
        let result = sqlx::query("UPDATE persons SET roles = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(&roles))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn create_transaction(
        &self,
        person_id: Uuid,
        transaction: Transaction,
    ) -> Result<Option<Transaction>, AppError> {
        // Upsert por pessoa: a transferência nova toma o lugar da anterior
        let result = sqlx::query(
            r#"
            INSERT INTO move_transactions (
                id, person_id, origin, target,
                origin_confirmation, target_confirmation,
                status, requested_by, version, created_at, resolved_at
            )
            SELECT $1, p.id, $3, $4, $5, $6, $7, $8, $9, $10, $11
            FROM persons p WHERE p.id = $2
            ON CONFLICT (person_id) DO UPDATE SET
                id = EXCLUDED.id,
                origin = EXCLUDED.origin,
                target = EXCLUDED.target,
                origin_confirmation = EXCLUDED.origin_confirmation,
                target_confirmation = EXCLUDED.target_confirmation,
                status = EXCLUDED.status,
                requested_by = EXCLUDED.requested_by,
                version = EXCLUDED.version,
                created_at = EXCLUDED.created_at,
                resolved_at = EXCLUDED.resolved_at
            "#,
        )
        .bind(transaction.id)
        .bind(person_id)
        .bind(&transaction.origin)
        .bind(&transaction.target)
        .bind(transaction.origin_confirmation)
        .bind(transaction.target_confirmation)
        .bind(transaction.status)
        .bind(transaction.requested_by)
        .bind(transaction.version)
        .bind(transaction.created_at)
        .bind(transaction.resolved_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(transaction))
    }

    async fn apply_confirmation(
        &self,
        person_id: Uuid,
        update: ConfirmationUpdate,
    ) -> Result<Person, AppError> {
        let (origin, target) = match update.leg {
            Leg::Origin => (true, false),
            Leg::Target => (false, true),
        };

        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Confirma o lado, só se a versão for a esperada.
        //    No SET as colunas à direita são os valores antigos da linha.
        let confirmed = sqlx::query_as::<_, ConfirmedRow>(
            r#"
            UPDATE move_transactions
            SET
                origin_confirmation = origin_confirmation OR $4,
                target_confirmation = target_confirmation OR $5,
                status = CASE
                    WHEN (origin_confirmation OR $4) AND (target_confirmation OR $5)
                    THEN 'resolved'::transaction_status
                    ELSE status
                END,
                resolved_at = CASE
                    WHEN (origin_confirmation OR $4) AND (target_confirmation OR $5)
                    THEN now()
                    ELSE resolved_at
                END,
                version = version + 1
            WHERE id = $1
              AND person_id = $2
              AND version = $3
              AND status = 'pending'
            RETURNING status, target
            "#,
        )
        .bind(update.transaction_id)
        .bind(person_id)
        .bind(update.expected_version)
        .bind(origin)
        .bind(target)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::ConcurrentModification)?;

        // 3. Resolvida: a pessoa passa a estar no destino
        if confirmed.status == TransactionStatus::Resolved {
            sqlx::query("UPDATE persons SET site = $2, updated_at = now() WHERE id = $1")
                .bind(person_id)
                .bind(&confirmed.target)
                .execute(&mut *tx)
                .await?;
        }

        // 4. Commit
        tx.commit().await?;

        self.find_by_id(person_id).await?.ok_or(AppError::PersonNotFound)
    }
}
