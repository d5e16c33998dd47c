// src/db/memory_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::PersonStore;
use crate::{
    common::error::AppError,
    models::{
        person::{AlertStatus, ManagerRef, NewPerson, Person},
        role::Role,
        transaction::{ConfirmationUpdate, Transaction},
    },
};

// O que fica guardado. O nome do gerente é resolvido na leitura.
#[derive(Debug, Clone)]
struct PersonRecord {
    id: Uuid,
    email: String,
    name: String,
    site: String,
    manager_id: Option<Uuid>,
    alert_status: AlertStatus,
    report_status: String,
    location: String,
    updated_at: DateTime<Utc>,
    transaction: Option<Transaction>,
    roles: Vec<Role>,
}

/// Repositório em memória. Um único `RwLock` serializa as escritas, então cada
/// operação lê-decide-escreve sem intercalação.
#[derive(Debug, Default)]
pub struct InMemoryPersonRepository {
    records: RwLock<HashMap<Uuid, PersonRecord>>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_person(records: &HashMap<Uuid, PersonRecord>, record: &PersonRecord) -> Person {
    let manager = record.manager_id.map(|manager_id| ManagerRef {
        id: manager_id,
        name: records
            .get(&manager_id)
            .map(|m| m.name.clone())
            .unwrap_or_default(),
    });

    Person {
        id: record.id,
        email: record.email.clone(),
        name: record.name.clone(),
        site: record.site.clone(),
        manager,
        alert_status: record.alert_status,
        report_status: record.report_status.clone(),
        location: record.location.clone(),
        updated_at: record.updated_at,
        transaction: record.transaction.clone(),
        roles: record.roles.clone(),
    }
}

impl InMemoryPersonRepository {
    // Aplica `f` no registro e devolve a pessoa atualizada (None se não existe)
    async fn modify<F>(&self, id: Uuid, f: F) -> Option<Person>
    where
        F: FnOnce(&mut PersonRecord),
    {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id)?;
        f(record);
        let snapshot = record.clone();
        Some(to_person(&records, &snapshot))
    }
}

#[async_trait]
impl PersonStore for InMemoryPersonRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, AppError> {
        let records = self.records.read().await;
        Ok(records.get(&id).map(|r| to_person(&records, r)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Person>, AppError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.email.eq_ignore_ascii_case(email))
            .map(|r| to_person(&records, r)))
    }

    async fn list(&self) -> Result<Vec<Person>, AppError> {
        let records = self.records.read().await;
        let mut people: Vec<Person> = records.values().map(|r| to_person(&records, r)).collect();
        people.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(people)
    }

    async fn insert(&self, new_person: NewPerson) -> Result<Person, AppError> {
        let mut records = self.records.write().await;

        if records
            .values()
            .any(|r| r.email.eq_ignore_ascii_case(&new_person.email))
        {
            return Err(AppError::EmailAlreadyExists);
        }

        let record = PersonRecord {
            id: Uuid::new_v4(),
            email: new_person.email,
            location: new_person.site.clone(),
            name: new_person.name,
            site: new_person.site,
            manager_id: new_person.manager_id,
            alert_status: AlertStatus::Pending,
            report_status: String::new(),
            updated_at: Utc::now(),
            transaction: None,
            roles: new_person.roles,
        };
        let person = to_person(&records, &record);
        records.insert(record.id, record);
        Ok(person)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        if records.remove(&id).is_none() {
            return Ok(false);
        }
        for record in records.values_mut() {
            if record.manager_id == Some(id) {
                record.manager_id = None;
            }
        }
        Ok(true)
    }

    async fn update_alert(&self, id: Uuid, status: AlertStatus) -> Result<Option<Person>, AppError> {
        Ok(self
            .modify(id, |r| {
                r.alert_status = status;
                r.updated_at = Utc::now();
            })
            .await)
    }

    async fn update_report(
        &self,
        id: Uuid,
        status: &str,
        location: &str,
    ) -> Result<Option<Person>, AppError> {
        Ok(self
            .modify(id, |r| {
                r.report_status = status.to_string();
                r.location = location.to_string();
                r.updated_at = Utc::now();
            })
            .await)
    }

    async fn replace_roles(&self, id: Uuid, roles: Vec<Role>) -> Result<Option<Person>, AppError> {
        Ok(self.modify(id, |r| r.roles = roles).await)
    }

    async fn create_transaction(
        &self,
        person_id: Uuid,
        transaction: Transaction,
    ) -> Result<Option<Transaction>, AppError> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&person_id) else {
            return Ok(None);
        };
        record.transaction = Some(transaction.clone());
        Ok(Some(transaction))
    }

    async fn apply_confirmation(
        &self,
        person_id: Uuid,
        update: ConfirmationUpdate,
    ) -> Result<Person, AppError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&person_id).ok_or(AppError::PersonNotFound)?;

        let transaction = record
            .transaction
            .as_mut()
            .filter(|tx| {
                tx.id == update.transaction_id
                    && tx.version == update.expected_version
                    && tx.is_pending()
            })
            .ok_or(AppError::ConcurrentModification)?;

        let now = Utc::now();
        transaction.confirm(update.leg, now);

        if !transaction.is_pending() {
            record.site = transaction.target.clone();
            record.updated_at = now;
        }

        let snapshot = record.clone();
        Ok(to_person(&records, &snapshot))
    }
}
