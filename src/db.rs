// src/db.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        person::{AlertStatus, NewPerson, Person},
        role::Role,
        transaction::{ConfirmationUpdate, Transaction},
    },
};

pub mod memory_repo;
pub use memory_repo::InMemoryPersonRepository;
pub mod person_repo;
pub use person_repo::PgPersonRepository;

/// O diretório de pessoas e o armazenamento das transferências.
///
/// Tudo é endereçado por chave (id da pessoa). Os serviços recebem um
/// `Arc<dyn PersonStore>`, então o backend (memória ou Postgres) é decidido na
/// montagem do `AppState`.
#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Person>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Person>, AppError>;

    async fn list(&self) -> Result<Vec<Person>, AppError>;

    /// Falha com `EmailAlreadyExists` se o e-mail já estiver cadastrado.
    async fn insert(&self, new_person: NewPerson) -> Result<Person, AppError>;

    /// Retorna `false` quando a pessoa não existia. Pessoas gerenciadas por ela
    /// ficam sem gerente.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn update_alert(&self, id: Uuid, status: AlertStatus) -> Result<Option<Person>, AppError>;

    async fn update_report(
        &self,
        id: Uuid,
        status: &str,
        location: &str,
    ) -> Result<Option<Person>, AppError>;

    async fn replace_roles(&self, id: Uuid, roles: Vec<Role>) -> Result<Option<Person>, AppError>;

    /// Substitui qualquer transferência anterior da pessoa.
    async fn create_transaction(
        &self,
        person_id: Uuid,
        transaction: Transaction,
    ) -> Result<Option<Transaction>, AppError>;

    /// Confirma um lado da transferência de forma atômica.
    ///
    /// Só aplica se a transferência ainda for `update.transaction_id`, estiver
    /// pendente e na versão `update.expected_version`; caso contrário devolve
    /// `ConcurrentModification`. Quando os dois lados ficam confirmados a
    /// transferência é resolvida e o site da pessoa passa a ser o destino.
    async fn apply_confirmation(
        &self,
        person_id: Uuid,
        update: ConfirmationUpdate,
    ) -> Result<Person, AppError>;
}
