// src/services/move_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PersonStore,
    models::{
        person::Person,
        transaction::{ConfirmationUpdate, Leg, Transaction},
    },
    services::authorizer::{MoveAuthority, MovePermissions},
};

// Conflitos de versão são re-avaliados do zero, no máximo esta quantidade de vezes
const MAX_CONFIRM_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct MoveService {
    store: Arc<dyn PersonStore>,
}

impl MoveService {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    async fn load(&self, person_id: Uuid) -> Result<Person, AppError> {
        self.store
            .find_by_id(person_id)
            .await?
            .ok_or(AppError::PersonNotFound)
    }

    /// Quais lados `actor` pode confirmar agora.
    pub async fn permissions(&self, actor: &Person, person_id: Uuid) -> Result<MovePermissions, AppError> {
        let person = self.load(person_id).await?;
        Ok(MovePermissions::for_actor(actor, &person))
    }

    /// Abre uma transferência nova (pendente), descartando a anterior.
    /// O site da pessoa só muda quando a transferência é resolvida.
    pub async fn request_move(
        &self,
        actor: &Person,
        person_id: Uuid,
        origin: Option<&str>,
        target: &str,
    ) -> Result<Transaction, AppError> {
        let person = self.load(person_id).await?;

        // Sem origem explícita, a origem é o site atual (o formulário já vem preenchido assim)
        let origin = origin
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .unwrap_or(person.site.as_str())
            .to_string();
        let target = target.trim().to_string();

        if origin.is_empty() || target.is_empty() {
            let mut errors = validator::ValidationErrors::new();
            let field = if target.is_empty() { "target" } else { "origin" };
            errors.add(field, validator::ValidationError::new("required"));
            return Err(AppError::ValidationError(errors));
        }

        let transaction = Transaction::new(origin, target, Some(actor.id));

        if let Some(previous) = person.transaction.as_ref().filter(|tx| tx.is_pending()) {
            tracing::info!(
                person_id = %person_id,
                previous_transaction = %previous.id,
                "Transferência pendente substituída"
            );
        }

        let created = self
            .store
            .create_transaction(person_id, transaction)
            .await?
            .ok_or(AppError::PersonNotFound)?;

        tracing::info!(
            person_id = %person_id,
            transaction_id = %created.id,
            origin = %created.origin,
            target = %created.target,
            requested_by = %actor.id,
            "🚚 Transferência solicitada"
        );

        Ok(created)
    }

    /// Confirma um lado. Lê, decide e escreve com a versão lida; se outra
    /// requisição escreveu no meio, relê e decide de novo.
    pub async fn confirm_leg(&self, actor: &Person, person_id: Uuid, leg: Leg) -> Result<Person, AppError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let person = self.load(person_id).await?;

            let transaction = person
                .transaction
                .as_ref()
                .ok_or(AppError::NoActiveTransaction)?;

            if !transaction.is_pending() {
                return Err(AppError::InvalidTransition(
                    "transaction is already resolved".into(),
                ));
            }
            if transaction.is_confirmed(leg) {
                return Err(AppError::InvalidTransition(format!(
                    "{} leg is already confirmed",
                    leg.as_str()
                )));
            }

            let authority = MoveAuthority::evaluate(actor, &person, transaction);
            if !authority.can_confirm(transaction, leg) {
                tracing::warn!(
                    person_id = %person_id,
                    actor_id = %actor.id,
                    leg = leg.as_str(),
                    ?authority,
                    "Confirmação negada"
                );
                return Err(AppError::PermissionDenied);
            }

            let update = ConfirmationUpdate {
                transaction_id: transaction.id,
                expected_version: transaction.version,
                leg,
            };

            match self.store.apply_confirmation(person_id, update).await {
                Ok(updated) => {
                    let resolved = updated
                        .transaction
                        .as_ref()
                        .is_some_and(|tx| !tx.is_pending());
                    tracing::info!(
                        person_id = %person_id,
                        actor_id = %actor.id,
                        leg = leg.as_str(),
                        resolved,
                        "✅ Lado da transferência confirmado"
                    );
                    return Ok(updated);
                }
                Err(AppError::ConcurrentModification) if attempt < MAX_CONFIRM_ATTEMPTS => {
                    tracing::debug!(person_id = %person_id, attempt, "Conflito de versão, reavaliando");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::InMemoryPersonRepository,
        models::{
            person::NewPerson,
            role::Role,
            transaction::TransactionStatus,
        },
    };

    struct Fixture {
        service: MoveService,
        store: Arc<dyn PersonStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let store: Arc<dyn PersonStore> = Arc::new(InMemoryPersonRepository::new());
            Self { service: MoveService::new(store.clone()), store }
        }

        async fn add(&self, email: &str, site: &str, manager: Option<Uuid>, roles: Vec<Role>) -> Person {
            self.store
                .insert(NewPerson {
                    email: email.into(),
                    name: email.into(),
                    site: site.into(),
                    manager_id: manager,
                    roles,
                })
                .await
                .unwrap()
        }
    }

    fn sites(list: &[&str]) -> Role {
        Role::SiteManager(list.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn second_request_replaces_the_first() {
        let f = Fixture::new();
        let admin = f.add("admin@x.io", "mbt", None, vec![Role::Admin]).await;
        let p = f.add("p@x.io", "mbt", None, vec![]).await;

        let first = f.service.request_move(&admin, p.id, Some("mbt"), "kir").await.unwrap();
        let second = f.service.request_move(&admin, p.id, Some("kir"), "mbt").await.unwrap();

        let stored = f.store.find_by_id(p.id).await.unwrap().unwrap();
        let active = stored.transaction.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(active.id, second.id);
        assert_eq!((active.origin.as_str(), active.target.as_str()), ("kir", "mbt"));
        assert!(!active.origin_confirmation && !active.target_confirmation);
        // A solicitação não muda o site
        assert_eq!(stored.site, "mbt");
    }

    #[tokio::test]
    async fn origin_defaults_to_current_site() {
        let f = Fixture::new();
        let p = f.add("p@x.io", "mfs", None, vec![]).await;

        let tx = f.service.request_move(&p, p.id, None, " kir ").await.unwrap();
        assert_eq!(tx.origin, "mfs");
        assert_eq!(tx.target, "kir");
        assert_eq!(tx.requested_by, Some(p.id));
    }

    #[tokio::test]
    async fn blank_target_is_a_validation_error() {
        let f = Fixture::new();
        let p = f.add("p@x.io", "mfs", None, vec![]).await;

        let err = f.service.request_move(&p, p.id, None, "  ").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn origin_manager_scenario() {
        let f = Fixture::new();
        let u = f.add("u@x.io", "mbt", None, vec![sites(&["mbt"])]).await;
        let p = f.add("p@x.io", "mbt", None, vec![]).await;
        f.service.request_move(&u, p.id, Some("mbt"), "kir").await.unwrap();

        let perms = f.service.permissions(&u, p.id).await.unwrap();
        assert!(perms.origin);
        assert!(!perms.target);

        let updated = f.service.confirm_leg(&u, p.id, Leg::Origin).await.unwrap();
        let tx = updated.transaction.unwrap();
        assert!(tx.origin_confirmation);
        assert_eq!(tx.status, TransactionStatus::Pending);

        let again = f.service.confirm_leg(&u, p.id, Leg::Origin).await.unwrap_err();
        assert!(matches!(again, AppError::InvalidTransition(_)));

        let target = f.service.confirm_leg(&u, p.id, Leg::Target).await.unwrap_err();
        assert!(matches!(target, AppError::PermissionDenied));
    }

    #[tokio::test]
    async fn both_confirmations_resolve_and_move_the_person() {
        let f = Fixture::new();
        let origin_mgr = f.add("o@x.io", "mbt", None, vec![sites(&["mbt"])]).await;
        let target_mgr = f.add("t@x.io", "kir", None, vec![sites(&["kir"])]).await;
        let p = f.add("p@x.io", "mbt", None, vec![]).await;
        f.service.request_move(&origin_mgr, p.id, None, "kir").await.unwrap();

        f.service.confirm_leg(&target_mgr, p.id, Leg::Target).await.unwrap();
        let done = f.service.confirm_leg(&origin_mgr, p.id, Leg::Origin).await.unwrap();

        assert_eq!(done.site, "kir");
        let tx = done.transaction.unwrap();
        assert_eq!(tx.status, TransactionStatus::Resolved);
        assert!(tx.resolved_at.is_some());

        let err = f.service.confirm_leg(&origin_mgr, p.id, Leg::Origin).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn confirm_without_transaction() {
        let f = Fixture::new();
        let admin = f.add("admin@x.io", "mbt", None, vec![Role::Admin]).await;
        let p = f.add("p@x.io", "mbt", None, vec![]).await;

        let err = f.service.confirm_leg(&admin, p.id, Leg::Origin).await.unwrap_err();
        assert!(matches!(err, AppError::NoActiveTransaction));

        let err = f.service.confirm_leg(&admin, Uuid::new_v4(), Leg::Origin).await.unwrap_err();
        assert!(matches!(err, AppError::PersonNotFound));
    }

    #[tokio::test]
    async fn enforcement_agrees_with_permissions() {
        let f = Fixture::new();
        let boss = f.add("boss@x.io", "kir", None, vec![sites(&["other"])]).await;
        let hr = f.add("hr@x.io", "kir", None, vec![Role::HrManager]).await;
        let p = f.add("p@x.io", "other", Some(boss.id), vec![]).await;
        f.service.request_move(&hr, p.id, None, "kir").await.unwrap();

        for actor in [&boss, &hr] {
            for leg in [Leg::Origin, Leg::Target] {
                let allowed = {
                    let perms = f.service.permissions(actor, p.id).await.unwrap();
                    match leg {
                        Leg::Origin => perms.origin,
                        Leg::Target => perms.target,
                    }
                };
                if !allowed {
                    let err = f.service.confirm_leg(actor, p.id, leg).await.unwrap_err();
                    assert!(matches!(
                        err,
                        AppError::PermissionDenied | AppError::InvalidTransition(_)
                    ));
                }
            }
        }

        let stored = f.store.find_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(stored.site, "other");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_confirmations_of_one_leg_accept_exactly_one() {
        let f = Fixture::new();
        let admin = f.add("admin@x.io", "mbt", None, vec![Role::Admin]).await;
        let p = f.add("p@x.io", "mbt", None, vec![]).await;
        f.service.request_move(&admin, p.id, None, "kir").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = f.service.clone();
            let admin = admin.clone();
            let id = p.id;
            handles.push(tokio::spawn(async move {
                service.confirm_leg(&admin, id, Leg::Origin).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(AppError::InvalidTransition(_)) | Err(AppError::ConcurrentModification) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(accepted, 1);

        let tx = f.store.find_by_id(p.id).await.unwrap().unwrap().transaction.unwrap();
        assert_eq!(tx.version, 1);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }
}
