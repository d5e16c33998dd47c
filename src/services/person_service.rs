// src/services/person_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PersonStore,
    models::{
        person::{AlertStatus, ManagerSummary, NewPerson, Person},
        role::{Role, RoleKind},
        transaction::OTHER_SITE,
    },
    services::role_policy,
};

#[derive(Clone)]
pub struct PersonService {
    store: Arc<dyn PersonStore>,
}

impl PersonService {
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Person>, AppError> {
        self.store.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Person, AppError> {
        self.store.find_by_id(id).await?.ok_or(AppError::PersonNotFound)
    }

    /// Quem pode ser escolhido como gerente direto no cadastro.
    pub async fn list_managers(&self) -> Result<Vec<ManagerSummary>, AppError> {
        let people = self.store.list().await?;
        Ok(people
            .iter()
            .filter(|p| p.holds(RoleKind::PersonnelManager))
            .map(ManagerSummary::from)
            .collect())
    }

    pub async fn create(
        &self,
        actor: &Person,
        email: &str,
        name: &str,
        site: &str,
        manager_id: Option<Uuid>,
        roles: Vec<Role>,
    ) -> Result<Person, AppError> {
        role_policy::authorize_create(actor)?;

        // Gerente inexistente é erro do formulário, não da rota
        if let Some(manager_id) = manager_id {
            if self.store.find_by_id(manager_id).await?.is_none() {
                let mut err = validator::ValidationError::new("unknownManager");
                err.message = Some("O gerente informado não existe.".into());
                let mut errors = validator::ValidationErrors::new();
                errors.add("manager", err);
                return Err(AppError::ValidationError(errors));
            }
        }

        let person = self
            .store
            .insert(NewPerson {
                email: email.trim().to_lowercase(),
                name: name.trim().to_string(),
                site: site.trim().to_string(),
                manager_id,
                roles,
            })
            .await?;

        tracing::info!(person_id = %person.id, created_by = %actor.id, "👤 Pessoa cadastrada");
        Ok(person)
    }

    pub async fn delete(&self, actor: &Person, id: Uuid) -> Result<(), AppError> {
        role_policy::authorize_delete(actor)?;

        if !self.store.delete(id).await? {
            return Err(AppError::PersonNotFound);
        }

        tracing::info!(person_id = %id, deleted_by = %actor.id, "Pessoa removida");
        Ok(())
    }

    pub async fn update_alert(&self, actor: &Person, id: Uuid, status: AlertStatus) -> Result<Person, AppError> {
        let person = self.get(id).await?;
        if !role_policy::oversees(actor, &person) {
            return Err(AppError::PermissionDenied);
        }

        let updated = self
            .store
            .update_alert(id, status)
            .await?
            .ok_or(AppError::PersonNotFound)?;

        tracing::info!(person_id = %id, actor_id = %actor.id, ?status, "🚨 Status de alerta atualizado");
        Ok(updated)
    }

    /// Relato de status/localização. Fora do site "other" a localização é o próprio site.
    pub async fn report(
        &self,
        actor: &Person,
        id: Uuid,
        status: &str,
        location: Option<&str>,
    ) -> Result<Person, AppError> {
        let person = self.get(id).await?;
        if !role_policy::oversees(actor, &person) {
            return Err(AppError::PermissionDenied);
        }

        let location = if person.site == OTHER_SITE {
            location
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .ok_or(AppError::LocationRequired)?
                .to_string()
        } else {
            person.site.clone()
        };

        self.store
            .update_report(id, status.trim(), &location)
            .await?
            .ok_or(AppError::PersonNotFound)
    }

    pub async fn update_roles(&self, actor: &Person, id: Uuid, roles: Vec<Role>) -> Result<Person, AppError> {
        let person = self.get(id).await?;
        role_policy::authorize_role_change(actor, &person, &roles)?;

        let updated = self
            .store
            .replace_roles(id, roles)
            .await?
            .ok_or(AppError::PersonNotFound)?;

        tracing::info!(person_id = %id, actor_id = %actor.id, roles = ?updated.roles, "Cargos atualizados");
        Ok(updated)
    }

    /// Garante um primeiro admin para um diretório vazio (senão ninguém consegue entrar).
    pub async fn ensure_bootstrap_admin(&self, email: &str, name: &str, site: &str) -> Result<Person, AppError> {
        let email = email.trim().to_lowercase();
        if let Some(existing) = self.store.find_by_email(&email).await? {
            return Ok(existing);
        }

        let admin = self
            .store
            .insert(NewPerson {
                email,
                name: name.to_string(),
                site: site.to_string(),
                manager_id: None,
                roles: vec![Role::Admin],
            })
            .await?;

        tracing::info!(person_id = %admin.id, "🔑 Admin inicial criado");
        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryPersonRepository;

    async fn setup() -> (PersonService, Person) {
        let store: Arc<dyn PersonStore> = Arc::new(InMemoryPersonRepository::new());
        let service = PersonService::new(store);
        let admin = service
            .ensure_bootstrap_admin("Admin@Example.com", "Admin", "mbt")
            .await
            .unwrap();
        (service, admin)
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let (service, admin) = setup().await;
        let again = service
            .ensure_bootstrap_admin("admin@example.com", "Other", "kir")
            .await
            .unwrap();

        assert_eq!(admin.id, again.id);
        assert_eq!(admin.email, "admin@example.com");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn report_uses_site_unless_other() {
        let (service, admin) = setup().await;
        let p = service
            .create(&admin, "p@example.com", "P", "kir", None, vec![Role::PersonnelManager])
            .await
            .unwrap();

        let reported = service.report(&p, p.id, "home", Some("jerusalem")).await.unwrap();
        assert_eq!(reported.location, "kir");
        assert_eq!(reported.report_status, "home");

        let q = service
            .create(&admin, "q@example.com", "Q", "other", Some(p.id), vec![Role::PersonnelManager])
            .await
            .unwrap();
        let err = service.report(&p, q.id, "away", None).await.unwrap_err();
        assert!(matches!(err, AppError::LocationRequired));

        let reported = service.report(&p, q.id, "away", Some("haifa")).await.unwrap();
        assert_eq!(reported.location, "haifa");
    }

    #[tokio::test]
    async fn strangers_cannot_alert_or_report() {
        let (service, admin) = setup().await;
        let a = service
            .create(&admin, "a@example.com", "A", "kir", None, vec![Role::PersonnelManager])
            .await
            .unwrap();
        let b = service
            .create(&admin, "b@example.com", "B", "mbt", None, vec![Role::PersonnelManager])
            .await
            .unwrap();

        let err = service.update_alert(&a, b.id, AlertStatus::Bad).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));

        let alerted = service.update_alert(&admin, b.id, AlertStatus::Good).await.unwrap();
        assert_eq!(alerted.alert_status, AlertStatus::Good);
    }

    #[tokio::test]
    async fn managers_are_personnel_managers() {
        let (service, admin) = setup().await;
        service
            .create(&admin, "m@example.com", "M", "kir", None, vec![Role::PersonnelManager])
            .await
            .unwrap();
        service
            .create(&admin, "w@example.com", "W", "kir", None, vec![Role::HrManager])
            .await
            .unwrap();

        let managers = service.list_managers().await.unwrap();
        assert_eq!(managers.len(), 1);
        assert_eq!(managers[0].name, "M");
    }

    #[tokio::test]
    async fn unknown_manager_is_rejected() {
        let (service, admin) = setup().await;
        let err = service
            .create(&admin, "m@example.com", "M", "kir", Some(Uuid::new_v4()), vec![Role::Admin])
            .await
            .unwrap_err();
        let AppError::ValidationError(errors) = err else {
            panic!("esperava erro de validação, veio {err:?}");
        };
        assert!(errors.field_errors().contains_key("manager"));
    }

    #[tokio::test]
    async fn delete_requires_hr() {
        let (service, admin) = setup().await;
        let m = service
            .create(&admin, "m@example.com", "M", "kir", None, vec![Role::PersonnelManager])
            .await
            .unwrap();

        assert!(matches!(
            service.delete(&m, admin.id).await.unwrap_err(),
            AppError::PermissionDenied
        ));
        service.delete(&admin, m.id).await.unwrap();
        assert!(matches!(
            service.get(m.id).await.unwrap_err(),
            AppError::PersonNotFound
        ));
    }
}
