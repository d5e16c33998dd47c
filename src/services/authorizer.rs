// src/services/authorizer.rs
//
// Quem pode confirmar cada lado de uma transferência. Função pura: recebe a
// pessoa que age, a pessoa movida e o lado, sem I/O.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    person::Person,
    role::RoleSet,
    transaction::{Leg, Transaction, OTHER_SITE},
};

/// Os quatro papéis que o usuário tem em relação a uma transferência.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveAuthority {
    pub is_personnel_manager: bool,
    pub is_hr_manager: bool,
    pub is_origin_manager: bool,
    pub is_target_manager: bool,
}

impl MoveAuthority {
    pub fn evaluate(actor: &Person, person: &Person, transaction: &Transaction) -> Self {
        let roles = actor.roles.as_slice();
        Self {
            is_personnel_manager: person.is_managed_by(actor.id),
            is_hr_manager: roles.is_hr_or_admin(),
            is_origin_manager: roles.manages_site(&transaction.origin),
            is_target_manager: roles.manages_site(&transaction.target),
        }
    }

    fn is_site_manager_for(&self, leg: Leg) -> bool {
        match leg {
            Leg::Origin => self.is_origin_manager,
            Leg::Target => self.is_target_manager,
        }
    }

    pub fn can_confirm(&self, transaction: &Transaction, leg: Leg) -> bool {
        if !transaction.is_pending() || transaction.is_confirmed(leg) {
            return false;
        }

        let site_manager = self.is_site_manager_for(leg);

        // Site fora do conjunto administrado: precisa ser o gerente direto E gerente do site
        if transaction.site(leg) == OTHER_SITE {
            return self.is_personnel_manager && site_manager;
        }

        site_manager || self.is_hr_manager
    }
}

/// Pode `actor` confirmar o lado `leg` da transferência atual de `person`?
pub fn can_confirm(actor: &Person, person: &Person, leg: Leg) -> bool {
    person.transaction.as_ref().is_some_and(|transaction| {
        MoveAuthority::evaluate(actor, person, transaction).can_confirm(transaction, leg)
    })
}

// O que a UI usa para habilitar/desabilitar os botões de confirmação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MovePermissions {
    pub origin: bool,
    pub target: bool,
}

impl MovePermissions {
    pub fn for_actor(actor: &Person, person: &Person) -> Self {
        Self {
            origin: can_confirm(actor, person, Leg::Origin),
            target: can_confirm(actor, person, Leg::Target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        person::{AlertStatus, ManagerRef},
        role::Role,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn person(roles: Vec<Role>) -> Person {
        Person {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            name: "Someone".into(),
            site: "mbt".into(),
            manager: None,
            alert_status: AlertStatus::Pending,
            report_status: String::new(),
            location: String::new(),
            updated_at: Utc::now(),
            transaction: None,
            roles,
        }
    }

    fn site_manager(sites: &[&str]) -> Person {
        person(vec![Role::SiteManager(sites.iter().map(|s| s.to_string()).collect())])
    }

    fn moving(origin: &str, target: &str) -> Person {
        let mut p = person(vec![]);
        p.transaction = Some(Transaction::new(origin.into(), target.into(), None));
        p
    }

    fn managed_by(mut p: Person, manager: &Person) -> Person {
        p.manager = Some(ManagerRef { id: manager.id, name: manager.name.clone() });
        p
    }

    #[test]
    fn site_manager_confirms_only_their_own_leg() {
        let actor = site_manager(&["mbt"]);
        let p = moving("mbt", "kir");

        assert!(can_confirm(&actor, &p, Leg::Origin));
        assert!(!can_confirm(&actor, &p, Leg::Target));
    }

    #[test]
    fn site_manager_scope_is_by_site() {
        let actor = site_manager(&["kir"]);

        assert!(can_confirm(&actor, &moving("mbt", "kir"), Leg::Target));
        assert!(!can_confirm(&actor, &moving("kir", "mfs"), Leg::Target));
    }

    #[test]
    fn hr_and_admin_confirm_any_regular_leg() {
        let p = moving("mbt", "mfs");
        for role in [Role::HrManager, Role::Admin] {
            let actor = person(vec![role]);
            assert!(can_confirm(&actor, &p, Leg::Origin));
            assert!(can_confirm(&actor, &p, Leg::Target));
        }
    }

    #[test]
    fn confirmed_leg_is_never_confirmable_again() {
        let actor = person(vec![Role::Admin]);
        let mut p = moving("mbt", "kir");
        if let Some(tx) = p.transaction.as_mut() {
            tx.origin_confirmation = true;
        }

        assert!(!can_confirm(&actor, &p, Leg::Origin));
        assert!(can_confirm(&actor, &p, Leg::Target));
    }

    #[test]
    fn other_site_needs_personnel_and_site_manager_together() {
        let hr = person(vec![Role::HrManager]);
        let boss = site_manager(&["other"]);
        let plain_boss = person(vec![Role::PersonnelManager]);

        let p = managed_by(moving("other", "kir"), &boss);
        assert!(!can_confirm(&hr, &p, Leg::Origin));
        assert!(can_confirm(&boss, &p, Leg::Origin));

        let p = managed_by(moving("other", "kir"), &plain_boss);
        assert!(!can_confirm(&plain_boss, &p, Leg::Origin));

        // Gerente do site "other" mas não é o gerente direto
        let p = moving("other", "kir");
        assert!(!can_confirm(&boss, &p, Leg::Origin));
    }

    #[test]
    fn other_target_does_not_block_regular_origin() {
        let hr = person(vec![Role::HrManager]);
        let p = moving("mbt", "other");

        assert!(can_confirm(&hr, &p, Leg::Origin));
        assert!(!can_confirm(&hr, &p, Leg::Target));
    }

    #[test]
    fn nothing_to_confirm_without_a_pending_transaction() {
        let actor = person(vec![Role::Admin]);
        assert!(!can_confirm(&actor, &person(vec![]), Leg::Origin));

        let mut p = moving("mbt", "kir");
        if let Some(tx) = p.transaction.as_mut() {
            tx.status = crate::models::transaction::TransactionStatus::Resolved;
        }
        assert_eq!(
            MovePermissions::for_actor(&actor, &p),
            MovePermissions { origin: false, target: false }
        );
    }

    #[test]
    fn personnel_manager_alone_cannot_confirm_regular_legs() {
        let boss = person(vec![Role::PersonnelManager]);
        let p = managed_by(moving("mbt", "kir"), &boss);

        assert_eq!(
            MovePermissions::for_actor(&boss, &p),
            MovePermissions { origin: false, target: false }
        );
    }
}
