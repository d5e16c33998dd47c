// src/services/role_policy.rs
//
// Regras do editor de cargos: quem pode mexer em quais cargos e sites.

use std::collections::BTreeSet;

use crate::{
    common::error::AppError,
    models::{
        person::Person,
        role::{Role, RoleKind, RoleSet},
    },
};

pub fn can_modify_role(actor: &Person, person: &Person, kind: RoleKind) -> bool {
    if actor.roles.has_higher_role() {
        return true;
    }

    // Gerente de site só mexe no cargo de gerente de site, e só em gente dos sites dele
    kind == RoleKind::SiteManager
        && actor.holds(RoleKind::SiteManager)
        && actor.roles.manages_site(&person.site)
}

pub fn can_modify_site(actor: &Person, site: &str) -> bool {
    actor.roles.has_higher_role() || actor.roles.manages_site(site)
}

/// Só o que muda precisa de autorização: cargos ou sites adicionados/removidos.
pub fn authorize_role_change(actor: &Person, person: &Person, new_roles: &[Role]) -> Result<(), AppError> {
    let old_kinds: BTreeSet<RoleKind> = person.roles.iter().map(Role::kind).collect();
    let new_kinds: BTreeSet<RoleKind> = new_roles.iter().map(Role::kind).collect();

    let denied_roles: Vec<&str> = old_kinds
        .symmetric_difference(&new_kinds)
        .filter(|kind| !can_modify_role(actor, person, **kind))
        .map(|kind| kind.as_str())
        .collect();

    let old_sites = person.roles.managed_sites();
    let new_sites = new_roles.managed_sites();

    let denied_sites: Vec<&String> = old_sites
        .symmetric_difference(&new_sites)
        .filter(|site| !can_modify_site(actor, site))
        .collect();

    if denied_roles.is_empty() && denied_sites.is_empty() {
        return Ok(());
    }

    tracing::warn!(
        actor_id = %actor.id,
        person_id = %person.id,
        ?denied_roles,
        ?denied_sites,
        "Alteração de cargos negada"
    );
    Err(AppError::PermissionDenied)
}

/// A própria pessoa, o gerente direto, o gerente do site dela ou HR/admin.
pub fn oversees(actor: &Person, person: &Person) -> bool {
    actor.id == person.id
        || person.is_managed_by(actor.id)
        || actor.roles.manages_site(&person.site)
        || actor.roles.is_hr_or_admin()
}

/// Cadastrar pessoas exige um "cargo superior".
pub fn authorize_create(actor: &Person) -> Result<(), AppError> {
    if actor.roles.has_higher_role() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Remover pessoas do diretório é só para HR/admin.
pub fn authorize_delete(actor: &Person) -> Result<(), AppError> {
    if actor.roles.is_hr_or_admin() {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}
