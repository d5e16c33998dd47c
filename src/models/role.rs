// src/models/role.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Conjunto de sites administrados por um gerente de site.
pub type SiteSet = BTreeSet<String>;

// Cargo de uma pessoa. Cada variante carrega apenas o que precisa.
// No JSON: { "name": "siteManager", "opts": ["mbt"] } ou { "name": "admin" }
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "opts", rename_all = "camelCase")]
pub enum Role {
    SiteManager(SiteSet),
    PersonnelManager,
    HrManager,
    Admin,
}

/// Apenas o "tipo" do cargo, sem payload. Usado para comparar conjuntos de cargos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleKind {
    SiteManager,
    PersonnelManager,
    HrManager,
    Admin,
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::SiteManager(_) => RoleKind::SiteManager,
            Role::PersonnelManager => RoleKind::PersonnelManager,
            Role::HrManager => RoleKind::HrManager,
            Role::Admin => RoleKind::Admin,
        }
    }

    /// Sites cobertos pelo cargo (vazio para cargos que não são de site).
    pub fn sites(&self) -> Option<&SiteSet> {
        match self {
            Role::SiteManager(sites) => Some(sites),
            _ => None,
        }
    }
}

impl RoleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleKind::SiteManager => "siteManager",
            RoleKind::PersonnelManager => "personnelManager",
            RoleKind::HrManager => "hrManager",
            RoleKind::Admin => "admin",
        }
    }
}

// ---
// Consultas sobre uma lista de cargos
// ---
pub trait RoleSet {
    fn holds(&self, kind: RoleKind) -> bool;

    /// HR ou admin: autoridade para sobrepor gerentes de site.
    fn is_hr_or_admin(&self) -> bool {
        self.holds(RoleKind::HrManager) || self.holds(RoleKind::Admin)
    }

    /// O "cargo superior" do editor de cargos: gerente de pessoal, HR ou admin.
    fn has_higher_role(&self) -> bool {
        self.holds(RoleKind::PersonnelManager) || self.is_hr_or_admin()
    }

    fn manages_site(&self, site: &str) -> bool;

    fn managed_sites(&self) -> SiteSet;
}

impl RoleSet for [Role] {
    fn holds(&self, kind: RoleKind) -> bool {
        self.iter().any(|role| role.kind() == kind)
    }

    fn manages_site(&self, site: &str) -> bool {
        self.iter()
            .filter_map(Role::sites)
            .any(|sites| sites.contains(site))
    }

    fn managed_sites(&self) -> SiteSet {
        self.iter()
            .filter_map(Role::sites)
            .flat_map(|sites| sites.iter().cloned())
            .collect()
    }
}
