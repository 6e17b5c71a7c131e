use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capability tag used to gate routes.
///
/// `Anyone` is a sentinel: a route that permits it never requires a credential.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Anyone,
    User,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Anyone, Role::User, Role::Manager, Role::Admin];

    /// Claim string carried inside credentials.
    pub fn claim(self) -> &'static str {
        match self {
            Role::Anyone => "anyone",
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Role::Anyone => "ANYONE",
            Role::User => "USER",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role claim '{0}'")]
pub struct UnknownRole(pub String);

/// Closed mapping from claim strings to roles, built once at startup.
///
/// Lookup is case-insensitive; anything outside the table is an error.
#[derive(Debug, Clone)]
pub struct RoleTable {
    by_claim: HashMap<&'static str, Role>,
}

impl RoleTable {
    pub fn standard() -> Self {
        Self {
            by_claim: Role::ALL.iter().map(|r| (r.claim(), *r)).collect(),
        }
    }

    pub fn resolve(&self, claim: &str) -> Result<Role, UnknownRole> {
        self.by_claim
            .get(claim.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| UnknownRole(claim.to_string()))
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Ordered set of roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.0.iter().any(|r| other.0.contains(r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl core::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("{")?;
        for (i, role) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            core::fmt::Display::fmt(role, f)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_case_insensitive() {
        let table = RoleTable::standard();
        assert_eq!(table.resolve("admin"), Ok(Role::Admin));
        assert_eq!(table.resolve("ADMIN"), Ok(Role::Admin));
        assert_eq!(table.resolve("Manager"), Ok(Role::Manager));
        assert_eq!(table.resolve("user"), Ok(Role::User));
    }

    #[test]
    fn table_rejects_unknown_claims() {
        let table = RoleTable::standard();
        assert_eq!(
            table.resolve("superadmin"),
            Err(UnknownRole("superadmin".to_string()))
        );
        assert!(table.resolve("").is_err());
        assert!(table.resolve(" admin").is_err());
    }

    #[test]
    fn every_role_round_trips_through_its_claim() {
        let table = RoleTable::standard();
        for role in Role::ALL {
            assert_eq!(table.resolve(role.claim()), Ok(role));
        }
    }

    #[test]
    fn intersection() {
        let permitted = RoleSet::from([Role::User, Role::Admin, Role::Manager]);
        assert!(RoleSet::from([Role::User]).intersects(&permitted));
        assert!(!RoleSet::new().intersects(&permitted));
        assert!(!RoleSet::from([Role::Anyone]).intersects(&permitted));
    }

    #[test]
    fn display_and_serde_use_upper_case() {
        let set = RoleSet::from([Role::Admin, Role::User]);
        assert_eq!(set.to_string(), "{USER, ADMIN}");
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["USER","ADMIN"]"#);
    }
}
