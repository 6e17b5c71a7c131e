use serde::Serialize;

use crate::roles::{Role, RoleSet};

/// Authenticated caller as resolved by the authorization gate.
///
/// Lives for one request; the API inserts it into request extensions so
/// handlers can see who is calling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    principal: String,
    roles: RoleSet,
}

impl Identity {
    pub fn new(principal: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            principal: principal.into(),
            roles,
        }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }
}
