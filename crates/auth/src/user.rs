//! In-process user directory backing the login and registration flows.
//!
//! Passwords are stored as a salted SHA-256 digest. The directory is the only
//! mutable piece of the auth crate and it sits outside the authorization gate:
//! the gate never reads it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::roles::{Role, RoleSet};

/// Unique identifier of a registered user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public view of a user account (no secret material).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    pub roles: RoleSet,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("username must not be empty")]
    InvalidUsername,

    #[error("password must not be empty")]
    InvalidPassword,

    #[error("user '{0}' already exists")]
    AlreadyExists(String),

    #[error("wrong username or password")]
    BadCredentials,
}

struct UserRecord {
    account: UserAccount,
    salt: [u8; 16],
    digest: [u8; 32],
}

#[derive(Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl core::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let count = self.users.read().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("UserDirectory").field("users", &count).finish()
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user with the given roles.
    ///
    /// Usernames are trimmed and compared case-sensitively.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<UserAccount, DirectoryError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DirectoryError::InvalidUsername);
        }
        if password.is_empty() {
            return Err(DirectoryError::InvalidPassword);
        }

        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        if users.contains_key(username) {
            return Err(DirectoryError::AlreadyExists(username.to_string()));
        }

        let salt = *Uuid::new_v4().as_bytes();
        let account = UserAccount {
            id: UserId::new(),
            username: username.to_string(),
            roles: roles.into_iter().collect(),
        };
        users.insert(
            account.username.clone(),
            UserRecord {
                account: account.clone(),
                salt,
                digest: digest(&salt, password),
            },
        );

        tracing::info!(user_id = %account.id, username = %account.username, roles = %account.roles, "user registered");
        Ok(account)
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords are indistinguishable to the caller.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserAccount, DirectoryError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let record = users
            .get(username.trim())
            .ok_or(DirectoryError::BadCredentials)?;

        if constant_time_eq(&record.digest, &digest(&record.salt, password)) {
            Ok(record.account.clone())
        } else {
            Err(DirectoryError::BadCredentials)
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
