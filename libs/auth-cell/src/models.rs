use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_store::StoreError;

/// Storage key for the user collection.
pub const USERS_KEY: &str = "users";
/// Storage key for the persisted session record.
pub const SESSION_KEY: &str = "current_session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique clinic-wide.
    pub login: String,
    /// Argon2 PHC string. Blanked in the persisted session record.
    pub password_hash: String,
    pub role: Role,
}

/// Roles are persisted with their original French spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "médecin")]
    Medecin,
    #[serde(rename = "infirmière")]
    Infirmiere,
    #[serde(rename = "spécialiste")]
    Specialiste,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    /// A professional is anyone who can hold appointments.
    pub fn is_professional(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Medecin => write!(f, "médecin"),
            Role::Infirmiere => write!(f, "infirmière"),
            Role::Specialiste => write!(f, "spécialiste"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub login: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("Login '{0}' is already in use")]
    DuplicateLogin(String),

    #[error("The last administrator account cannot be removed")]
    LastAdmin,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
