//! User records as persisted, and the projection safe to hand out.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One entry of the persisted user collection.
///
/// `password` always holds a salted hash, never the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    #[serde(rename = "isActive", alias = "active", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password: password_hash.into(),
            active: true,
        }
    }

    /// Strip the hash before the record leaves the process.
    pub fn public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("active", &self.active)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub active: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            active: user.active,
        }
    }
}
