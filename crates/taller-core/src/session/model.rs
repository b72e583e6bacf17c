//! Session domain model.

use serde::{Deserialize, Serialize};

/// Numeric identifier of a user (operator or technician).
pub type UserId = i64;

/// The authenticated user as held by the client.
///
/// At most one `Identity` is active per running console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub display_name: String,
    pub role: String,
}

/// Login form contents.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Answer of the session check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionCheck {
    pub is_authenticated: bool,
    pub user: Option<Identity>,
}

impl SessionCheck {
    /// Returns the identity only when the server confirmed the session.
    pub fn into_identity(self) -> Option<Identity> {
        if self.is_authenticated { self.user } else { None }
    }
}
