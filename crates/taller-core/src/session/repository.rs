//! Auth gateway trait.
//!
//! Defines the interface to the server's authentication endpoints.

use async_trait::async_trait;

use super::model::{Credentials, Identity, SessionCheck};
use crate::error::Result;

/// Access to the server-side session (cookie or token based).
///
/// Implementations surface bad credentials and expired sessions as
/// `TallerError::Authentication` and never retry on their own.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Asks the server whether the current session is still valid.
    async fn check_auth(&self) -> Result<SessionCheck>;

    /// Submits credentials and returns the authenticated user.
    async fn login(&self, credentials: &Credentials) -> Result<Identity>;

    /// Requests server-side session termination.
    async fn logout(&self) -> Result<()>;
}
