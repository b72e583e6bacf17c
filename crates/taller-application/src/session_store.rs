//! Session store.
//!
//! Establishes and tears down the authenticated session together with its
//! push connection. The two are kept in lock-step: the channel is open if
//! and only if an identity is set, on success and on every error path.
//!
//! Each transition updates the channel and the identity one after the other,
//! so the pair is only guaranteed consistent between transitions. Reading
//! them separately while a login or check is running can observe one side
//! already switched; [`SessionStore::snapshot`] waits for the transition.

use std::sync::Arc;

use taller_core::Result;
use taller_core::session::{AuthGateway, Credentials, Identity, UserId};
use tokio::sync::{Mutex, watch};

use crate::push_channel::PushChannel;

/// Holds the console's single authenticated identity and its push channel.
///
/// The current identity is published on a `watch` channel so dependents
/// (the notification feed in particular) can key their state by it.
pub struct SessionStore {
    auth: Arc<dyn AuthGateway>,
    channel: Arc<PushChannel>,
    identity: watch::Sender<Option<Identity>>,
    /// Serializes check/login/logout.
    lifecycle: Mutex<()>,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthGateway>, channel: Arc<PushChannel>) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            auth,
            channel,
            identity,
            lifecycle: Mutex::new(()),
        }
    }

    /// Asks the server whether the stored session is still valid.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(identity))`: session confirmed, push channel open
    /// - `Ok(None)`: no valid session, identity cleared and channel closed
    /// - `Err(_)`: the check or the channel open failed; identity cleared
    ///   and channel closed
    pub async fn check_session(&self) -> Result<Option<Identity>> {
        let _guard = self.lifecycle.lock().await;

        let check = match self.auth.check_auth().await {
            Ok(check) => check,
            Err(e) => {
                tracing::warn!("[SessionStore] Session check failed: {}", e);
                self.clear().await;
                return Err(e);
            }
        };

        match check.into_identity() {
            Some(identity) => self.establish(identity).await.map(Some),
            None => {
                tracing::info!("[SessionStore] No active session");
                self.clear().await;
                Ok(None)
            }
        }
    }

    /// Submits credentials and establishes the session.
    ///
    /// On failure the identity is left unset and the error (typically
    /// `TallerError::Authentication`) is returned as-is. No retry.
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        let _guard = self.lifecycle.lock().await;

        match self.auth.login(credentials).await {
            Ok(identity) => self.establish(identity).await,
            Err(e) => {
                tracing::warn!(
                    "[SessionStore] Login failed for '{}': {}",
                    credentials.username,
                    e
                );
                self.clear().await;
                Err(e)
            }
        }
    }

    /// Ends the session on the server, then clears it locally.
    ///
    /// The local identity and push channel are cleared even if the server
    /// call fails; that failure is still returned to the caller.
    pub async fn logout(&self) -> Result<()> {
        let _guard = self.lifecycle.lock().await;

        let result = self.auth.logout().await;
        if let Err(e) = &result {
            tracing::warn!("[SessionStore] Server logout failed, clearing locally: {}", e);
        }
        self.clear().await;
        result
    }

    /// The authenticated identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.borrow().is_some()
    }

    /// A receiver that observes every identity change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    pub fn channel(&self) -> &Arc<PushChannel> {
        &self.channel
    }

    /// The identity and the channel's registered identity, read together
    /// once no check/login/logout is in progress.
    pub async fn snapshot(&self) -> (Option<Identity>, Option<UserId>) {
        let _guard = self.lifecycle.lock().await;
        (self.identity(), self.channel.registered_identity())
    }

    async fn establish(&self, identity: Identity) -> Result<Identity> {
        if let Err(e) = self.channel.open(identity.id).await {
            self.clear().await;
            return Err(e);
        }
        tracing::info!(
            "[SessionStore] Session established for {} ({})",
            identity.display_name,
            identity.id
        );
        // Re-confirming the same identity publishes nothing, so in-flight
        // work keyed to the session is not discarded.
        self.identity.send_if_modified(|current| {
            if current.as_ref() == Some(&identity) {
                return false;
            }
            *current = Some(identity.clone());
            true
        });
        Ok(identity)
    }

    async fn clear(&self) {
        self.channel.close().await;
        let mut previous = None;
        self.identity.send_if_modified(|current| {
            previous = current.take();
            previous.is_some()
        });
        if let Some(previous) = previous {
            tracing::info!("[SessionStore] Session cleared for user {}", previous.id);
        }
    }
}
