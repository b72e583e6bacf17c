//! Push channel service.
//!
//! Owns the single server-to-client connection of the console and fans
//! `orderAssigned` events out to subscribed handlers.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use futures::StreamExt;
use taller_core::Result;
use taller_core::push::{OrderAssigned, PushEvent, PushStream, PushTransport};
use taller_core::session::UserId;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Callback invoked once per delivered `orderAssigned` event.
///
/// Handlers run on the channel's pump task and must not call back into the
/// channel.
pub type OrderAssignedHandler = Arc<dyn Fn(&OrderAssigned) + Send + Sync>;

/// Live registration of one identity with the server side of the channel.
struct Registration {
    identity_id: UserId,
    epoch: u64,
    cancel: CancellationToken,
    /// Set by the pump once the server side stopped streaming.
    ended: bool,
}

#[derive(Default)]
struct ChannelState {
    registration: Option<Registration>,
    next_epoch: u64,
}

#[derive(Default)]
struct Shared {
    state: RwLock<ChannelState>,
    handlers: RwLock<HashMap<Uuid, OrderAssignedHandler>>,
}

impl Shared {
    /// Invokes every handler if `epoch` is still the live registration.
    ///
    /// The state read guard is held while handlers run, so `close` cannot
    /// complete in the middle of a delivery.
    fn dispatch(&self, epoch: u64, event: &PushEvent) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let live = state
            .registration
            .as_ref()
            .is_some_and(|r| r.epoch == epoch);
        if !live {
            tracing::debug!("[PushChannel] Dropping event for closed registration");
            return;
        }

        let handlers: Vec<OrderAssignedHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        match event {
            PushEvent::OrderAssigned(payload) => {
                tracing::debug!(
                    "[PushChannel] orderAssigned for order {} -> {} handler(s)",
                    payload.reference_order_id,
                    handlers.len()
                );
                for handler in handlers {
                    handler(payload);
                }
            }
        }
    }

    /// Flags the registration as ended if `epoch` is still the live one.
    fn mark_ended(&self, epoch: u64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(registration) = state.registration.as_mut().filter(|r| r.epoch == epoch) {
            registration.ended = true;
        }
    }

    fn remove_handler(&self, id: &Uuid) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }
}

/// Handle returned by [`PushChannel::on_order_assigned`].
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes
/// the handler.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: Uuid,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.remove_handler(&self.id);
        }
    }
}

/// The console's persistent event stream, scoped to one identity.
///
/// No reconnect is attempted when the underlying stream ends: the
/// registration stays in place (so `is_open` keeps reporting the session's
/// intent) but nothing more is delivered until the next `open` for the
/// same identity, which connects again.
pub struct PushChannel {
    transport: Arc<dyn PushTransport>,
    shared: Arc<Shared>,
    /// Serializes open/close.
    lifecycle: Mutex<()>,
}

impl PushChannel {
    pub fn new(transport: Arc<dyn PushTransport>) -> Self {
        Self {
            transport,
            shared: Arc::new(Shared::default()),
            lifecycle: Mutex::new(()),
        }
    }

    /// Connects and registers `identity_id`.
    ///
    /// Opening again for the identity that is already registered is a no-op
    /// while its stream is live; if the stream has ended it connects again
    /// and keeps the subscribed handlers. Opening for a different identity
    /// closes the previous registration first. On failure the channel is
    /// left closed.
    pub async fn open(&self, identity_id: UserId) -> Result<()> {
        let _guard = self.lifecycle.lock().await;

        let reconnecting = match self.registration_status() {
            Some((current, false)) if current == identity_id => {
                tracing::debug!("[PushChannel] Already open for user {}", identity_id);
                return Ok(());
            }
            Some((current, true)) if current == identity_id => {
                tracing::info!("[PushChannel] Stream for user {} ended, reconnecting", identity_id);
                true
            }
            Some(_) => {
                self.close_locked();
                false
            }
            None => false,
        };

        let stream = match self.transport.connect(identity_id).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("[PushChannel] Failed to open for user {}: {}", identity_id, e);
                if reconnecting {
                    self.close_locked();
                }
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        let epoch = {
            let mut state = self.shared.state.write().unwrap_or_else(PoisonError::into_inner);
            state.next_epoch += 1;
            let epoch = state.next_epoch;
            let previous = state.registration.replace(Registration {
                identity_id,
                epoch,
                cancel: cancel.clone(),
                ended: false,
            });
            if let Some(previous) = previous {
                previous.cancel.cancel();
            }
            epoch
        };

        tokio::spawn(pump(Arc::clone(&self.shared), epoch, cancel, stream));
        tracing::info!("[PushChannel] Opened for user {}", identity_id);
        Ok(())
    }

    /// Terminates the connection.
    ///
    /// Every handler registered so far is dropped; none of them fires after
    /// this returns.
    pub async fn close(&self) {
        let _guard = self.lifecycle.lock().await;
        self.close_locked();
    }

    fn close_locked(&self) {
        let previous = self
            .shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .registration
            .take();

        self.shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        if let Some(registration) = previous {
            registration.cancel.cancel();
            tracing::info!("[PushChannel] Closed for user {}", registration.identity_id);
        }
    }

    /// Registers a handler for `orderAssigned` events.
    pub fn on_order_assigned<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&OrderAssigned) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(handler));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn is_open(&self) -> bool {
        self.registered_identity().is_some()
    }

    /// Whether the registration's stream is still delivering.
    pub fn is_connected(&self) -> bool {
        self.registration_status()
            .is_some_and(|(_, ended)| !ended)
    }

    /// The identity the channel is registered for, if open.
    pub fn registered_identity(&self) -> Option<UserId> {
        self.registration_status().map(|(identity_id, _)| identity_id)
    }

    fn registration_status(&self) -> Option<(UserId, bool)> {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .registration
            .as_ref()
            .map(|r| (r.identity_id, r.ended))
    }

    pub fn handler_count(&self) -> usize {
        self.shared
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

async fn pump(shared: Arc<Shared>, epoch: u64, cancel: CancellationToken, mut stream: PushStream) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = stream.next() => match next {
                Some(Ok(event)) => shared.dispatch(epoch, &event),
                Some(Err(e)) => {
                    tracing::warn!("[PushChannel] Dropping push frame: {}", e);
                }
                None => {
                    tracing::warn!("[PushChannel] Stream ended; reconnects on next open");
                    shared.mark_ended(epoch);
                    break;
                }
            },
        }
    }
}
