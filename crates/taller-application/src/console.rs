//! The console context.
//!
//! `Console` is the explicitly constructed object that owns one session and
//! everything hanging off it. A UI builds one at start-up and passes it (or
//! an `Arc` of it) to whatever needs it; there is no global.

use std::sync::{Arc, Mutex, PoisonError};

use taller_core::notification::{NotificationGateway, NotificationId};
use taller_core::push::PushTransport;
use taller_core::session::{AuthGateway, Credentials, Identity};
use taller_core::work_order::{TransitionForm, WorkOrder, WorkOrderGateway};
use taller_core::{Result, TallerError};

use crate::notices::Notices;
use crate::notification_feed::{MarkAllOutcome, NotificationFeed};
use crate::push_channel::{PushChannel, Subscription};
use crate::session_store::SessionStore;
use crate::transition_service::TransitionService;
use crate::work_order_board::WorkOrderBoard;

/// Server-facing collaborators the console is built from.
#[derive(Clone)]
pub struct Gateways {
    pub auth: Arc<dyn AuthGateway>,
    pub notifications: Arc<dyn NotificationGateway>,
    pub work_orders: Arc<dyn WorkOrderGateway>,
    pub push: Arc<dyn PushTransport>,
}

pub struct Console {
    session: SessionStore,
    feed: Arc<NotificationFeed>,
    board: Arc<WorkOrderBoard>,
    transitions: TransitionService,
    notices: Notices,
    feed_subscription: Mutex<Option<Subscription>>,
}

impl Console {
    pub fn new(gateways: Gateways) -> Self {
        let channel = Arc::new(PushChannel::new(gateways.push));
        let session = SessionStore::new(gateways.auth, channel);
        let feed = Arc::new(NotificationFeed::new(
            gateways.notifications,
            session.subscribe(),
        ));
        let board = Arc::new(WorkOrderBoard::new(gateways.work_orders.clone()));
        let transitions = TransitionService::new(gateways.work_orders, board.clone());

        Self {
            session,
            feed,
            board,
            transitions,
            notices: Notices::default(),
            feed_subscription: Mutex::new(None),
        }
    }

    /// Restores the session on start-up, if the server still has one.
    pub async fn start(&self) -> Result<Option<Identity>> {
        let restored = self.session.check_session().await;
        match &restored {
            Ok(Some(_)) => self.attach_feed(),
            Ok(None) => self.detach_feed(),
            Err(e) => {
                self.detach_feed();
                self.notices.error(format!("No se pudo verificar la sesión: {e}"));
            }
        }
        restored
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        match self.session.login(credentials).await {
            Ok(identity) => {
                self.attach_feed();
                Ok(identity)
            }
            Err(e) => {
                self.detach_feed();
                self.notices.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Logs out. Local state is cleared whatever the server answers.
    pub async fn logout(&self) -> Result<()> {
        let result = self.session.logout().await;
        self.detach_feed();
        if let Err(e) = &result {
            self.notices.error(format!("Error al cerrar sesión: {e}"));
        }
        result
    }

    pub async fn mark_read(&self, id: NotificationId) -> Result<()> {
        self.feed.mark_read(id).await.inspect_err(|e| {
            self.notices.error(format!("No se pudo marcar la notificación: {e}"));
        })
    }

    /// Marks every currently unread record read.
    pub async fn mark_all_read(&self) -> MarkAllOutcome {
        let records = if self.feed.is_cached() {
            self.feed.records()
        } else {
            match self.feed.refresh().await {
                Ok(records) => records,
                Err(e) => {
                    self.notices.error(format!("No se pudieron cargar las notificaciones: {e}"));
                    return MarkAllOutcome::default();
                }
            }
        };

        let outcome = self.feed.mark_all_read(&records).await;
        if !outcome.is_complete() {
            self.notices.error(format!(
                "{} notificación(es) no se pudieron marcar",
                outcome.failed.len()
            ));
        }
        outcome
    }

    /// Submits a transition form.
    ///
    /// Validation failures are returned without a notice (the form shows
    /// them inline); remote failures are also reported as a notice.
    pub async fn submit_transition(&self, form: &TransitionForm) -> Result<WorkOrder> {
        self.transitions.submit(form).await.inspect_err(|e| {
            if !matches!(e, TallerError::Validation(_)) {
                self.notices.error(format!("No se pudo mover la orden: {e}"));
            }
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn feed(&self) -> &Arc<NotificationFeed> {
        &self.feed
    }

    pub fn board(&self) -> &Arc<WorkOrderBoard> {
        &self.board
    }

    pub fn transitions(&self) -> &TransitionService {
        &self.transitions
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Subscribes the feed to `orderAssigned` for the current registration.
    ///
    /// The channel drops its handlers on close, so this runs after every
    /// successful session establishment. Replacing the previous handle
    /// unsubscribes it, so repeated calls never stack handlers.
    fn attach_feed(&self) {
        let feed = Arc::clone(&self.feed);
        let notices = self.notices.clone();
        let subscription = self.session.channel().on_order_assigned(move |event| {
            notices.info(event.message.clone());
            drop(feed.handle_push(event));
        });
        *self.lock_subscription() = Some(subscription);
        self.feed.invalidate();
    }

    fn detach_feed(&self) {
        self.lock_subscription().take();
        self.feed.invalidate();
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<Subscription>> {
        self.feed_subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
