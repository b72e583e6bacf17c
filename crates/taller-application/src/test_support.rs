//! In-memory gateways and fixtures shared by the service tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::StreamExt;
use futures::channel::mpsc as futures_mpsc;
use taller_core::notification::{NotificationGateway, NotificationId, NotificationRecord};
use taller_core::push::{OrderAssigned, PushEvent, PushStream, PushTransport};
use taller_core::session::{AuthGateway, Credentials, Identity, SessionCheck, UserId};
use taller_core::work_order::{MoveRequest, Stage, WorkOrder, WorkOrderGateway, WorkOrderId};
use taller_core::{Result, TallerError};
use tokio::sync::{mpsc, oneshot};

pub fn identity(id: UserId, name: &str) -> Identity {
    Identity {
        id,
        display_name: name.to_string(),
        role: "tecnico".to_string(),
    }
}

pub fn record(id: NotificationId, user_id: UserId, read: bool) -> NotificationRecord {
    NotificationRecord {
        id,
        user_id,
        reference_id: 100 + id,
        message: format!("Orden asignada #{id}"),
        read,
        created_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
    }
}

pub fn order_assigned(reference_order_id: WorkOrderId, message: &str) -> OrderAssigned {
    OrderAssigned {
        message: message.to_string(),
        reference_order_id,
    }
}

pub fn work_order(id: WorkOrderId, stage: Option<Stage>) -> WorkOrder {
    let mut order = WorkOrder::new(id, format!("OT-{id:04}"));
    order.stage = stage;
    order
}

/// Waits briefly for the next message; `None` if nothing arrives.
pub async fn recv_soon<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Option<T> {
    tokio::time::timeout(Duration::from_millis(100), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Yields to spawned tasks until `condition` holds; panics after one second.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ============================================================================
// Auth
// ============================================================================

pub struct FakeAuthGateway {
    session: Mutex<Result<Option<Identity>>>,
    users: Mutex<HashMap<String, Identity>>,
    logout_error: Mutex<Option<TallerError>>,
    login_calls: AtomicUsize,
}

impl FakeAuthGateway {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(Ok(None)),
            users: Mutex::new(HashMap::new()),
            logout_error: Mutex::new(None),
            login_calls: AtomicUsize::new(0),
        }
    }

    pub fn add_user(&self, username: &str, identity: Identity) {
        self.users
            .lock()
            .unwrap()
            .insert(username.to_string(), identity);
    }

    pub fn set_session(&self, identity: Option<Identity>) {
        *self.session.lock().unwrap() = Ok(identity);
    }

    pub fn fail_check(&self, error: TallerError) {
        *self.session.lock().unwrap() = Err(error);
    }

    pub fn fail_logout(&self, error: TallerError) {
        *self.logout_error.lock().unwrap() = Some(error);
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for FakeAuthGateway {
    async fn check_auth(&self) -> Result<SessionCheck> {
        let session = self.session.lock().unwrap().clone()?;
        Ok(SessionCheck {
            is_authenticated: session.is_some(),
            user: session,
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<Identity> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let found = self.users.lock().unwrap().get(&credentials.username).cloned();
        match found {
            Some(identity) => {
                *self.session.lock().unwrap() = Ok(Some(identity.clone()));
                Ok(identity)
            }
            None => Err(TallerError::authentication("invalid credentials")),
        }
    }

    async fn logout(&self) -> Result<()> {
        if let Some(error) = self.logout_error.lock().unwrap().clone() {
            return Err(error);
        }
        *self.session.lock().unwrap() = Ok(None);
        Ok(())
    }
}

// ============================================================================
// Push
// ============================================================================

pub struct FakePushTransport {
    senders: Mutex<HashMap<UserId, futures_mpsc::UnboundedSender<Result<PushEvent>>>>,
    connects: Mutex<Vec<UserId>>,
    fail_next: AtomicBool,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakePushTransport {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(HashMap::new()),
            connects: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
            gate: Mutex::new(None),
        }
    }

    /// Holds the next `connect` (after recording it) until the sender fires.
    pub fn gate_next_connect(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_next_connect(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn connect_calls(&self) -> Vec<UserId> {
        self.connects.lock().unwrap().clone()
    }

    /// Pushes an event to `user_id`'s stream; false if nobody is connected.
    pub fn emit(&self, user_id: UserId, event: OrderAssigned) -> bool {
        self.senders
            .lock()
            .unwrap()
            .get(&user_id)
            .is_some_and(|tx| tx.unbounded_send(Ok(PushEvent::OrderAssigned(event))).is_ok())
    }

    /// Ends `user_id`'s stream as a dropped connection would.
    pub fn disconnect(&self, user_id: UserId) {
        self.senders.lock().unwrap().remove(&user_id);
    }
}

#[async_trait]
impl PushTransport for FakePushTransport {
    async fn connect(&self, identity_id: UserId) -> Result<PushStream> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TallerError::push("connection refused"));
        }
        self.connects.lock().unwrap().push(identity_id);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let (tx, rx) = futures_mpsc::unbounded();
        self.senders.lock().unwrap().insert(identity_id, tx);
        Ok(rx.boxed())
    }
}

// ============================================================================
// Notifications
// ============================================================================

pub struct FakeNotificationGateway {
    records: Mutex<HashMap<UserId, Vec<NotificationRecord>>>,
    list_calls: Mutex<Vec<UserId>>,
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<NotificationRecord>>>>,
    failing: Mutex<HashSet<NotificationId>>,
    attempts: Mutex<Vec<NotificationId>>,
    marked: Mutex<Vec<NotificationId>>,
}

impl FakeNotificationGateway {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            list_calls: Mutex::new(Vec::new()),
            gates: Mutex::new(VecDeque::new()),
            failing: Mutex::new(HashSet::new()),
            attempts: Mutex::new(Vec::new()),
            marked: Mutex::new(Vec::new()),
        }
    }

    pub fn set_records(&self, user_id: UserId, records: Vec<NotificationRecord>) {
        self.records.lock().unwrap().insert(user_id, records);
    }

    /// Makes the next un-gated `list_for_user` call wait for the returned
    /// sender and answer with whatever is sent through it.
    pub fn gate(&self) -> oneshot::Sender<Vec<NotificationRecord>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fail_mark(&self, id: NotificationId) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn list_calls(&self) -> Vec<UserId> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn mark_attempts(&self) -> Vec<NotificationId> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn marked(&self) -> Vec<NotificationId> {
        self.marked.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationGateway for FakeNotificationGateway {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<NotificationRecord>> {
        self.list_calls.lock().unwrap().push(user_id);
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(gate) => gate
                .await
                .map_err(|_| TallerError::network("gate dropped")),
            None => Ok(self
                .records
                .lock()
                .unwrap()
                .get(&user_id)
                .cloned()
                .unwrap_or_default()),
        }
    }

    async fn mark_read(&self, id: NotificationId) -> Result<()> {
        self.attempts.lock().unwrap().push(id);
        if self.failing.lock().unwrap().contains(&id) {
            return Err(TallerError::server(500, "mark failed"));
        }
        for records in self.records.lock().unwrap().values_mut() {
            for record in records.iter_mut().filter(|r| r.id == id) {
                record.read = true;
            }
        }
        self.marked.lock().unwrap().push(id);
        Ok(())
    }
}

// ============================================================================
// Work orders
// ============================================================================

pub struct FakeWorkOrderGateway {
    orders: Mutex<Vec<WorkOrder>>,
    list_calls: AtomicUsize,
    moves: Mutex<Vec<MoveRequest>>,
    move_error: Mutex<Option<TallerError>>,
}

impl FakeWorkOrderGateway {
    pub fn new(orders: Vec<WorkOrder>) -> Self {
        Self {
            orders: Mutex::new(orders),
            list_calls: AtomicUsize::new(0),
            moves: Mutex::new(Vec::new()),
            move_error: Mutex::new(None),
        }
    }

    pub fn fail_moves(&self, error: TallerError) {
        *self.move_error.lock().unwrap() = Some(error);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn moves(&self) -> Vec<MoveRequest> {
        self.moves.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkOrderGateway for FakeWorkOrderGateway {
    async fn list(&self) -> Result<Vec<WorkOrder>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn move_order(&self, request: &MoveRequest) -> Result<WorkOrder> {
        if let Some(error) = self.move_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.moves.lock().unwrap().push(request.clone());

        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == request.order_id)
            .ok_or_else(|| TallerError::not_found("work order", request.order_id.to_string()))?;
        order.stage = Some(request.stage);
        order.sub_state = Some(request.sub_state);
        order.technician_id = request.technician_id;
        Ok(order.clone())
    }
}
