//! Notification feed.
//!
//! Keeps the current identity's notification records consistent with the
//! server. The cache is keyed by identity id, so records fetched for one
//! user are never served to another.
//!
//! Concurrent fetches are not serialized: whichever response completes last
//! replaces the cache ("last write wins"). The only response that is ever
//! discarded is one whose session ended while it was in flight, even if the
//! same user has logged in again since.

use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use taller_core::notification::{
    NotificationGateway, NotificationId, NotificationRecord, unread,
};
use taller_core::push::OrderAssigned;
use taller_core::session::{Identity, UserId};
use taller_core::{Result, TallerError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct CachedFeed {
    user_id: UserId,
    records: Vec<NotificationRecord>,
}

/// Result of [`NotificationFeed::mark_all_read`].
///
/// Each record is an independent request; a partial failure leaves the
/// successful ones read.
#[derive(Debug, Default)]
pub struct MarkAllOutcome {
    pub marked: Vec<NotificationId>,
    pub failed: Vec<(NotificationId, TallerError)>,
}

impl MarkAllOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct NotificationFeed {
    gateway: Arc<dyn NotificationGateway>,
    identity: watch::Receiver<Option<Identity>>,
    cache: RwLock<Option<CachedFeed>>,
    revision: watch::Sender<u64>,
}

impl NotificationFeed {
    /// Creates a feed bound to the identity published by the session store.
    pub fn new(
        gateway: Arc<dyn NotificationGateway>,
        identity: watch::Receiver<Option<Identity>>,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            gateway,
            identity,
            cache: RwLock::new(None),
            revision,
        }
    }

    /// Fetches every record for `user_id`.
    ///
    /// With no user (no session yet) this returns an empty list without a
    /// server call. A response that arrives after the identity changed is
    /// discarded and reported as empty.
    pub async fn fetch(&self, user_id: Option<UserId>) -> Result<Vec<NotificationRecord>> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };

        // Every identity publication bumps the watch version, so a logout
        // followed by a login as the same user still counts as a change.
        let mut session = self.identity.clone();
        session.borrow_and_update();

        let records = self.gateway.list_for_user(user_id).await?;

        let session_changed = session.has_changed().unwrap_or(true);
        if session_changed || self.current_user() != Some(user_id) {
            tracing::warn!(
                "[NotificationFeed] Discarding late response for user {} ({} records)",
                user_id,
                records.len()
            );
            return Ok(Vec::new());
        }

        tracing::debug!(
            "[NotificationFeed] Fetched {} records for user {}",
            records.len(),
            user_id
        );
        *self.write_cache() = Some(CachedFeed {
            user_id,
            records: records.clone(),
        });
        self.bump_revision();
        Ok(records)
    }

    /// Refetches for the current identity.
    pub async fn refresh(&self) -> Result<Vec<NotificationRecord>> {
        self.fetch(self.current_user()).await
    }

    /// Records cached for the current identity; empty if the cache belongs
    /// to someone else or was invalidated.
    pub fn records(&self) -> Vec<NotificationRecord> {
        let current = self.current_user();
        self.read_cache()
            .as_ref()
            .filter(|cached| Some(cached.user_id) == current)
            .map(|cached| cached.records.clone())
            .unwrap_or_default()
    }

    /// Whether a fetch result for the current identity is cached.
    pub fn is_cached(&self) -> bool {
        let current = self.current_user();
        self.read_cache()
            .as_ref()
            .is_some_and(|cached| Some(cached.user_id) == current)
    }

    pub fn unread(&self) -> Vec<NotificationRecord> {
        unread(&self.records())
    }

    pub fn unread_count(&self) -> usize {
        self.records().iter().filter(|r| !r.read).count()
    }

    /// Drops the cached fetch result so the next read refetches.
    pub fn invalidate(&self) {
        if self.write_cache().take().is_some() {
            tracing::debug!("[NotificationFeed] Cache invalidated");
        }
        self.bump_revision();
    }

    /// Asks the server to mark one record read, then invalidates the cache.
    ///
    /// Nothing is changed locally before the server answers, so a failure
    /// leaves the feed exactly as it was.
    pub async fn mark_read(&self, id: NotificationId) -> Result<()> {
        self.gateway.mark_read(id).await.inspect_err(|e| {
            tracing::warn!("[NotificationFeed] Failed to mark {} read: {}", id, e);
        })?;
        self.invalidate();
        Ok(())
    }

    /// Marks every unread record in `records` read, one request each.
    pub async fn mark_all_read(&self, records: &[NotificationRecord]) -> MarkAllOutcome {
        let pending = unread(records);
        let results = join_all(
            pending
                .iter()
                .map(|record| async move { (record.id, self.gateway.mark_read(record.id).await) }),
        )
        .await;

        let mut outcome = MarkAllOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => outcome.marked.push(id),
                Err(e) => {
                    tracing::warn!("[NotificationFeed] Failed to mark {} read: {}", id, e);
                    outcome.failed.push((id, e));
                }
            }
        }
        if !outcome.marked.is_empty() {
            self.invalidate();
        }
        outcome
    }

    /// Reacts to a pushed `orderAssigned` event.
    ///
    /// The whole feed is invalidated and refetched for the current identity,
    /// whatever record the event refers to.
    pub fn handle_push(self: &Arc<Self>, event: &OrderAssigned) -> JoinHandle<()> {
        tracing::debug!(
            "[NotificationFeed] Push for order {}, refetching",
            event.reference_order_id
        );
        self.invalidate();
        let feed = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = feed.refresh().await {
                tracing::warn!("[NotificationFeed] Refetch after push failed: {}", e);
            }
        })
    }

    /// A receiver bumped whenever the cached records change.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn current_user(&self) -> Option<UserId> {
        self.identity.borrow().as_ref().map(|i| i.id)
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, Option<CachedFeed>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, Option<CachedFeed>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
