//! Application layer for Taller.
//!
//! Services here coordinate the domain types in `taller-core` with the
//! gateways implemented in `taller-infrastructure`: the session store and
//! its push channel, the per-user notification feed, the work-order board
//! and stage transitions.

pub mod console;
pub mod notices;
pub mod notification_feed;
pub mod push_channel;
pub mod session_store;
pub mod transition_service;
pub mod work_order_board;

#[cfg(test)]
mod test_support;

pub use console::{Console, Gateways};
pub use notices::{Notice, NoticeLevel, Notices};
pub use notification_feed::{MarkAllOutcome, NotificationFeed};
pub use push_channel::{OrderAssignedHandler, PushChannel, Subscription};
pub use session_store::SessionStore;
pub use transition_service::TransitionService;
pub use work_order_board::WorkOrderBoard;
