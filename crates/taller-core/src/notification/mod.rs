//! Notification domain module.
//!
//! - `model`: `NotificationRecord` as delivered by the server
//! - `repository`: `NotificationGateway` trait for the notification endpoints

mod model;
pub mod repository;

pub use model::{NotificationId, NotificationRecord, unread};
pub use repository::NotificationGateway;
