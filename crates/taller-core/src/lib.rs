//! Domain core of the Taller repair-shop console.
//!
//! Holds the work-order lifecycle types, the pure board projection, the
//! stage-transition guard and the gateway traits the application layer
//! talks through. Nothing in this crate performs I/O.

pub mod config;
pub mod error;
pub mod notification;
pub mod push;
pub mod session;
pub mod work_order;

// Re-export common error type
pub use error::{Result, TallerError};
