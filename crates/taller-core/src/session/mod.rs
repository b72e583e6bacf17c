//! Session domain module.
//!
//! This module contains the authenticated identity and the gateway used to
//! establish or tear down a session against the server.
//!
//! # Module Structure
//!
//! - `model`: `Identity`, `Credentials` and the `SessionCheck` answer
//! - `repository`: `AuthGateway` trait for the auth endpoints

mod model;
pub mod repository;

pub use model::{Credentials, Identity, SessionCheck, UserId};
pub use repository::AuthGateway;
