//! Session state and credential storage.
//!
//! This module provides:
//! - `Session` / `SessionStore`: the in-memory identity shared across the
//!   application, mutated only by the login/refresh/sign-out flows
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! The session itself is never persisted; the server-side cookie is the
//! durable credential.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionStore};
