//! REST API client module for the warehouse/hobby service.
//!
//! This module provides the `ApiClient` for communicating with the
//! service: authentication, warehouse/stock inventory, hobbies, posts and
//! profiles.
//!
//! The API is cookie-credentialed. A `SessionGuard` decorator wraps the
//! transport and renews a stale session with one silent `GET /refresh`
//! plus a single resubmission of the failed request.

pub mod client;
pub mod envelope;
pub mod error;
pub mod refresh;

pub use client::{ApiClient, ApiRequest, HttpClient, HttpResponse, Transport};
pub use envelope::{Envelope, ErrorBody, ErrorField, ResponseStatus, VALIDATION_MESSAGE};
pub use error::ApiError;
pub use refresh::SessionGuard;
