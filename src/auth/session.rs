use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::models::User;

/// The client's cached copy of the authenticated identity.
///
/// Starts empty at process start, is populated by a successful login,
/// registration or refresh, and is reset on sign-out. Nothing is persisted;
/// the server is the system of record and the cookie is the credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub user_profile_id: i64,
    pub username: String,
    pub email: String,
}

impl Session {
    /// A signed-in session has a non-zero profile id.
    pub fn is_signed_in(&self) -> bool {
        self.user_profile_id != 0
    }
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            user_profile_id: user.user_profile_id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Shared holder for the current session.
///
/// Reads are synchronous and never fail; mutation happens only through the
/// login/register/refresh/sign-out entry points, each an atomic single
/// assignment. Share across tasks via `Arc`.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current identity. Never fails; the empty identity means signed out.
    pub fn get(&self) -> Session {
        self.current.read().expect("session lock poisoned").clone()
    }

    /// Replace the identity wholesale.
    pub fn set(&self, next: Session) {
        *self.current.write().expect("session lock poisoned") = next;
    }

    /// Reset to the empty identity (sign-out equivalent).
    pub fn clear(&self) {
        self.set(Session::default());
    }

    pub fn is_signed_in(&self) -> bool {
        self.current
            .read()
            .expect("session lock poisoned")
            .is_signed_in()
    }
}
