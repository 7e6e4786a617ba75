//! In-memory session store
//!
//! Holds the short-lived access token and the authenticated flag. One
//! `Session` is created at startup, shared with the API client by `Arc`,
//! and reset on logout. Nothing here touches disk.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct SessionState {
    access_token: Option<String>,
    authenticated: bool,
}

#[derive(Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current access token, if any
    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().authenticated
    }

    /// Store a fresh access token and mark the session authenticated
    pub fn sign_in(&self, token: impl Into<String>) {
        let mut state = self.write();
        state.access_token = Some(token.into());
        state.authenticated = true;
    }

    /// Forget the token and drop back to unauthenticated
    pub fn clear(&self) {
        let mut state = self.write();
        state.access_token = None;
        state.authenticated = false;
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// Never print the token.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Session")
            .field("has_token", &state.access_token.is_some())
            .field("authenticated", &state.authenticated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_and_clear() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);

        session.sign_in("abc");
        assert!(session.is_authenticated());
        assert_eq!(session.access_token().as_deref(), Some("abc"));

        session.clear();
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new();
        session.sign_in("super-secret");
        let printed = format!("{:?}", session);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("has_token: true"));
    }
}
