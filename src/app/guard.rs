//! Route guard - decides between the public and the private screen set

use crate::network::client::ApiClient;

/// Where the session stands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    /// Startup; renewal not answered yet
    #[default]
    CheckingAuth,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    /// Private screens may be shown
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }
}

/// Startup check.
///
/// A live logout marker means another instance signed out recently, so we
/// stay signed out without touching the renewal cookie. Otherwise one
/// renewal call decides.
pub async fn bootstrap(client: &ApiClient) -> AuthState {
    if client.marker().is_present() {
        tracing::info!("Logout marker present, starting signed out");
        client.session().clear();
        return AuthState::Unauthenticated;
    }

    match client.renew().await {
        Ok(_) => {
            tracing::info!("Session restored");
            AuthState::Authenticated
        }
        Err(e) => {
            tracing::debug!(error = %e, "No session to restore");
            AuthState::Unauthenticated
        }
    }
}
