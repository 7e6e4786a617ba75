//! Authenticated API client
//!
//! Every backend call goes through [`ApiClient::send`], which attaches the
//! in-memory access token and recovers from its expiry:
//!
//! - a 401 on a request that has not been retried, and that is not the
//!   renewal endpoint itself, triggers one call to `/auth/refresh`
//!   (authenticated by the HTTP-only cookie the transport keeps)
//! - the new token is stored in the session and the original request is
//!   replayed exactly once
//! - if renewal fails the session ends the same way an explicit logout
//!   does (`/auth/logout`, session and cookie cleared, logout marker
//!   raised) and the caller gets `ApiError::SessionExpired`
//!
//! Any other failure is returned to the caller untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::constants::{LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH};
use crate::error::{ApiError, ApiResult};
use crate::models::TokenResponse;
use crate::network::transport::{ApiRequest, RawResponse, ReqwestTransport, Transport};
use crate::session::Session;
use crate::storage::{CookieFile, LogoutMarker};

/// Outcome of the renewal attempted for one rejected request
enum Renewal {
    Renewed(String),
    Failed(ApiError),
    /// A coalesced renewal already failed and ended the session
    AlreadyFailed,
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    marker: LogoutMarker,
    coalesce_renewal: bool,
    /// Result of the latest coalesced renewal
    renewal_lock: Mutex<Option<ApiResult<String>>>,
    /// Bumped after every coalesced renewal
    renewal_generation: AtomicU64,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<Session>, marker: LogoutMarker) -> Self {
        ApiClient {
            transport,
            session,
            marker,
            coalesce_renewal: false,
            renewal_lock: Mutex::new(None),
            renewal_generation: AtomicU64::new(0),
        }
    }

    /// Build the production client from configuration
    pub fn from_config(config: &Config, session: Arc<Session>) -> ApiResult<Self> {
        let dir = Config::config_dir();
        let transport =
            ReqwestTransport::new(&config.api_url, Duration::from_secs(config.timeout_secs))?
                .with_cookie_file(CookieFile::new(&dir));
        let marker = LogoutMarker::new(&dir, config.auth.logout_marker_ttl_secs);
        Ok(ApiClient::new(Arc::new(transport), session, marker)
            .with_coalesced_renewal(config.auth.coalesce_renewal))
    }

    /// Serialize renewals so that requests failing together share one refresh
    pub fn with_coalesced_renewal(mut self, enabled: bool) -> Self {
        self.coalesce_renewal = enabled;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn marker(&self) -> &LogoutMarker {
        &self.marker
    }

    /// Send a request with the current token, renewing it once on a 401
    pub async fn send(&self, request: ApiRequest) -> ApiResult<RawResponse> {
        let bearer = self.session.access_token();
        let generation = self.renewal_generation.load(Ordering::SeqCst);
        tracing::info!(method = request.method.as_str(), path = %request.path, "Sending request");

        let response = self.transport.execute(request.clone(), bearer.clone()).await?;

        if !response.is_unauthorized() || request.retried || request.is_renewal() {
            return response.into_result();
        }

        let mut request = request;
        request.retried = true;
        tracing::info!(path = %request.path, "Access token rejected, renewing");

        let token = match self.renew_for_retry(generation).await {
            Renewal::Renewed(token) => token,
            Renewal::Failed(e) => {
                tracing::warn!(error = %e, "Token renewal failed, ending session");
                self.end_session().await;
                return Err(ApiError::SessionExpired);
            }
            Renewal::AlreadyFailed => return Err(ApiError::SessionExpired),
        };

        tracing::info!(path = %request.path, "Replaying request with renewed token");
        self.transport.execute(request, Some(token)).await?.into_result()
    }

    /// `send` and decode the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        self.send(request).await?.json()
    }

    /// Exchange the renewal cookie for a fresh access token.
    ///
    /// On success the session is signed in with the new token; on failure
    /// the stored token is dropped.
    pub async fn renew(&self) -> ApiResult<String> {
        let result = self.request_new_token().await;
        match &result {
            Ok(token) => self.session.sign_in(token.clone()),
            Err(_) => self.session.clear(),
        }
        result
    }

    /// `POST /auth/login` with a form body; the username is sent lowercased.
    ///
    /// Goes straight to the transport: a 401 here means bad credentials,
    /// not an expired token.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        let request = ApiRequest::post(LOGIN_PATH).form(vec![
            ("username".to_string(), username.to_lowercase()),
            ("password".to_string(), password.to_string()),
        ]);

        let response = self.transport.execute(request, None).await?.into_result()?;
        let body: TokenResponse = response.json()?;
        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response carried no accessToken".into()))?;

        self.session.sign_in(token);
        if let Err(e) = self.marker.clear() {
            tracing::warn!(error = %e, "Could not clear logout marker");
        }
        tracing::info!("Signed in");
        Ok(())
    }

    /// `POST /auth/logout`, then forget the session whatever the server said
    pub async fn logout(&self) {
        self.end_session().await;
        tracing::info!("Signed out");
    }

    /// Shared by explicit logout and failed renewal: let the server revoke
    /// the renewal cookie, then drop the token and the cookie and raise
    /// the logout marker.
    async fn end_session(&self) {
        if let Err(e) = self.transport.execute(ApiRequest::post(LOGOUT_PATH), None).await {
            tracing::debug!(error = %e, "Logout call failed");
        }
        self.session.clear();
        self.transport.forget_cookies();
        if let Err(e) = self.marker.set() {
            tracing::warn!(error = %e, "Could not raise logout marker");
        }
    }

    /// `generation` is the renewal count seen when the request was sent
    async fn renew_for_retry(&self, generation: u64) -> Renewal {
        if !self.coalesce_renewal {
            return match self.renew().await {
                Ok(token) => Renewal::Renewed(token),
                Err(e) => Renewal::Failed(e),
            };
        }

        let mut last = self.renewal_lock.lock().await;
        // someone else renewed after this request went out
        if self.renewal_generation.load(Ordering::SeqCst) != generation {
            match last.as_ref() {
                Some(Ok(token)) => return Renewal::Renewed(token.clone()),
                Some(Err(_)) => return Renewal::AlreadyFailed,
                None => {}
            }
        }

        let result = self.renew().await;
        *last = Some(result.clone());
        self.renewal_generation.fetch_add(1, Ordering::SeqCst);
        match result {
            Ok(token) => Renewal::Renewed(token),
            Err(e) => Renewal::Failed(e),
        }
    }

    async fn request_new_token(&self) -> ApiResult<String> {
        let response = self
            .transport
            .execute(ApiRequest::post(REFRESH_PATH), None)
            .await?
            .into_result()?;
        let body: TokenResponse = response.json()?;
        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("refresh response carried no accessToken".into()))
    }
}
