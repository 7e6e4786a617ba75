//! In-memory backend used by the pipeline and guard tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

use crate::constants::{LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH};
use crate::error::ApiResult;
use crate::models::HttpMethod;
use crate::network::transport::{ApiRequest, RawResponse, Transport};

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub bearer: Option<String>,
    pub retried: bool,
}

/// Accepts any token it has issued (or was told to accept); everything
/// else gets a 401. `/auth/refresh` mints `token-1`, `token-2`, ...
#[derive(Default)]
pub struct FakeBackend {
    valid_tokens: Mutex<HashSet<String>>,
    routes: Mutex<HashMap<String, RawResponse>>,
    refresh_fails: AtomicBool,
    issued: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
    cookies_forgotten: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept_token(&self, token: &str) {
        self.valid_tokens.lock().unwrap().insert(token.to_string());
    }

    /// Response served to authorized calls on `path`
    pub fn route(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), RawResponse::new(status, body));
    }

    pub fn fail_refresh(&self) {
        self.refresh_fails.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// How often the client dropped the renewal cookie
    pub fn cookies_forgotten(&self) -> usize {
        self.cookies_forgotten.load(Ordering::SeqCst)
    }

    pub fn count(&self, path: &str) -> usize {
        self.calls().iter().filter(|c| c.path == path).count()
    }

    fn respond(&self, request: &ApiRequest, bearer: Option<&str>) -> RawResponse {
        let routed = self.routes.lock().unwrap().get(&request.path).cloned();
        match request.path.as_str() {
            REFRESH_PATH => {
                if self.refresh_fails.load(Ordering::SeqCst) {
                    return RawResponse::new(401, "refresh cookie rejected");
                }
                let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
                let token = format!("token-{}", n);
                self.accept_token(&token);
                RawResponse::new(200, format!(r#"{{"accessToken":"{}"}}"#, token))
            }
            LOGIN_PATH | LOGOUT_PATH => {
                routed.unwrap_or_else(|| RawResponse::new(200, r#"{"accessToken":"login-token"}"#))
            }
            _ => {
                let authorized = bearer
                    .map(|t| self.valid_tokens.lock().unwrap().contains(t))
                    .unwrap_or(false);
                if !authorized {
                    return RawResponse::new(401, "token expired");
                }
                routed.unwrap_or_else(|| RawResponse::new(200, "{}"))
            }
        }
    }
}

impl Transport for FakeBackend {
    fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> BoxFuture<'_, ApiResult<RawResponse>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(RecordedCall {
                method: request.method,
                path: request.path.clone(),
                bearer: bearer.clone(),
                retried: request.retried,
            });
            // let concurrent callers interleave like real network I/O
            tokio::task::yield_now().await;
            Ok(self.respond(&request, bearer.as_deref()))
        })
    }

    fn forget_cookies(&self) {
        self.cookies_forgotten.fetch_add(1, Ordering::SeqCst);
    }
}
