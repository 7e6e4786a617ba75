//! Wire layer - turns an `ApiRequest` into bytes on the network
//!
//! `Transport` is the seam between the renewal policy in `ApiClient` and
//! the actual HTTP stack, so the policy can be exercised without a server.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::SET_COOKIE;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::constants::REFRESH_PATH;
use crate::error::{ApiError, ApiResult};
use crate::models::HttpMethod;
use crate::storage::CookieFile;

/// Request body
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
}

/// A backend call, relative to the configured base URL
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Set once the request has been replayed after a token renewal
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    /// True for the token renewal endpoint itself, with or without
    /// leading and trailing slashes
    pub fn is_renewal(&self) -> bool {
        self.path.trim_matches('/') == REFRESH_PATH.trim_matches('/')
    }
}

/// Raw response: status plus undecoded body
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body; an empty body decodes as JSON `null`
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Non-2xx responses become `ApiError::Status`
    pub fn into_result(self) -> ApiResult<RawResponse> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Status {
                status: self.status,
                body: self.text(),
            })
        }
    }
}

pub trait Transport: Send + Sync {
    /// Send one request, attaching `bearer` as the `Authorization` header
    fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> BoxFuture<'_, ApiResult<RawResponse>>;

    /// Drop the renewal cookie, in memory and on disk
    fn forget_cookies(&self) {}
}

/// reqwest-backed transport.
///
/// The jar keeps the HTTP-only renewal cookie set by the backend; nothing
/// outside the client ever reads it. With a [`CookieFile`] attached the
/// cookies scoped to the auth endpoints survive a restart.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    jar: Arc<Jar>,
    /// URL the renewal cookie is sent to
    cookie_url: Url,
    cookie_file: Option<CookieFile>,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let cookie_url = Url::parse(&format!("{}/{}", base_url, REFRESH_PATH.trim_start_matches('/')))
            .map_err(|e| ApiError::Transport(format!("Invalid API URL {}: {}", base_url, e)))?;
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_provider(jar.clone())
            .build()?;
        Ok(ReqwestTransport {
            client,
            base_url,
            jar,
            cookie_url,
            cookie_file: None,
        })
    }

    /// Load cookies saved by an earlier run and keep the file up to date
    pub fn with_cookie_file(mut self, file: CookieFile) -> Self {
        if let Some(header) = file.load() {
            for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                self.jar.add_cookie_str(pair, &self.cookie_url);
            }
            tracing::debug!(path = %file.path().display(), "Loaded saved session cookie");
        }
        self.cookie_file = Some(file);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Cookie header the jar would send to the auth endpoints
    fn auth_cookies(&self) -> Option<String> {
        self.jar
            .cookies(&self.cookie_url)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    fn persist_cookies(&self) {
        let Some(file) = &self.cookie_file else {
            return;
        };
        let result = match self.auth_cookies() {
            Some(header) => file.save(&header),
            None => file.clear(),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Could not save session cookie");
        }
    }
}

impl Transport for ReqwestTransport {
    fn execute(
        &self,
        request: ApiRequest,
        bearer: Option<String>,
    ) -> BoxFuture<'_, ApiResult<RawResponse>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::GET => reqwest::Method::GET,
                HttpMethod::POST => reqwest::Method::POST,
                HttpMethod::PUT => reqwest::Method::PUT,
                HttpMethod::DELETE => reqwest::Method::DELETE,
            };

            let mut req_builder = self.client.request(method, self.url(&request.path));

            if !request.query.is_empty() {
                req_builder = req_builder.query(&request.query);
            }

            if let Some(token) = bearer {
                req_builder = req_builder.bearer_auth(token);
            }

            req_builder = match request.body {
                RequestBody::Empty => req_builder,
                RequestBody::Json(body) => req_builder.json(&body),
                RequestBody::Form(pairs) => req_builder.form(&pairs),
            };

            let resp = req_builder.send().await?;
            let status = resp.status().as_u16();
            if resp.headers().contains_key(SET_COOKIE) {
                self.persist_cookies();
            }
            let body = resp.bytes().await?;

            Ok(RawResponse {
                status,
                body: body.to_vec(),
            })
        })
    }

    fn forget_cookies(&self) {
        if let Some(header) = self.auth_cookies() {
            for name in header.split(';').filter_map(|p| p.split('=').next()).map(str::trim) {
                if !name.is_empty() {
                    self.jar
                        .add_cookie_str(&format!("{}=; Max-Age=0", name), &self.cookie_url);
                }
            }
        }
        if let Some(file) = &self.cookie_file {
            if let Err(e) = file.clear() {
                tracing::warn!(error = %e, "Could not remove session cookie");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_is_renewal() {
        assert!(ApiRequest::post("/auth/refresh").is_renewal());
        assert!(ApiRequest::post("auth/refresh/").is_renewal());
        assert!(ApiRequest::post("auth/refresh").is_renewal());
        assert!(!ApiRequest::post("/auth/refresh-token").is_renewal());
        assert!(!ApiRequest::post("/v2/auth/refresh").is_renewal());
        assert!(!ApiRequest::post("/auth/login").is_renewal());
        assert!(!ApiRequest::get("/users/paging").is_renewal());
    }

    #[test]
    fn test_into_result_maps_status() {
        let ok = RawResponse::new(204, Vec::new()).into_result();
        assert!(ok.is_ok());

        let err = RawResponse::new(500, "boom").into_result().unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let value: Value = RawResponse::new(200, "  ").json().unwrap();
        assert_eq!(value, Value::Null);

        let value: Value = RawResponse::new(200, r#"{"a":1}"#).json().unwrap();
        assert_eq!(value, json!({"a": 1}));

        assert!(RawResponse::new(200, "<html>").json::<Value>().is_err());
    }

    #[test]
    fn test_url_joining() {
        let transport =
            ReqwestTransport::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.url("/users/paging"), "http://localhost:8080/api/users/paging");
        assert_eq!(transport.url("roles/1"), "http://localhost:8080/api/roles/1");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(ReqwestTransport::new("not a url", Duration::from_secs(5)).is_err());
    }

    /// Accept one HTTP/1.1 request and return its head, lowercased
    async fn capture_request_head(listener: TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}")
            .await
            .unwrap();
        String::from_utf8_lossy(&head).to_lowercase()
    }

    #[tokio::test]
    async fn test_saved_cookie_is_sent_after_restart() {
        let dir = tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/api", listener.local_addr().unwrap());

        // first run: the backend hands out the renewal cookie
        let first = ReqwestTransport::new(&base, Duration::from_secs(5))
            .unwrap()
            .with_cookie_file(CookieFile::new(dir.path()));
        first
            .jar
            .add_cookie_str("refresh=abc123; HttpOnly", &first.cookie_url);
        first.persist_cookies();
        drop(first);

        // second run starts from the saved file
        let second = ReqwestTransport::new(&base, Duration::from_secs(5))
            .unwrap()
            .with_cookie_file(CookieFile::new(dir.path()));
        let server = tokio::spawn(capture_request_head(listener));
        let response = second
            .execute(ApiRequest::post(REFRESH_PATH), None)
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let head = server.await.unwrap();
        assert!(head.starts_with("post /api/auth/refresh"));
        assert!(head.contains("cookie: refresh=abc123"), "{head}");
    }

    #[test]
    fn test_forget_cookies_clears_jar_and_file() {
        let dir = tempdir().unwrap();
        let file = CookieFile::new(dir.path());
        file.save("refresh=abc123").unwrap();

        let transport = ReqwestTransport::new("http://localhost:8080/api", Duration::from_secs(5))
            .unwrap()
            .with_cookie_file(file.clone());
        assert_eq!(transport.auth_cookies().as_deref(), Some("refresh=abc123"));

        transport.forget_cookies();
        assert_eq!(transport.auth_cookies(), None);
        assert_eq!(file.load(), None);
    }
}
