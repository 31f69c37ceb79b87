//! Shared request pipeline for the REST clients
//!
//! Attaches the session token, classifies failures, clears the token on
//! 401 and, under the demo-fallback policy, bootstraps a demo token and
//! retries the request once.

use crate::client::demo::DemoAuthenticator;
use crate::config::ClientConfig;
use crate::error::FinsightError;
use crate::session::{token_fingerprint, Session};
use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// How a client obtains and recovers its credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Fail with `AuthenticationRequired` when no token is held
    RequireToken,
    /// Bootstrap a demo token when missing and retry once after a 401
    DemoFallback,
}

/// A request description that can be replayed for the single retry
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Skip token requirements (login, register, health)
    pub public: bool,
    /// Explicit `Authorization` value, bypassing the session
    pub authorization: Option<String>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            public: false,
            authorization: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self> {
        self.query = query_pairs(query)?;
        Ok(self)
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn authorization(mut self, value: Option<String>) -> Self {
        self.authorization = value;
        self
    }
}

/// Flatten a serializable struct into query-string pairs, skipping nulls
pub fn query_pairs<Q: Serialize + ?Sized>(query: &Q) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(query)?;
    let Value::Object(map) = value else {
        return Err(FinsightError::InvalidInput(
            "query parameters must serialize to an object".to_string(),
        ));
    };

    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect())
}

pub(crate) fn build_http_client(config: &ClientConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(Client::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(8)
        .build()?)
}

pub struct Transport {
    http: Client,
    root_url: String,
    session: Arc<Session>,
    policy: AuthPolicy,
    demo: DemoAuthenticator,
    initialized: AtomicBool,
}

impl Transport {
    /// `root_url` prefixes every request path; `auth_base_url` hosts `/auth/*`
    pub fn new(
        http: Client,
        root_url: impl Into<String>,
        auth_base_url: impl Into<String>,
        session: Arc<Session>,
        policy: AuthPolicy,
    ) -> Self {
        let demo = DemoAuthenticator::new(http.clone(), auth_base_url);
        Self {
            http,
            root_url: root_url.into().trim_end_matches('/').to_string(),
            session,
            policy,
            demo,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn policy(&self) -> AuthPolicy {
        self.policy
    }

    pub fn demo(&self) -> &DemoAuthenticator {
        &self.demo
    }

    /// Run the demo bootstrap once per transport when no token is held
    pub async fn ensure_authenticated(&self) {
        // Flagged before the bootstrap completes: a request racing the first
        // one goes out without a token and relies on the 401 retry.
        if self.initialized.swap(true, Ordering::AcqRel) {
            return;
        }
        if !self.session.is_authenticated().await {
            info!("No auth token found, initializing demo authentication");
            if self.demo.acquire(&self.session).await.is_none() {
                warn!("Failed to initialize demo authentication");
            }
        }
    }

    /// Force the next request to re-run the demo bootstrap
    pub async fn reinitialize(&self) {
        self.initialized.store(false, Ordering::Release);
        self.ensure_authenticated().await;
    }

    pub async fn request<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let text = self.execute(&spec).await?;
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    pub async fn request_empty(&self, spec: RequestSpec) -> Result<()> {
        self.execute(&spec).await.map(|_| ())
    }

    /// Send a request through the auth pipeline and return the body text
    pub async fn execute(&self, spec: &RequestSpec) -> Result<String> {
        if !spec.public {
            match self.policy {
                AuthPolicy::RequireToken => {
                    if spec.authorization.is_none() && !self.session.is_authenticated().await {
                        return Err(FinsightError::AuthenticationRequired);
                    }
                }
                AuthPolicy::DemoFallback => self.ensure_authenticated().await,
            }
        }

        let (status, body) = self.dispatch(spec).await?;
        if status != StatusCode::UNAUTHORIZED {
            return finish(status, body);
        }

        self.handle_unauthorized().await;

        if self.policy == AuthPolicy::DemoFallback && !spec.public {
            info!(path = %spec.path, "Authentication error, trying demo authentication");
            if self.demo.acquire(&self.session).await.is_some() {
                let (status, body) = self.dispatch(spec).await?;
                if status == StatusCode::UNAUTHORIZED {
                    self.handle_unauthorized().await;
                }
                return finish(status, body);
            }
        }

        finish(status, body)
    }

    async fn handle_unauthorized(&self) {
        if self.session.is_logging_out() {
            return;
        }
        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Failed to clear token after 401");
        }
    }

    async fn dispatch(&self, spec: &RequestSpec) -> Result<(StatusCode, String)> {
        let url = format!("{}{}", self.root_url, spec.path);
        let request_id = Uuid::new_v4();

        let mut builder = self
            .http
            .request(spec.method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if !spec.query.is_empty() {
            builder = builder.query(&spec.query);
        }

        let authorization = match &spec.authorization {
            Some(value) => Some(value.clone()),
            None => self.session.authorization_header().await,
        };
        let fingerprint = authorization
            .as_deref()
            .and_then(|h| h.strip_prefix("Token "))
            .map(token_fingerprint);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }

        if let Some(body) = &spec.body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            warn!(%request_id, method = %spec.method, path = %spec.path, error = %e, "Request failed");
            FinsightError::HttpError(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        debug!(
            %request_id,
            method = %spec.method,
            path = %spec.path,
            status = status.as_u16(),
            token = fingerprint.as_deref().unwrap_or("-"),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "API request completed"
        );

        Ok((status, body))
    }
}

fn finish(status: StatusCode, body: String) -> Result<String> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(FinsightError::from_status(status, body))
    }
}
