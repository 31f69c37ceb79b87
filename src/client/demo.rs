//! Demo authentication bootstrap
//!
//! Obtains a credential-free token from `/auth/demo-token/` so the client
//! can talk to a development backend without a login.

use crate::error::FinsightError;
use crate::models::DemoTokenResponse;
use crate::session::{token_fingerprint, Session};
use crate::Result;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, info, warn};

pub const DEMO_TOKEN_PATH: &str = "/auth/demo-token/";
pub const CURRENT_USER_PATH: &str = "/auth/me/";

pub struct DemoAuthenticator {
    client: Client,
    base_url: String,
}

impl DemoAuthenticator {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Return a usable token, keeping a valid stored one or fetching a demo token.
    ///
    /// Never fails: problems are logged and yield `None`.
    pub async fn acquire(&self, session: &Session) -> Option<String> {
        if let Some(existing) = session.token().await {
            debug!(fingerprint = %token_fingerprint(&existing), "Validating existing token");
            match self.validate(&existing).await {
                Ok(true) => {
                    debug!("Existing token is valid");
                    return Some(existing);
                }
                Ok(false) => info!("Existing token is invalid, removing"),
                Err(e) => warn!(error = %e, "Could not validate existing token, removing"),
            }
            if let Err(e) = session.clear().await {
                warn!(error = %e, "Failed to clear invalid token");
            }
        }

        match self.fetch_demo_token().await {
            Ok(response) => match session.set_token(&response.token).await {
                Ok(()) => {
                    info!(
                        fingerprint = %token_fingerprint(&response.token),
                        user = response.user.as_ref().map(|u| u.username.as_str()).unwrap_or("-"),
                        "Demo token obtained"
                    );
                    Some(response.token)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to store demo token");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to get demo token");
                None
            }
        }
    }

    /// Check a token against `/auth/me/`
    pub async fn validate(&self, token: &str) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, CURRENT_USER_PATH))
            .header(AUTHORIZATION, format!("Token {}", token))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    pub async fn fetch_demo_token(&self) -> Result<DemoTokenResponse> {
        let url = format!("{}{}", self.base_url, DEMO_TOKEN_PATH);
        debug!(%url, "Requesting demo token");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FinsightError::from_status(status, body));
        }

        let parsed: DemoTokenResponse = serde_json::from_str(&body)?;
        if parsed.token.trim().is_empty() {
            return Err(FinsightError::Unauthorized(
                "demo endpoint returned no token".to_string(),
            ));
        }

        Ok(parsed)
    }
}
