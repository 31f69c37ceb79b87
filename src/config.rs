//! Client configuration
//!
//! Loaded from the environment (after `.env`, when present).

use crate::error::FinsightError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the REST client and its session
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub api_base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Token file; in-memory token storage when `None`
    pub token_file: Option<PathBuf>,
    /// Bootstrap a demo token and retry once on 401 for finance endpoints
    pub demo_auth: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_file: None,
            demo_auth: false,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            ..Self::default()
        }
    }

    /// Load configuration from process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("FINSIGHT_API_URL")
            .or_else(|| lookup("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(FinsightError::Config(format!(
                "API URL must be http(s): {}",
                api_base_url
            )));
        }

        let timeout_secs = match lookup("FINSIGHT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                FinsightError::Config(format!("FINSIGHT_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let token_file = lookup("FINSIGHT_TOKEN_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let demo_auth = match lookup("FINSIGHT_DEMO_AUTH") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                FinsightError::Config(format!("FINSIGHT_DEMO_AUTH is not a boolean: {}", raw))
            })?,
            None => false,
        };

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url),
            timeout: Duration::from_secs(timeout_secs),
            token_file,
            demo_auth,
        })
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
