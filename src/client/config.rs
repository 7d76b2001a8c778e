// src/client/config.rs

use std::env;

use reqwest::Url;

use crate::client::error::{ClientError, ClientResult};

/// Hosts where auth failures surface as plain HTTP errors instead of a login redirect.
pub const DEFAULT_DEV_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "0.0.0.0"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, e.g. `https://oddities.market`.
    pub base_url: String,

    /// JWT sent as a bearer token. Takes precedence over `session_cookie`.
    pub token: Option<String>,

    /// Value of the `session` cookie when no token is configured.
    pub session_cookie: Option<String>,

    pub dev_hosts: Vec<String>,

    /// Appended to `base_url` to build the login redirect.
    pub login_path: String,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            session_cookie: None,
            dev_hosts: DEFAULT_DEV_HOSTS.iter().map(|h| h.to_string()).collect(),
            login_path: "/api/login".to_string(),
            timeout: 30,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_session_cookie(mut self, session: impl Into<String>) -> Self {
        self.session_cookie = Some(session.into());
        self
    }

    pub fn with_dev_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dev_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// `MARKET_API_URL` (required), `MARKET_API_TOKEN`, `MARKET_SESSION`.
    pub fn from_env() -> ClientResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let base_url = lookup("MARKET_API_URL")
            .ok_or_else(|| ClientError::Config("MARKET_API_URL must be set".to_string()))?;
        Url::parse(&base_url).map_err(|e| ClientError::Config(format!("invalid MARKET_API_URL '{base_url}': {e}")))?;

        let mut config = Self::new(base_url);
        config.token = lookup("MARKET_API_TOKEN").filter(|t| !t.is_empty());
        config.session_cookie = lookup("MARKET_SESSION").filter(|s| !s.is_empty());
        Ok(config)
    }

    /// True when the API host is one of `dev_hosts`.
    pub fn is_dev_host(&self) -> bool {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
            .is_some_and(|host| self.dev_hosts.iter().any(|dev| dev.eq_ignore_ascii_case(&host)))
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.login_path)
    }
}
