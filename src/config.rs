use std::time::Duration;

use url::Url;

use crate::video::VideoError;

pub const DEFAULT_BASE_URL: &str = "https://wxchannel.funzm.com";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Upstream access for the video listing API. Passed to the adapter explicitly.
#[derive(Clone, Debug)]
pub struct WechatConfig {
    pub token: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for WechatConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl WechatConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(token) = std::env::var("WECHAT_TOKEN") {
            if !token.is_empty() {
                cfg.token = Some(token);
            }
        }
        if let Ok(base) = std::env::var("WECHAT_BASE_URL") {
            cfg.base_url = base;
        }
        if let Ok(timeout) = std::env::var("WECHAT_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        cfg
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn resolve_token(&self) -> Result<&str, VideoError> {
        self.token
            .as_deref()
            .ok_or_else(|| VideoError::Config("WECHAT_TOKEN is not set".to_string()))
    }

    /// Base URL without trailing slash; rejects anything that is not http(s).
    pub fn endpoint_base(&self) -> Result<&str, VideoError> {
        let trimmed = self.base_url.trim_end_matches('/');
        let parsed = Url::parse(trimmed)
            .map_err(|e| VideoError::Config(format!("invalid base url {}: {e}", self.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(VideoError::Config(format!("unsupported scheme in base url: {}", self.base_url)));
        }
        Ok(trimmed)
    }
}
