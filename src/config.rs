use std::time::Duration;

use bon::Builder;
use url::Url;

use crate::error::ConnectError;

/// Server address used when `ACTS_URL` is not set.
pub const DEFAULT_URL: &str = "http://127.0.0.1:10080";

/// Configuration for a [`Channel`](crate::Channel).
#[derive(Debug, Clone, Builder)]
pub struct ChannelConfig {
    /// Server address, e.g. `http://127.0.0.1:10080`.
    /// A bare `host:port` is treated as plaintext `http`.
    #[builder(into)]
    pub url: String,

    /// Timeout for establishing the connection.
    #[builder(default = Duration::from_secs(5))]
    pub connect_timeout: Duration,

    /// Deadline applied to every unary call. Streams are not affected.
    pub timeout: Option<Duration>,

    /// Defer connecting until the first call instead of connecting on construction.
    #[builder(default)]
    pub lazy: bool,
}

impl ChannelConfig {
    /// Load the configuration from the environment.
    ///
    /// Reads `ACTS_URL`, falling back to [`DEFAULT_URL`].
    pub fn from_env() -> Self {
        let url = std::env::var("ACTS_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self::builder().url(url).build()
    }

    /// The validated server url, with `http://` added when no scheme was given.
    pub fn endpoint_url(&self) -> Result<Url, ConnectError> {
        let raw = self.url.trim();
        let normalized = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };

        let url = Url::parse(&normalized).map_err(|source| ConnectError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConnectError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl From<&str> for ChannelConfig {
    fn from(url: &str) -> Self {
        Self::builder().url(url).build()
    }
}

impl From<String> for ChannelConfig {
    fn from(url: String) -> Self {
        Self::builder().url(url).build()
    }
}
