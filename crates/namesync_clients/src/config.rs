//! Configuration for the platform clients.

use crate::error::{ClientError, ClientResult};
use rand::Rng;
use std::fmt;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Default page size for paginated UniFi requests.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Configuration shared by both HTTP clients.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl HttpConfig {
    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// How a client retries rate-limited, server-side and connection
/// failures.
///
/// The wait doubles with every failed attempt, starting at
/// `initial_delay` and never exceeding `max_delay`. With `jitter` set, up
/// to a quarter of the wait is added at random.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts per request, the first one included.
    pub max_attempts: u32,
    /// Wait after the first failure.
    pub initial_delay: Duration,
    /// Upper bound on any single wait, `Retry-After` included.
    pub max_delay: Duration,
    /// Adds random jitter to each wait.
    pub jitter: bool,
}

impl RetryConfig {
    /// `max_attempts` tries per request, waiting 500ms, 1s, 2s ... up to 30s.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }

    /// Sets the wait after the first failure.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Turns jitter on or off.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Wait before retrying after `failures` failed attempts.
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        let Some(doublings) = failures.checked_sub(1) else {
            return Duration::ZERO;
        };
        let factor = 1u32.checked_shl(doublings).unwrap_or(u32::MAX);
        let delay = self.initial_delay.saturating_mul(factor).min(self.max_delay);

        if self.jitter {
            delay + delay.mul_f64(rand::thread_rng().gen_range(0.0..0.25))
        } else {
            delay
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Connection settings for the Firewalla MSP API.
#[derive(Clone)]
pub struct FirewallaConfig {
    /// Base URL, e.g. `https://mydomain.firewalla.net`.
    pub host: String,
    /// Personal access token.
    pub api_token: String,
    /// Restricts requests to one box when set.
    pub box_id: Option<String>,
    /// HTTP settings.
    pub http: HttpConfig,
}

impl FirewallaConfig {
    /// Creates a new Firewalla configuration.
    pub fn new(host: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_token: api_token.into(),
            box_id: None,
            http: HttpConfig::default(),
        }
    }

    /// Scopes requests to a single box.
    pub fn with_box_id(mut self, box_id: impl Into<String>) -> Self {
        self.box_id = Some(box_id.into());
        self
    }

    /// Sets the HTTP settings.
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        validate_host("FIREWALLA_HOST", &self.host)?;
        require_non_empty("FIREWALLA_API_TOKEN", &self.api_token)?;
        if let Some(box_id) = &self.box_id {
            require_non_empty("FIREWALLA_BOX_ID", box_id)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FirewallaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirewallaConfig")
            .field("host", &self.host)
            .field("api_token", &"<redacted>")
            .field("box_id", &self.box_id)
            .field("http", &self.http)
            .finish()
    }
}

/// Connection settings for the UniFi Network integration API.
#[derive(Clone)]
pub struct UnifiConfig {
    /// Base URL of the integration API.
    pub host: String,
    /// API key.
    pub api_key: String,
    /// Site UUID.
    pub site_id: String,
    /// Page size for client listing.
    pub page_size: u32,
    /// HTTP settings.
    pub http: HttpConfig,
}

impl UnifiConfig {
    /// Creates a new UniFi configuration.
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        site_id: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            site_id: site_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            http: HttpConfig::default(),
        }
    }

    /// Sets the page size for client listing.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the HTTP settings.
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        validate_host("UNIFI_HOST", &self.host)?;
        require_non_empty("UNIFI_API_KEY", &self.api_key)?;
        Uuid::parse_str(&self.site_id).map_err(|_| {
            ClientError::InvalidConfig("UNIFI_SITE_ID must be a valid UUID".into())
        })?;
        if self.page_size == 0 {
            return Err(ClientError::InvalidConfig(
                "page size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for UnifiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnifiConfig")
            .field("host", &self.host)
            .field("api_key", &"<redacted>")
            .field("site_id", &self.site_id)
            .field("page_size", &self.page_size)
            .field("http", &self.http)
            .finish()
    }
}

fn validate_host(key: &str, host: &str) -> ClientResult<Url> {
    let url = Url::parse(host)
        .map_err(|e| ClientError::InvalidConfig(format!("Invalid host URL for {key}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidConfig(format!(
            "Invalid host URL for {key}: unsupported scheme {other}"
        ))),
    }
}

fn require_non_empty(key: &str, value: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Err(ClientError::InvalidConfig(format!("{key} must not be empty")));
    }
    Ok(())
}
