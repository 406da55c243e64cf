//! mfapi.in HTTP client.

use crate::error::{DataError, Result};
use crate::mfapi::response::parse_nav_response;
use crate::nav::SchemeCode;
use crate::provider::{NavProvider, SchemeNav};
use std::time::Duration;

/// mfapi.in base URL
const MFAPI_BASE_URL: &str = "https://api.mfapi.in";

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of immediate re-attempts after a transient failure
const DEFAULT_RETRIES: u32 = 1;

/// User agent sent with every request
const USER_AGENT: &str = concat!("navroll/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`MfApiClient`].
#[derive(Debug, Clone)]
pub struct MfApiConfig {
    /// Base URL without trailing slash (default: `https://api.mfapi.in`)
    pub base_url: String,
    /// Timeout applied to each request (default: 30s)
    pub timeout: Duration,
    /// Immediate re-attempts for transient failures (default: 1)
    pub retries: u32,
    /// User agent header
    pub user_agent: String,
}

impl Default for MfApiConfig {
    fn default() -> Self {
        Self {
            base_url: MFAPI_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Client for the public mfapi.in NAV endpoint.
pub struct MfApiClient {
    client: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl MfApiClient {
    /// Create a new client with default settings (30s timeout, one retry).
    pub fn new() -> Result<Self> {
        Self::with_config(MfApiConfig::default())
    }

    /// Create a new client with custom settings.
    ///
    /// # Example
    /// ```no_run
    /// use navroll_data::{MfApiClient, MfApiConfig};
    /// use std::time::Duration;
    ///
    /// # fn example() -> navroll_data::Result<()> {
    /// let client = MfApiClient::with_config(MfApiConfig {
    ///     timeout: Duration::from_secs(10),
    ///     retries: 0,
    ///     ..MfApiConfig::default()
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(config: MfApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retries: config.retries,
        })
    }

    /// URL of the NAV history for a scheme.
    pub fn scheme_url(&self, scheme_code: &SchemeCode) -> String {
        format!("{}/mf/{}", self.base_url, scheme_code)
    }

    /// Fetch and parse the NAV history once, without retrying.
    async fn fetch_once(&self, scheme_code: &SchemeCode) -> Result<SchemeNav> {
        let url = self.scheme_url(scheme_code);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(DataError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::Http {
                scheme_code: scheme_code.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(DataError::Network)?;
        parse_nav_response(scheme_code, &body)
    }
}

impl NavProvider for MfApiClient {
    async fn fetch_nav_history(&self, scheme_code: &SchemeCode) -> Result<SchemeNav> {
        if scheme_code.is_empty() {
            return Err(DataError::InvalidSchemeCode(scheme_code.to_string()));
        }

        let mut attempt = 0;
        loop {
            match self.fetch_once(scheme_code).await {
                Err(e) if attempt < self.retries && e.is_retryable() => {
                    attempt += 1;
                    tracing::debug!(%scheme_code, attempt, error = %e, "retrying NAV fetch");
                }
                result => return result,
            }
        }
    }
}

impl std::fmt::Debug for MfApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MfApiClient")
            .field("base_url", &self.base_url)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}
