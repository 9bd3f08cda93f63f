//! Client configuration.

use std::time::Duration;

/// Base URL of the public Zillow Web Services endpoints.
pub const DEFAULT_BASE_URL: &str = "https://www.zillow.com/webservice";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixed configuration for a [`ValuationClient`](crate::ValuationClient).
///
/// The client holds no other state between calls.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the endpoint paths are appended to. Override to point at a
    /// proxy or a test server.
    pub base_url: String,
    /// Timeout applied to each HTTP request.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
