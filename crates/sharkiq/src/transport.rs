// HTTP transport configuration shared by both call surfaces.

use std::time::Duration;

use crate::error::Error;

/// Configuration for building the underlying `reqwest::Client`.
///
/// No retry or cancellation policy is layered on top: the transport's own
/// timeout is the only deadline, and failures propagate to the caller as-is.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("sharkiq/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(Error::Transport)
    }
}
