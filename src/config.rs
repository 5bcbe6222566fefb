// src/config.rs
// =============================================================================
// Settings shared by the page fetch and the link checks.
//
// Everything that decides how we talk to remote servers lives here: the
// User-Agent we announce, how long we wait, how many requests may be in
// flight, and how redirects and TLS certificates are treated. The HTTP client
// built from this config is reused by every request of a run so all requests
// share one connection pool.
// =============================================================================

use reqwest::{redirect, Client};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "LinkCheckerBot/1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENT: usize = 50;
pub const DEFAULT_PER_HOST_LIMIT: usize = 10;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const DEFAULT_MAX_LINKS: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("max concurrent requests must be greater than zero")]
    ZeroConcurrency,
    #[error("per-host limit must be greater than zero")]
    ZeroPerHostLimit,
}

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub user_agent: String,
    /// Applies to each request on its own; there is no deadline for a whole run.
    pub timeout: Duration,
    pub max_concurrent: usize,
    pub per_host_limit: usize,
    pub follow_redirects: bool,
    /// Ignored when `follow_redirects` is false.
    pub max_redirects: usize,
    pub verify_tls: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            per_host_limit: DEFAULT_PER_HOST_LIMIT,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            verify_tls: true,
        }
    }
}

impl CheckerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.per_host_limit == 0 {
            return Err(ConfigError::ZeroPerHostLimit);
        }
        Ok(())
    }

    fn redirect_policy(&self) -> redirect::Policy {
        if self.follow_redirects {
            redirect::Policy::limited(self.max_redirects)
        } else {
            redirect::Policy::none()
        }
    }

    /// Builds the HTTP client used for every request of a run.
    pub fn build_client(&self) -> reqwest::Result<Client> {
        Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.timeout)
            .redirect(self.redirect_policy())
            .danger_accept_invalid_certs(!self.verify_tls)
            .build()
    }
}
