//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

use crate::error::LlmError;

/// Build the HTTP client used for collaborator round-trips.
///
/// rustls TLS, `specheck/{version}` user-agent, redirect limit 10, and the
/// caller's connect and whole-request timeouts.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn client_with_timeouts(
    connect: Duration,
    request: Duration,
) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .connect_timeout(connect)
        .timeout(request)
        .user_agent(concat!("specheck/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(LlmError::Http)
}
