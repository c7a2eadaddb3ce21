//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients with an
//! optional per-request timeout.

use std::time::Duration;

/// Build a `reqwest::Client`, optionally bounded by a request timeout.
///
/// The mediator also applies its own per-call deadline; the client-level
/// timeout is the transport-layer backstop so a stuck connection can never
/// outlive the attempt that issued it.
pub fn build_http_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }
    builder.build().expect("failed to build reqwest client")
}
