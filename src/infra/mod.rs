//! Infrastructure adapters and runtime bootstrap.

pub mod db;
pub mod email;
pub mod error;
pub mod http;
pub mod storage;
pub mod telemetry;

use std::time::Duration;

use reqwest::Client;

use self::error::InfraError;

pub fn user_agent() -> &'static str {
    concat!("jdigital/", env!("CARGO_PKG_VERSION"))
}

/// Shared outbound HTTP client for email and storage providers.
pub fn http_client() -> Result<Client, InfraError> {
    Client::builder()
        .user_agent(user_agent())
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|err| InfraError::configuration(format!("failed to build http client: {err}")))
}
