use std::net::SocketAddr;

use thiserror::Error;

/// Failures while wiring the process together: settings, database, listeners.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("database error: {message}")]
    Database { message: String },
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl InfraError {
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Migrate(err) => Self::Migration(*err),
            other => Self::database(other.to_string()),
        }
    }
}
