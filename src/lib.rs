use std::time::Duration;
use thiserror::Error;

/// Error types for the echo-grpc library
#[derive(Error, Debug)]
pub enum EchoError {
    /// The listening socket could not be bound (address in use, permission denied, ...)
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The serving activity failed for a reason unrelated to shutdown
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The call context carried no metadata container at all
    #[error("failed to get metadata")]
    MetadataUnavailable,

    /// The client could not reach the server or the TLS handshake failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The cancellation signal fired before the operation completed
    #[error("operation cancelled")]
    Cancelled,

    /// The server answered with a non-OK status
    #[error("call failed: {}: {}", .0.code(), .0.message())]
    CallFailed(tonic::Status),

    /// In-flight calls did not drain within the configured grace period
    #[error("graceful shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),

    /// Certificates or keys could not be loaded
    #[error("TLS error: {0}")]
    Tls(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Reflection service could not be built from the descriptor set
    #[error("reflection error: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),

    /// Other I/O errors (reading the bound address, ...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EchoError {
    pub(crate) fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        EchoError::Bind {
            addr: addr.into(),
            source,
        }
    }
}

impl From<EchoError> for tonic::Status {
    fn from(err: EchoError) -> Self {
        match err {
            EchoError::MetadataUnavailable => tonic::Status::data_loss(err.to_string()),
            EchoError::CallFailed(status) => status,
            EchoError::Cancelled => tonic::Status::cancelled(err.to_string()),
            other => tonic::Status::internal(other.to_string()),
        }
    }
}

/// Result type for the echo-grpc library
pub type Result<T> = std::result::Result<T, EchoError>;

pub mod client;
pub mod common;
pub mod handler;
pub mod proto;
pub mod security;
pub mod server;

// Re-export main types for convenience
pub use client::{ClientConfig, ClientConfigBuilder, invoke, render};
pub use common::shutdown_token;
pub use handler::{EchoHandler, EchoMode};
pub use proto::{EchoRequest, EchoResponse, Metadata, MetadataItem};
pub use security::{ClientSecurity, ServerSecurity};
pub use server::{BoundServer, EchoServer, ServerConfig, run};
pub use tokio_util::sync::CancellationToken;
