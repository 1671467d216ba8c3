use crate::handler::EchoMode;
use crate::security::ServerSecurity;
use std::time::Duration;

/// Configuration for the echo server run-loop
///
/// # Examples
///
/// ```
/// use echo_grpc::{EchoMode, ServerConfig};
/// use std::time::Duration;
///
/// let config = ServerConfig {
///     listen_addr: "127.0.0.1:50051".to_string(),
///     mode: EchoMode::MessageOnly,
///     shutdown_timeout: Some(Duration::from_secs(5)),
///     ..Default::default()
/// };
/// assert!(config.reflection);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to (`host:port`)
    pub listen_addr: String,
    /// Credentials applied to every accepted connection
    pub security: ServerSecurity,
    /// Response shape produced by the handler
    pub mode: EchoMode,
    /// Whether to also serve the gRPC reflection service
    pub reflection: bool,
    /// Upper bound on draining in-flight calls after shutdown is requested;
    /// `None` waits indefinitely
    pub shutdown_timeout: Option<Duration>,
    /// Artificial latency added before each reply
    pub response_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:0".to_string(), // Use port 0 for testing
            security: ServerSecurity::Insecure,
            mode: EchoMode::WithMetadata,
            reflection: true,
            shutdown_timeout: Some(Duration::from_secs(30)),
            response_delay: Duration::ZERO,
        }
    }
}
