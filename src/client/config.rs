use crate::security::ClientSecurity;
use std::time::Duration;

/// Configuration for a single client invocation
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address, either `host:port` or a full `http(s)://` URI
    pub server_addr: String,
    /// Credentials used to secure the channel
    pub security: ClientSecurity,
    /// Extra metadata attached to the call, in order
    pub metadata: Vec<(String, String)>,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:50051".to_string(),
            security: ClientSecurity::Insecure,
            metadata: Vec::new(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            ..Default::default()
        }
    }

    /// URI handed to the channel, adding a scheme that matches the
    /// security mode when the address has none
    pub fn endpoint_uri(&self) -> String {
        if self.server_addr.contains("://") {
            self.server_addr.clone()
        } else {
            format!("{}://{}", self.security.scheme(), self.server_addr)
        }
    }
}

/// Builder for client configuration
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(server_addr),
        }
    }

    pub fn security(mut self, security: ClientSecurity) -> Self {
        self.config.security = security;
        self
    }

    /// Appends one metadata value; repeating a key adds another value
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.metadata.push((key.into(), value.into()));
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
