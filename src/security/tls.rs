use crate::{EchoError, Result};
use std::path::Path;
use tonic::transport::{Certificate, ClientTlsConfig, Identity, ServerTlsConfig};
use tracing::debug;

/// How the client secures its channel
///
/// Built once by the configuration layer and handed to the channel
/// constructor, which never looks inside beyond turning it into a tonic
/// TLS configuration.
#[derive(Debug, Clone, Default)]
pub enum ClientSecurity {
    /// Plaintext HTTP/2
    #[default]
    Insecure,
    /// Server-authenticated TLS; `ca` of `None` trusts the platform roots
    ServerTls {
        ca: Option<Certificate>,
        domain: Option<String>,
    },
    /// TLS with a client identity presented to the server
    MutualTls {
        ca: Option<Certificate>,
        identity: Identity,
        domain: Option<String>,
    },
}

impl ClientSecurity {
    /// Resolves client credentials from command line style inputs.
    ///
    /// Without `tls` every other input is ignored. A client identity is only
    /// used when both `cert` and `key` are given; giving one without the
    /// other is a configuration error.
    pub fn from_files(
        tls: bool,
        root_ca: Option<&Path>,
        cert: Option<&Path>,
        key: Option<&Path>,
        domain: Option<String>,
    ) -> Result<Self> {
        if !tls {
            return Ok(ClientSecurity::Insecure);
        }

        let ca = root_ca.map(read_pem).transpose()?.map(Certificate::from_pem);

        match (cert, key) {
            (Some(cert), Some(key)) => Ok(ClientSecurity::MutualTls {
                ca,
                identity: Identity::from_pem(read_pem(cert)?, read_pem(key)?),
                domain,
            }),
            (None, None) => Ok(ClientSecurity::ServerTls { ca, domain }),
            _ => Err(EchoError::Config(
                "client certificate and client key must be given together".to_string(),
            )),
        }
    }

    pub fn is_tls(&self) -> bool {
        !matches!(self, ClientSecurity::Insecure)
    }

    /// URI scheme matching this security mode
    pub fn scheme(&self) -> &'static str {
        if self.is_tls() { "https" } else { "http" }
    }

    pub(crate) fn tls_config(&self) -> Option<ClientTlsConfig> {
        let (ca, identity, domain) = match self {
            ClientSecurity::Insecure => return None,
            ClientSecurity::ServerTls { ca, domain } => (ca, None, domain),
            ClientSecurity::MutualTls {
                ca,
                identity,
                domain,
            } => (ca, Some(identity), domain),
        };

        let mut config = ClientTlsConfig::new();
        config = match ca {
            Some(ca) => config.ca_certificate(ca.clone()),
            None => config.with_native_roots(),
        };
        if let Some(identity) = identity {
            config = config.identity(identity.clone());
        }
        if let Some(domain) = domain {
            config = config.domain_name(domain.clone());
        }
        Some(config)
    }
}

/// How the server secures its listener
#[derive(Debug, Clone, Default)]
pub enum ServerSecurity {
    /// Plaintext HTTP/2
    #[default]
    Insecure,
    /// TLS with the server's identity
    ServerTls { identity: Identity },
    /// TLS that also requires clients to present a certificate signed by `client_ca`
    MutualTls {
        identity: Identity,
        client_ca: Certificate,
    },
}

impl ServerSecurity {
    /// Resolves server credentials from certificate/key paths.
    ///
    /// No paths means plaintext. A `client_ca` without a server identity is
    /// rejected, since client authentication only exists on top of TLS.
    pub fn from_files(
        cert: Option<&Path>,
        key: Option<&Path>,
        client_ca: Option<&Path>,
    ) -> Result<Self> {
        let identity = match (cert, key) {
            (Some(cert), Some(key)) => Identity::from_pem(read_pem(cert)?, read_pem(key)?),
            (None, None) if client_ca.is_none() => return Ok(ServerSecurity::Insecure),
            (None, None) => {
                return Err(EchoError::Config(
                    "client CA requires a server certificate and key".to_string(),
                ));
            }
            _ => {
                return Err(EchoError::Config(
                    "server certificate and key must be given together".to_string(),
                ));
            }
        };

        Ok(match client_ca {
            Some(path) => ServerSecurity::MutualTls {
                identity,
                client_ca: Certificate::from_pem(read_pem(path)?),
            },
            None => ServerSecurity::ServerTls { identity },
        })
    }

    pub fn is_tls(&self) -> bool {
        !matches!(self, ServerSecurity::Insecure)
    }

    pub(crate) fn tls_config(&self) -> Option<ServerTlsConfig> {
        match self {
            ServerSecurity::Insecure => None,
            ServerSecurity::ServerTls { identity } => {
                Some(ServerTlsConfig::new().identity(identity.clone()))
            }
            ServerSecurity::MutualTls {
                identity,
                client_ca,
            } => Some(
                ServerTlsConfig::new()
                    .identity(identity.clone())
                    .client_ca_root(client_ca.clone()),
            ),
        }
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    debug!(path = %path.display(), "Loading PEM file");
    std::fs::read(path).map_err(|e| EchoError::Tls(format!("failed to read {}: {e}", path.display())))
}
