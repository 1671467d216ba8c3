use super::config::ServerConfig;
use super::service::EchoEndpoint;
use crate::handler::EchoHandler;
use crate::proto::{FILE_DESCRIPTOR_SET, echo_service_server::EchoServiceServer};
use crate::{EchoError, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing::{info, warn};

/// Echo server before its listener is bound
///
/// # Examples
///
/// Run until Ctrl-C or SIGTERM:
///
/// ```no_run
/// use echo_grpc::{EchoServer, ServerConfig, shutdown_token};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ServerConfig {
///         listen_addr: "127.0.0.1:50051".to_string(),
///         ..Default::default()
///     };
///
///     let server = EchoServer::new(config).bind().await?;
///     println!("listening on {}", server.local_addr());
///     server.serve(shutdown_token()).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EchoServer {
    config: ServerConfig,
}

impl EchoServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the listening socket. Failure is fatal and never retried.
    pub async fn bind(self) -> Result<BoundServer> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .map_err(|e| EchoError::bind(&self.config.listen_addr, e))?;
        let local_addr = listener.local_addr()?;

        info!(
            address = %local_addr,
            tls = self.config.security.is_tls(),
            mode = ?self.config.mode,
            "Echo server listening"
        );

        Ok(BoundServer {
            listener,
            local_addr,
            config: self.config,
        })
    }
}

/// Echo server owning a bound listener, ready to serve
#[derive(Debug)]
pub struct BoundServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
}

impl BoundServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves calls until `ctx` is cancelled or serving fails.
    ///
    /// Serving and the shutdown watcher run side by side under one scope
    /// token and the first error wins. Cancelling `ctx` stops accepting new
    /// connections while in-flight calls finish, bounded by
    /// `shutdown_timeout`. The listener is closed when this returns.
    pub async fn serve(self, ctx: CancellationToken) -> Result<()> {
        let BoundServer {
            listener,
            local_addr,
            config,
        } = self;

        let mut builder = Server::builder();
        if let Some(tls) = config.security.tls_config() {
            builder = builder.tls_config(tls)?;
        }

        let reflection = if config.reflection {
            Some(
                tonic_reflection::server::Builder::configure()
                    .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
                    .build_v1alpha()?,
            )
        } else {
            None
        };

        let endpoint = EchoEndpoint::new(EchoHandler::new(config.mode), config.response_delay);
        let router = builder
            .add_service(EchoServiceServer::new(endpoint))
            .add_optional_service(reflection);

        let scope = CancellationToken::new();
        let incoming = TcpListenerStream::new(listener);

        let serve = async {
            let server = router.serve_with_incoming_shutdown(incoming, scope.clone().cancelled_owned());
            tokio::pin!(server);

            let result = tokio::select! {
                result = &mut server => result,
                _ = scope.cancelled() => match config.shutdown_timeout {
                    Some(grace) => timeout(grace, &mut server).await.map_err(|_| {
                        warn!(address = %local_addr, timeout = ?grace, "In-flight calls did not drain in time");
                        EchoError::ShutdownTimeout(grace)
                    })?,
                    None => (&mut server).await,
                },
            };

            // Serving ended on its own; release the watcher.
            scope.cancel();
            result.map_err(EchoError::from)
        };

        let watch = async {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!(address = %local_addr, "Shutdown requested, draining in-flight calls");
                    scope.cancel();
                }
                _ = scope.cancelled() => {}
            }
            Ok::<(), EchoError>(())
        };

        tokio::try_join!(serve, watch)?;

        info!(address = %local_addr, "Echo server stopped");
        Ok(())
    }
}

/// Binds `config.listen_addr` and serves until `ctx` is cancelled
pub async fn run(ctx: CancellationToken, config: ServerConfig) -> Result<()> {
    EchoServer::new(config).bind().await?.serve(ctx).await
}
