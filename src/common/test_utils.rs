use crate::server::{EchoServer, ServerConfig};
use crate::Result;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawns an echo server on an ephemeral port for tests.
///
/// The listener is bound before this returns, so callers can connect to
/// the returned address immediately. Cancel the returned token to shut the
/// server down and await the handle for its result.
pub async fn spawn_test_server(
    config: ServerConfig,
) -> Result<(JoinHandle<Result<()>>, SocketAddr, CancellationToken)> {
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        ..config
    };

    let server = EchoServer::new(config).bind().await?;
    let addr = server.local_addr();

    let ctx = CancellationToken::new();
    let server_ctx = ctx.clone();
    let server_handle = tokio::spawn(async move { server.serve(server_ctx).await });

    Ok((server_handle, addr, ctx))
}
