use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use echo_grpc::{EchoMode, ServerConfig, ServerSecurity, run, shutdown_token};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Echo the message only
    Message,
    /// Echo the message and the call metadata
    Metadata,
}

impl From<Mode> for EchoMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Message => EchoMode::MessageOnly,
            Mode::Metadata => EchoMode::WithMetadata,
        }
    }
}

/// gRPC echo server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on, e.g. 0.0.0.0:50051
    #[arg(long, env = "LISTEN_ADDR")]
    listen_addr: String,

    /// Server certificate (PEM); enables TLS together with --tls-key
    #[arg(long, env = "TLS_CERT")]
    tls_cert: Option<PathBuf>,

    /// Server private key (PEM)
    #[arg(long, env = "TLS_KEY")]
    tls_key: Option<PathBuf>,

    /// CA bundle used to verify client certificates (mutual TLS)
    #[arg(long, env = "CLIENT_CA")]
    client_ca: Option<PathBuf>,

    #[arg(long, value_enum, env = "ECHO_MODE", default_value = "metadata")]
    mode: Mode,

    /// Do not register the gRPC reflection service
    #[arg(long)]
    no_reflection: bool,

    /// Seconds to wait for in-flight calls on shutdown; 0 waits forever
    #[arg(long, env = "SHUTDOWN_TIMEOUT_SECS", default_value_t = 30)]
    shutdown_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("echo_grpc=info")),
        )
        .init();

    // Variables already set in the environment win over `.env`.
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let security = ServerSecurity::from_files(
        args.tls_cert.as_deref(),
        args.tls_key.as_deref(),
        args.client_ca.as_deref(),
    )
    .wrap_err("Failed to load server credentials")?;

    let config = ServerConfig {
        listen_addr: args.listen_addr,
        security,
        mode: args.mode.into(),
        reflection: !args.no_reflection,
        shutdown_timeout: match args.shutdown_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        },
        response_delay: Duration::ZERO,
    };

    info!(address = %config.listen_addr, "Starting gRPC echo server");

    run(shutdown_token(), config)
        .await
        .inspect_err(|e| error!(error = %e, "exiting"))
        .wrap_err("Failed to run gRPC echo server")?;

    Ok(())
}
