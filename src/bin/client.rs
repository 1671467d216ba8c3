use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use echo_grpc::{ClientConfigBuilder, ClientSecurity, invoke, render, shutdown_token};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// gRPC echo client: sends one message and prints the reply
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Server address, e.g. localhost:50051
    #[arg(long, env = "SERVER_ADDR")]
    server_addr: String,

    /// Use TLS
    #[arg(long, env = "TLS")]
    tls: bool,

    /// Client certificate (PEM) for mutual TLS
    #[arg(long, env = "CLIENT_CERT")]
    client_cert: Option<PathBuf>,

    /// Client private key (PEM) for mutual TLS
    #[arg(long, env = "CLIENT_KEY")]
    client_key: Option<PathBuf>,

    /// CA bundle used to verify the server instead of the platform roots
    #[arg(long, env = "CLIENT_ROOT_CA")]
    client_root_ca: Option<PathBuf>,

    /// Override the name checked against the server certificate
    #[arg(long, env = "DOMAIN_NAME")]
    domain_name: Option<String>,

    /// Extra call metadata as key=value; may be repeated
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Message to send
    #[arg(default_value = "")]
    message: String,
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    Ok((key.trim().to_lowercase(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("echo_grpc=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Variables already set in the environment win over `.env`.
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let security = ClientSecurity::from_files(
        args.tls,
        args.client_root_ca.as_deref(),
        args.client_cert.as_deref(),
        args.client_key.as_deref(),
        args.domain_name,
    )
    .wrap_err("Failed to load client credentials")?;

    let config = args
        .headers
        .into_iter()
        .fold(
            ClientConfigBuilder::new(args.server_addr).security(security),
            |builder, (key, value)| builder.header(key, value),
        )
        .build();

    let response = invoke(&config, &args.message, &shutdown_token())
        .await
        .inspect_err(|e| error!(error = %e, "exiting"))
        .wrap_err("Echo call failed")?;

    print!("{}", render(&response));

    Ok(())
}
