use super::config::ClientConfig;
use crate::proto::echo_service_client::EchoServiceClient;
use crate::proto::{EchoRequest, EchoResponse};
use crate::{EchoError, Result};
use tokio_util::sync::CancellationToken;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue, BinaryMetadataKey, BinaryMetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};
use tracing::debug;

/// Sends one `Echo` call and returns the server's response.
///
/// Returns [`EchoError::Cancelled`] without touching the network when `ctx`
/// is already cancelled, and aborts the call if `ctx` fires while waiting.
/// There are no retries.
///
/// # Examples
///
/// ```no_run
/// use echo_grpc::{ClientConfig, invoke, render, shutdown_token};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::new("localhost:50051");
///     let response = invoke(&config, "hello", &shutdown_token()).await?;
///     print!("{}", render(&response));
///     Ok(())
/// }
/// ```
pub async fn invoke(
    config: &ClientConfig,
    message: &str,
    ctx: &CancellationToken,
) -> Result<EchoResponse> {
    if ctx.is_cancelled() {
        return Err(EchoError::Cancelled);
    }

    let request = build_request(config, message)?;
    let mut client = EchoServiceClient::new(connect_lazy(config)?);

    debug!(
        server = %config.server_addr,
        tls = config.security.is_tls(),
        size = message.len(),
        "Sending echo call"
    );

    tokio::select! {
        biased;
        _ = ctx.cancelled() => Err(EchoError::Cancelled),
        result = client.echo(request) => result
            .map(|response| response.into_inner())
            .map_err(classify_status),
    }
}

fn connect_lazy(config: &ClientConfig) -> Result<Channel> {
    let uri = config.endpoint_uri();
    let mut endpoint = Endpoint::from_shared(uri.clone())
        .map_err(|e| EchoError::Config(format!("invalid server address {uri}: {e}")))?
        .connect_timeout(config.connect_timeout);

    if let Some(tls) = config.security.tls_config() {
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|e| EchoError::Tls(e.to_string()))?;
    }

    Ok(endpoint.connect_lazy())
}

fn build_request(config: &ClientConfig, message: &str) -> Result<Request<EchoRequest>> {
    let mut request = Request::new(EchoRequest {
        message: message.to_string(),
    });

    for (key, value) in &config.metadata {
        let invalid = |e: &dyn std::fmt::Display| {
            EchoError::Config(format!("invalid metadata {key}={value}: {e}"))
        };

        if key.ends_with("-bin") {
            let key = BinaryMetadataKey::from_bytes(key.as_bytes()).map_err(|e| invalid(&e))?;
            request
                .metadata_mut()
                .append_bin(key, BinaryMetadataValue::from_bytes(value.as_bytes()));
        } else {
            let key = AsciiMetadataKey::from_bytes(key.as_bytes()).map_err(|e| invalid(&e))?;
            let value = AsciiMetadataValue::try_from(value.as_str()).map_err(|e| invalid(&e))?;
            request.metadata_mut().append(key, value);
        }
    }

    Ok(request)
}

/// `UNAVAILABLE` is what tonic reports when it cannot reach the server.
/// A status whose source chain holds a transport or I/O error was raised
/// locally (a rejected TLS handshake surfaces as `UNKNOWN` this way);
/// statuses decoded from the server never carry a source.
fn classify_status(status: Status) -> EchoError {
    if status.code() == Code::Unavailable || raised_by_transport(&status) {
        return EchoError::ConnectionFailed(describe(&status));
    }

    match status.code() {
        Code::Cancelled => EchoError::Cancelled,
        _ => EchoError::CallFailed(status),
    }
}

fn raised_by_transport(status: &Status) -> bool {
    let mut source = std::error::Error::source(status);
    while let Some(err) = source {
        if err.is::<tonic::transport::Error>() || err.is::<std::io::Error>() {
            return true;
        }
        source = err.source();
    }
    false
}

/// Status message followed by the innermost cause, e.g.
/// `transport error: received fatal alert: CertificateRequired`
fn describe(status: &Status) -> String {
    let mut cause = std::error::Error::source(status);
    let mut innermost = None;
    while let Some(err) = cause {
        innermost = Some(err);
        cause = err.source();
    }

    match innermost {
        Some(err) if err.to_string() != status.message() => {
            format!("{}: {err}", status.message())
        }
        _ => status.message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfigBuilder;

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let ctx = CancellationToken::new();
        ctx.cancel();

        // Nothing listens here; a network attempt would fail differently.
        let config = ClientConfig::new("127.0.0.1:1");
        let err = invoke(&config, "hello", &ctx).await.unwrap_err();
        assert!(matches!(err, EchoError::Cancelled));
    }

    #[test]
    fn test_build_request_appends_metadata_in_order() {
        let config = ClientConfigBuilder::new("localhost:50051")
            .header("x-tag", "a")
            .header("x-tag", "b")
            .header("x-blob-bin", "raw")
            .build();

        let request = build_request(&config, "hi").unwrap();
        let values: Vec<&str> = request
            .metadata()
            .get_all("x-tag")
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();

        assert_eq!(values, vec!["a", "b"]);
        assert!(request.metadata().get_bin("x-blob-bin").is_some());
        assert_eq!(request.get_ref().message, "hi");
    }

    #[test]
    fn test_build_request_rejects_invalid_key() {
        let config = ClientConfigBuilder::new("localhost:50051")
            .header("bad key", "value")
            .build();

        assert!(matches!(
            build_request(&config, "hi"),
            Err(EchoError::Config(_))
        ));
    }

    #[test]
    fn test_locally_raised_status_is_connection_failure() {
        let handshake = std::io::Error::new(
            std::io::ErrorKind::ConnectionAborted,
            "received fatal alert: CertificateRequired",
        );
        let status = Status::from_error(Box::new(handshake));
        assert_eq!(status.code(), Code::Unknown);

        match classify_status(status) {
            EchoError::ConnectionFailed(reason) => {
                assert!(reason.contains("CertificateRequired"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_server_reported_unknown_is_call_failure() {
        assert!(matches!(
            classify_status(Status::unknown("boom")),
            EchoError::CallFailed(status) if status.message() == "boom"
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(Status::unavailable("connection refused")),
            EchoError::ConnectionFailed(_)
        ));
        match classify_status(Status::data_loss("failed to get metadata")) {
            EchoError::CallFailed(status) => {
                assert_eq!(status.code(), Code::DataLoss);
                assert_eq!(status.message(), "failed to get metadata");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
