use crate::handler::EchoHandler;
use crate::proto::echo_service_server::EchoService;
use crate::proto::{EchoRequest, EchoResponse, Metadata};
use async_trait::async_trait;
use std::time::Duration;
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

/// gRPC face of [`EchoHandler`]
#[derive(Debug, Clone, Default)]
pub struct EchoEndpoint {
    handler: EchoHandler,
    response_delay: Duration,
}

impl EchoEndpoint {
    pub fn new(handler: EchoHandler, response_delay: Duration) -> Self {
        Self {
            handler,
            response_delay,
        }
    }
}

#[async_trait]
impl EchoService for EchoEndpoint {
    async fn echo(&self, request: Request<EchoRequest>) -> Result<Response<EchoResponse>, Status> {
        let remote = request.remote_addr();
        // tonic always hands over a metadata map, possibly empty
        let metadata = Metadata::from_metadata_map(request.metadata());
        let request = request.into_inner();

        debug!(
            remote = ?remote,
            size = request.message.len(),
            metadata_keys = metadata.len(),
            "Received echo call"
        );

        if !self.response_delay.is_zero() {
            tokio::time::sleep(self.response_delay).await;
        }

        match self.handler.handle(request, Some(metadata)) {
            Ok(response) => Ok(Response::new(response)),
            Err(e) => {
                warn!(remote = ?remote, error = %e, "Echo call failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::EchoMode;
    use tonic::metadata::MetadataValue;

    #[tokio::test]
    async fn test_echo_returns_request_metadata() {
        let endpoint = EchoEndpoint::default();
        let mut request = Request::new(EchoRequest {
            message: "hello".to_string(),
        });
        request
            .metadata_mut()
            .insert("x-request-id", MetadataValue::from_static("42"));

        let response = endpoint.echo(request).await.unwrap().into_inner();

        assert_eq!(response.message, "hello");
        let metadata = response.metadata.unwrap();
        assert_eq!(metadata.get("x-request-id"), Some(&["42".to_string()][..]));
    }

    #[tokio::test]
    async fn test_message_only_endpoint() {
        let endpoint = EchoEndpoint::new(EchoHandler::new(EchoMode::MessageOnly), Duration::ZERO);
        let response = endpoint
            .echo(Request::new(EchoRequest {
                message: "plain".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.message, "plain");
        assert!(response.metadata.is_none());
    }
}
