//! The echo operation itself, independent of any transport.

use crate::proto::{EchoRequest, EchoResponse, Metadata};
use crate::{EchoError, Result};

/// Which shape of response the handler produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    /// Reply with the message only
    MessageOnly,
    /// Reply with the message and every metadata item observed on the call
    #[default]
    WithMetadata,
}

/// Pure request/response transformation behind the `Echo` RPC
///
/// Holds no mutable state, so a single instance is shared by every
/// concurrent call.
///
/// # Examples
///
/// ```
/// use echo_grpc::{EchoHandler, EchoMode, EchoRequest, Metadata};
///
/// let handler = EchoHandler::new(EchoMode::WithMetadata);
/// let request = EchoRequest { message: "hello".to_string() };
/// let metadata: Metadata = vec![("x-user", vec!["alice"])].into_iter().collect();
///
/// let response = handler.handle(request, Some(metadata.clone())).unwrap();
/// assert_eq!(response.message, "hello");
/// assert_eq!(response.metadata, Some(metadata));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler {
    mode: EchoMode,
}

impl EchoHandler {
    pub fn new(mode: EchoMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> EchoMode {
        self.mode
    }

    /// Builds the response for one call.
    ///
    /// `inbound_metadata` is `None` when the call context carried no metadata
    /// container at all, which is only an error in [`EchoMode::WithMetadata`].
    pub fn handle(
        &self,
        request: EchoRequest,
        inbound_metadata: Option<Metadata>,
    ) -> Result<EchoResponse> {
        match self.mode {
            EchoMode::MessageOnly => Ok(EchoResponse {
                message: request.message,
                metadata: None,
            }),
            EchoMode::WithMetadata => {
                let metadata = inbound_metadata.ok_or(EchoError::MetadataUnavailable)?;
                Ok(EchoResponse {
                    message: request.message,
                    metadata: Some(metadata),
                })
            }
        }
    }
}
