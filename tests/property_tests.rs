use echo_grpc::{EchoError, EchoHandler, EchoMode, EchoRequest, Metadata};
use proptest::prelude::*;

fn metadata_strategy() -> impl Strategy<Value = Metadata> {
    prop::collection::vec(
        ("[a-z][a-z0-9-]{0,15}", prop::collection::vec(".*", 0..4)),
        0..8,
    )
    .prop_map(|items| items.into_iter().collect::<Metadata>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: the reply message is exactly the request message
    #[test]
    fn echo_preserves_message(message in ".*", with_metadata in any::<bool>()) {
        let mode = if with_metadata { EchoMode::WithMetadata } else { EchoMode::MessageOnly };
        let handler = EchoHandler::new(mode);

        let response = handler
            .handle(EchoRequest { message: message.clone() }, Some(Metadata::default()))
            .map_err(|e| TestCaseError::fail(format!("handler failed: {e}")))?;

        prop_assert_eq!(response.message, message);
    }

    /// Property: metadata comes back with the same keys and per-key value order
    #[test]
    fn echo_preserves_metadata(metadata in metadata_strategy()) {
        let handler = EchoHandler::new(EchoMode::WithMetadata);

        let response = handler
            .handle(EchoRequest { message: "m".to_string() }, Some(metadata.clone()))
            .map_err(|e| TestCaseError::fail(format!("handler failed: {e}")))?;

        prop_assert_eq!(response.metadata, Some(metadata));
    }

    /// Property: no hidden state, identical inputs give identical replies
    #[test]
    fn echo_is_idempotent(message in ".*", metadata in metadata_strategy()) {
        let handler = EchoHandler::default();
        let request = EchoRequest { message };

        let first = handler.handle(request.clone(), Some(metadata.clone()));
        let second = handler.handle(request, Some(metadata));

        prop_assert_eq!(first.ok(), second.ok());
    }

    /// Property: without a metadata container the metadata variant always fails
    #[test]
    fn missing_metadata_always_fails(message in ".*") {
        let handler = EchoHandler::new(EchoMode::WithMetadata);
        let result = handler.handle(EchoRequest { message }, None);
        prop_assert!(matches!(result, Err(EchoError::MetadataUnavailable)));
    }
}
