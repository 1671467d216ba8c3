use crate::proto::EchoResponse;

/// Formats a response the way the client binary prints it
pub fn render(response: &EchoResponse) -> String {
    let mut out = format!("response from server: {}\n", response.message);
    out.push_str("metadata from server:\n");

    if let Some(metadata) = &response.metadata {
        for (key, values) in metadata {
            out.push_str(&format!("{key}: {}\n", values.join(", ")));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::Metadata;

    #[test]
    fn test_render_with_metadata() {
        let metadata: Metadata = vec![("user-agent", vec!["grpc"]), ("x-tag", vec!["a", "b"])]
            .into_iter()
            .collect();
        let response = EchoResponse {
            message: "hi".to_string(),
            metadata: Some(metadata),
        };

        assert_eq!(
            render(&response),
            "response from server: hi\nmetadata from server:\nuser-agent: grpc\nx-tag: a, b\n"
        );
    }

    #[test]
    fn test_render_without_metadata() {
        let response = EchoResponse {
            message: String::new(),
            metadata: None,
        };
        assert_eq!(
            render(&response),
            "response from server: \nmetadata from server:\n"
        );
    }
}
