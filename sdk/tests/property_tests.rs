use proptest::prelude::*;
use sdk::errors::{EngineError, QuillErrorExt};
use sdk::types::{ChatMessage, NotebookPayload};

proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "\\PC*") {
        let errs = vec![
            EngineError::ChannelFailure(error_str.clone()),
            EngineError::FormatError(error_str.clone()),
            EngineError::CredentialMissing(error_str.clone()),
            EngineError::Config(error_str.clone()),
            EngineError::Settings(error_str.clone()),
            EngineError::Network(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            // Hints are static; the raw detail never leaks into them.
            if error_str.len() > 12 {
                prop_assert!(!hint.contains(&error_str));
            }
        }
    }
}

proptest! {
    #[test]
    fn test_notebook_payload_content_preserved(content in "\\PC*") {
        let payload = NotebookPayload::new(content.clone());
        let parsed = NotebookPayload::parse(&payload.to_body());
        prop_assert_eq!(parsed.map(|p| p.content), Some(content));
    }

    #[test]
    fn test_plain_bodies_are_not_payloads(body in "[^{ \t\r\n][^\n]*") {
        prop_assert!(NotebookPayload::parse(&body).is_none());
    }

    #[test]
    fn test_chat_message_json_shape(author in "[a-z]{1,8}", body in "\\PC*") {
        let msg = ChatMessage::new(author.clone(), body.clone(), "2024-01-01T00:00:00Z");
        let value = serde_json::to_value(&msg).unwrap();
        prop_assert_eq!(value["author"].as_str(), Some(author.as_str()));
        prop_assert_eq!(value["body"].as_str(), Some(body.as_str()));
    }
}
