use std::collections::HashSet;

use super::*;
use crate::error::ErrorCode;

#[test]
fn names_round_trip_and_are_unique() {
    let names: HashSet<&str> = OperationName::ALL.iter().map(|op| op.as_str()).collect();
    assert_eq!(names.len(), OperationName::ALL.len());
    for op in OperationName::ALL {
        assert_eq!(OperationName::parse(op.as_str()), Some(op));
    }
    assert_eq!(OperationName::parse("teleportObject"), None);
}

#[test]
fn local_only_operations_are_not_offered() {
    assert!(OperationName::CreateStickyNote.offered_to_llm());
    assert!(OperationName::SummarizeBoard.offered_to_llm());
    assert!(!OperationName::Undo.offered_to_llm());
    assert!(!OperationName::SelectAll.offered_to_llm());
}

#[test]
fn operation_deserializes_without_args() {
    let op: Operation = serde_json::from_str(r#"{"name":"clearBoard"}"#).unwrap();
    assert_eq!(op.kind(), Some(OperationName::ClearBoard));
    assert!(op.args.is_null());
}

#[test]
fn error_codes_and_messages() {
    let err = CommandError::NoOperations { reply: "  Which note?  ".into() };
    assert_eq!(err.error_code(), "E_NO_OPERATIONS");
    assert_eq!(err.user_message(), "Which note?");

    let err = CommandError::Unreachable(LlmError::ApiResponse { status: 503, body: String::new() });
    assert!(err.retryable());
    assert_eq!(err.error_code(), "E_TRANSLATOR_UNREACHABLE");

    assert!(!CommandError::LlmNotConfigured.retryable());
}
