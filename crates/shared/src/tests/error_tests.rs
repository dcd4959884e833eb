use super::*;
use serde_json::json;

#[test]
fn detects_explicit_failure_with_message() {
    let failure = BackendFailure::from_body(&json!({"success": false, "message": "unknown command"}))
        .expect("failure");
    assert_eq!(failure.message, "unknown command");
}

#[test]
fn falls_back_to_error_field_and_default_text() {
    let failure =
        BackendFailure::from_body(&json!({"success": false, "error": "busy"})).expect("failure");
    assert_eq!(failure.message, "busy");

    let failure = BackendFailure::from_body(&json!({"success": false})).expect("failure");
    assert_eq!(failure.message, "unspecified failure");
}

#[test]
fn ignores_success_and_shapeless_bodies() {
    assert!(BackendFailure::from_body(&json!({"success": true})).is_none());
    assert!(BackendFailure::from_body(&json!({"logs": [], "state": {}})).is_none());
    assert!(BackendFailure::from_body(&json!("ok")).is_none());
}
