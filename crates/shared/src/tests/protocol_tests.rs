use super::*;

#[test]
fn refresh_signal_ignores_unknown_fields() {
    let a: RefreshSignal =
        serde_json::from_str(r#"{"refresh": true, "last_update": 10.5, "tick": 1}"#).expect("a");
    let b: RefreshSignal =
        serde_json::from_str(r#"{"refresh": true, "last_update": 10.5, "tick": 2}"#).expect("b");
    assert_eq!(a, b);
}

#[test]
fn refresh_signal_without_timestamp_is_never_newer() {
    let signal: RefreshSignal = serde_json::from_str(r#"{"refresh": true}"#).expect("signal");
    assert_eq!(signal.last_update, None);
    assert!(!signal.is_newer_than(0.0));
}

#[test]
fn refresh_signal_requires_refresh_flag_and_strictly_newer_timestamp() {
    let signal = RefreshSignal {
        refresh: true,
        last_update: Some(5.0),
    };
    assert!(signal.is_newer_than(4.0));
    assert!(!signal.is_newer_than(5.0));

    let quiet = RefreshSignal {
        refresh: false,
        last_update: Some(50.0),
    };
    assert!(!quiet.is_newer_than(0.0));
}

#[test]
fn status_payload_tolerates_missing_sections() {
    let payload: StatusPayload = serde_json::from_str("{}").expect("empty");
    assert!(payload.player.is_none());

    let payload: StatusPayload = serde_json::from_str(
        r#"{"player": {"name": "Lin", "attributes": {"max_health": 100, "current_health": 40, "luck": 7}}, "gold": 12}"#,
    )
    .expect("payload");
    let player = payload.player.expect("player");
    assert_eq!(player.name.as_deref(), Some("Lin"));
    assert_eq!(player.attributes.max_health, Some(100.0));
    assert_eq!(player.attributes.other.get("luck"), Some(&serde_json::json!(7)));
    assert_eq!(payload.gold, Some(12.0));
}
