use super::*;

#[test]
fn client_events_encode_with_type_discriminator() {
    let send = ClientEvent::MessageSend { text: "hello".to_owned() };
    let json: serde_json::Value = serde_json::from_str(&send.encode().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"type": "message.send", "text": "hello"}));

    let typing: serde_json::Value = serde_json::from_str(&ClientEvent::Typing.encode().unwrap()).unwrap();
    assert_eq!(typing, serde_json::json!({"type": "typing"}));
}

#[test]
fn decode_broadcast_with_full_message() {
    let raw = r#"{
        "type": "message.broadcast",
        "message": {
            "id": 5,
            "content": "hi",
            "sender_id": 12,
            "sender_username": "Ada Lovelace",
            "created_at": "2025-02-01T09:30:00.123456+00:00"
        }
    }"#;
    let event = ServerEvent::decode(raw).unwrap();
    let ServerEvent::MessageBroadcast { message } = event else {
        panic!("expected broadcast, got {event:?}");
    };
    assert_eq!(message.id, Some(5));
    assert_eq!(message.sender_id, Some(12));
    assert_eq!(message.sender_username.as_deref(), Some("Ada Lovelace"));
    assert_eq!(message.content.as_deref(), Some("hi"));
}

#[test]
fn decode_broadcast_accepts_string_ids_and_missing_fields() {
    let raw = r#"{"type":"message.broadcast","message":{"sender_id":"12"}}"#;
    let ServerEvent::MessageBroadcast { message } = ServerEvent::decode(raw).unwrap() else {
        panic!("expected broadcast");
    };
    assert_eq!(message.sender_id, Some(12));
    assert_eq!(message.content, None);
    assert_eq!(message.sender_username, None);
}

#[test]
fn decode_typing_with_username_or_user_id() {
    assert_eq!(
        ServerEvent::decode(r#"{"type":"typing","username":"bob"}"#).unwrap(),
        ServerEvent::Typing { username: Some("bob".to_owned()), user_id: None }
    );
    assert_eq!(
        ServerEvent::decode(r#"{"type":"typing","user_id":4}"#).unwrap(),
        ServerEvent::Typing { username: None, user_id: Some(4) }
    );
}

#[test]
fn decode_unknown_type_is_not_an_error() {
    assert_eq!(ServerEvent::decode(r#"{"type":"presence.join","user":1}"#).unwrap(), ServerEvent::Unknown);
}

#[test]
fn decode_rejects_malformed_frames() {
    assert!(ServerEvent::decode("not json").is_err());
    assert!(ServerEvent::decode(r#"{"message":{}}"#).is_err());
    assert!(ServerEvent::decode(r#"{"type":"message.broadcast"}"#).is_err());
    assert!(ServerEvent::decode(r#"{"type":"message.broadcast","message":"text"}"#).is_err());
}
