use clearsignals_llm::Message;

#[test]
fn test_message_system() {
    let msg = Message::system("You are ClearSignals AI");
    assert_eq!(msg.role(), "system");
    assert_eq!(msg.content(), "You are ClearSignals AI");
}

#[test]
fn test_message_human() {
    let msg = Message::human("Parse this thread");
    assert_eq!(msg.role(), "user");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
}

#[test]
fn test_message_deserialization() {
    let json = r#"{"role":"assistant","content":"Done"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.role(), "assistant");
    assert_eq!(msg, Message::AI { content: "Done".to_string() });
}
