use super::*;

#[test]
fn test_pending_request_serializes_to_wire_shape() {
    let mut session = ChatSession::default();
    session.start_session("What is 2+2?", "").unwrap();

    let pending = session.begin_send("2+2?").unwrap();
    let value = serde_json::to_value(pending.request()).unwrap();

    assert_eq!(value["message"], "2+2?");
    assert_eq!(value["question"], "What is 2+2?");
    assert_eq!(value["answer"], "");
    assert_eq!(value["sessionId"], session.session_id().unwrap());
}

#[test]
fn test_endpoint_body_drives_completion() {
    let mut session = ChatSession::default();
    session.start_session("q", "").unwrap();
    let pending = session.begin_send("hi").unwrap();

    let body = r#"{"success":true,"message":"Tell me more.","timestamp":"2024-01-01T00:00:00.000Z"}"#;
    let response: ChatResponse = serde_json::from_str(body).unwrap();

    let completion = session.complete(pending, Ok(response));
    let id = completion.message_id().unwrap();
    let last = session.transcript().last().unwrap();
    assert_eq!(last.id(), id);
    assert_eq!(last.content(), "Tell me more.");
    assert_eq!(last.sender(), Sender::Tutor);
}
