use super::*;

#[test]
fn conversation_id_trims_and_rejects_blank() {
    let id = ConversationId::parse("  room-7 \n").expect("id");
    assert_eq!(id.as_str(), "room-7");
    assert_eq!(id.to_string(), "room-7");
    assert!(ConversationId::parse("").is_none());
    assert!(ConversationId::parse(" \t ").is_none());
}

#[test]
fn connection_state_defaults_to_closed() {
    let state = ConnectionState::default();
    assert!(!state.is_open());
    assert!(state.conversation().is_none());
}

#[test]
fn open_state_exposes_conversation() {
    let state = ConnectionState::Open {
        conversation: ConversationId::parse("42").expect("id"),
        generation: 3,
    };
    assert!(state.is_open());
    assert_eq!(state.conversation().map(ConversationId::as_str), Some("42"));
}

#[test]
fn message_keeps_body_verbatim() {
    let msg = Message::new("  4달러에 주세요 ");
    assert_eq!(msg.body(), "  4달러에 주세요 ");
}
