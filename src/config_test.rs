use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn from_lookup_uses_defaults_when_unset() {
    let cfg = ChatConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.room_path, DEFAULT_ROOM_PATH);
    assert_eq!(cfg.ws_url, "ws://127.0.0.1:8080/ws-stomp");
    assert_eq!(cfg.subscribe_prefix, DEFAULT_SUBSCRIBE_PREFIX);
    assert_eq!(cfg.publish_destination, DEFAULT_PUBLISH_DESTINATION);
    assert_eq!(cfg.session_token, None);
    assert_eq!(cfg.body_format, BodyFormat::Text);
    assert!(!cfg.clear_on_reopen);
    assert_eq!(cfg.timeouts, Timeouts::default());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ChatConfig::from_lookup(lookup_from(&[
        ("MARKETCHAT_API_BASE_URL", "https://shop.example.test/"),
        ("MARKETCHAT_ROOM_PATH", "/chat/rooms"),
        ("MARKETCHAT_SUBSCRIBE_PREFIX", "/topic/room/"),
        ("MARKETCHAT_PUBLISH_DESTINATION", "/app/chat"),
        ("MARKETCHAT_SESSION_TOKEN", "tok-1"),
        ("MARKETCHAT_BODY_FORMAT", "json"),
        ("MARKETCHAT_CLEAR_ON_REOPEN", "TRUE"),
        ("MARKETCHAT_REQUEST_TIMEOUT_SECS", "42"),
        ("MARKETCHAT_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();

    assert_eq!(cfg.api_base_url, "https://shop.example.test");
    assert_eq!(cfg.room_url(), "https://shop.example.test/chat/rooms");
    assert_eq!(cfg.ws_url, "wss://shop.example.test/ws-stomp");
    assert_eq!(cfg.subscribe_prefix, "/topic/room");
    assert_eq!(cfg.publish_destination, "/app/chat");
    assert_eq!(cfg.session_token.as_deref(), Some("tok-1"));
    assert_eq!(cfg.body_format, BodyFormat::Json);
    assert!(cfg.clear_on_reopen);
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn explicit_ws_url_wins_over_derived() {
    let cfg = ChatConfig::from_lookup(lookup_from(&[("MARKETCHAT_WS_URL", "ws://broker:61614/stomp")])).unwrap();
    assert_eq!(cfg.ws_url, "ws://broker:61614/stomp");
}

#[test]
fn invalid_timeouts_fall_back_to_defaults() {
    let cfg = ChatConfig::from_lookup(lookup_from(&[("MARKETCHAT_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn zero_timeouts_fall_back_to_defaults() {
    let cfg = ChatConfig::from_lookup(lookup_from(&[
        ("MARKETCHAT_REQUEST_TIMEOUT_SECS", "0"),
        ("MARKETCHAT_CONNECT_TIMEOUT_SECS", "0"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    assert_eq!(cfg.timeouts.connect_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
    assert!(!cfg.timeouts.connect().is_zero());
}

#[test]
fn unknown_body_format_errors() {
    let err = ChatConfig::from_lookup(lookup_from(&[("MARKETCHAT_BODY_FORMAT", "xml")])).unwrap_err();
    assert!(err.to_string().contains("unsupported MARKETCHAT_BODY_FORMAT"));
}

#[test]
fn bad_boolean_errors() {
    let err = ChatConfig::from_lookup(lookup_from(&[("MARKETCHAT_CLEAR_ON_REOPEN", "maybe")])).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn empty_session_token_is_ignored() {
    let cfg = ChatConfig::from_lookup(lookup_from(&[("MARKETCHAT_SESSION_TOKEN", "")])).unwrap();
    assert_eq!(cfg.session_token, None);
}

#[test]
fn non_http_base_url_is_rejected() {
    let err = ChatConfig::from_lookup(lookup_from(&[("MARKETCHAT_API_BASE_URL", "ftp://x")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidBaseUrl("ftp://x".into()));
}

#[test]
fn override_endpoints_rederives_ws_url() {
    let mut cfg = ChatConfig::from_lookup(lookup_from(&[])).unwrap();
    cfg.override_endpoints(Some("https://market.test"), None).unwrap();
    assert_eq!(cfg.api_base_url, "https://market.test");
    assert_eq!(cfg.ws_url, "wss://market.test/ws-stomp");

    cfg.override_endpoints(None, Some("ws://other/ws")).unwrap();
    assert_eq!(cfg.ws_url, "ws://other/ws");
}

#[test]
fn subscribe_destination_appends_conversation() {
    let cfg = ChatConfig::for_base_url("http://localhost:8080").unwrap();
    let id = ConversationId::parse("room-9").unwrap();
    assert_eq!(cfg.subscribe_destination(&id), "/sub/chat/room/room-9");
}
