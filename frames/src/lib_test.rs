use super::*;

#[test]
fn command_parse_accepts_wire_spellings() {
    assert_eq!(Command::parse("CONNECTED").expect("command"), Command::Connected);
    assert_eq!(Command::parse("MESSAGE").expect("command"), Command::Message);
    assert_eq!(Command::parse("STOMP").expect("command"), Command::Stomp);
    assert_eq!(Command::Send.as_str(), "SEND");
}

#[test]
fn command_parse_rejects_lowercase_and_unknown() {
    assert_eq!(
        Command::parse("send").expect_err("lowercase should fail"),
        CodecError::UnknownCommand("send".to_owned())
    );
    assert!(matches!(Command::parse("PUBLISH"), Err(CodecError::UnknownCommand(_))));
}

#[test]
fn encode_send_frame_adds_content_length_and_terminator() {
    let frame = Frame::send("/pub/chat/message", "text/plain", "hi");
    let wire = encode_frame(&frame);
    assert_eq!(
        wire,
        "SEND\ndestination:/pub/chat/message\ncontent-type:text/plain\ncontent-length:2\n\nhi\0"
    );
}

#[test]
fn encode_uses_byte_length_for_multibyte_body() {
    let frame = Frame::send("/d", "text/plain", "4달러");
    let wire = encode_frame(&frame);
    assert!(wire.contains("content-length:7\n"));
}

#[test]
fn encode_frame_without_body_omits_content_length() {
    let wire = encode_frame(&Frame::disconnect());
    assert_eq!(wire, "DISCONNECT\n\n\0");
}

#[test]
fn encode_escapes_headers_except_on_connect() {
    let send = Frame::new(Command::Send).with_header("note", "a:b\nc\\d");
    assert!(encode_frame(&send).contains("note:a\\cb\\nc\\\\d\n"));

    let connect = Frame::connect("chat.example:443");
    assert!(encode_frame(&connect).contains("host:chat.example:443\n"));
}

#[test]
fn decode_connected_frame() {
    let frame = decode_frame("CONNECTED\nversion:1.2\nheart-beat:0,0\n\n\0").expect("decode");
    assert_eq!(frame.command, Command::Connected);
    assert_eq!(frame.header("version"), Some("1.2"));
    assert!(frame.body.is_empty());
}

#[test]
fn decode_message_with_crlf_and_trailing_eols() {
    let raw = "\r\n\nMESSAGE\r\nsubscription:sub-0\r\ndestination:/sub/chat/room/7\r\n\r\nhello\0\n\n";
    let frame = decode_frame(raw).expect("decode");
    assert_eq!(frame.command, Command::Message);
    assert_eq!(frame.header(SUBSCRIPTION), Some("sub-0"));
    assert_eq!(frame.header(DESTINATION), Some("/sub/chat/room/7"));
    assert_eq!(frame.body, "hello");
}

#[test]
fn decode_honours_content_length_with_embedded_nul() {
    let raw = "MESSAGE\ncontent-length:3\n\na\0b\0";
    let frame = decode_frame(raw).expect("decode");
    assert_eq!(frame.body, "a\0b");
}

#[test]
fn decode_unescapes_headers() {
    let raw = "MESSAGE\nnote:a\\cb\\nc\\\\d\n\n\0";
    let frame = decode_frame(raw).expect("decode");
    assert_eq!(frame.header("note"), Some("a:b\nc\\d"));
}

#[test]
fn decode_keeps_first_of_repeated_headers() {
    let raw = "MESSAGE\nfoo:first\nfoo:second\n\n\0";
    let frame = decode_frame(raw).expect("decode");
    assert_eq!(frame.header("foo"), Some("first"));
    assert_eq!(frame.headers.len(), 2);
}

#[test]
fn decode_rejects_empty_and_heartbeat_only_payloads() {
    assert_eq!(decode_frame(""), Err(CodecError::Empty));
    assert_eq!(decode_frame("\n\r\n"), Err(CodecError::Empty));
}

#[test]
fn decode_rejects_missing_terminator() {
    assert_eq!(decode_frame("MESSAGE\n\nhello"), Err(CodecError::MissingTerminator));
    assert_eq!(
        decode_frame("MESSAGE\ncontent-length:2\n\nhello\0"),
        Err(CodecError::MissingTerminator)
    );
}

#[test]
fn decode_rejects_truncated_header_block() {
    assert_eq!(decode_frame("MESSAGE\nfoo:bar"), Err(CodecError::Truncated));
    assert_eq!(decode_frame("MESSAGE"), Err(CodecError::Truncated));
}

#[test]
fn decode_rejects_bad_header_lines() {
    assert!(matches!(
        decode_frame("MESSAGE\nnocolon\n\n\0"),
        Err(CodecError::MalformedHeader(_))
    ));
    assert_eq!(
        decode_frame("MESSAGE\nfoo:a\\tb\n\n\0"),
        Err(CodecError::InvalidEscape("\\t".to_owned()))
    );
}

#[test]
fn decode_rejects_invalid_content_length() {
    assert!(matches!(
        decode_frame("MESSAGE\ncontent-length:abc\n\nx\0"),
        Err(CodecError::InvalidContentLength(_))
    ));
    assert!(matches!(
        decode_frame("MESSAGE\ncontent-length:99\n\nx\0"),
        Err(CodecError::InvalidContentLength(_))
    ));
}

#[test]
fn encoded_send_decodes_back_to_same_body_and_headers() {
    let frame = Frame::send("/pub/chat/message", "text/plain", "3만원에 주세요")
        .with_header("x-note", "colon:inside");
    let decoded = decode_frame(&encode_frame(&frame)).expect("decode");
    assert_eq!(decoded.body, frame.body);
    assert_eq!(decoded.header("x-note"), Some("colon:inside"));
    assert_eq!(decoded.header(CONTENT_LENGTH), Some("20"));
}

#[test]
fn heartbeat_detection() {
    assert!(is_heartbeat("\n"));
    assert!(is_heartbeat("\r\n"));
    assert!(!is_heartbeat(""));
    assert!(!is_heartbeat("MESSAGE\n\n\0"));
}
