use super::*;

#[test]
fn chat_error_codes_are_stable() {
    assert_eq!(ChatError::Network("x".into()).error_code(), "E_NETWORK");
    assert_eq!(ChatError::Subscription("x".into()).error_code(), "E_SUBSCRIPTION");
    assert_eq!(ChatError::Publish("x".into()).error_code(), "E_PUBLISH");
}

#[test]
fn publish_errors_are_not_retryable() {
    assert!(ChatError::Network("down".into()).retryable());
    assert!(ChatError::Subscription("refused".into()).retryable());
    assert!(!ChatError::Publish("closed".into()).retryable());
}

#[test]
fn config_errors_default_to_not_retryable() {
    let err = ConfigError::InvalidBaseUrl("ftp://x".into());
    assert_eq!(err.error_code(), "E_INVALID_BASE_URL");
    assert!(!err.retryable());
    assert_eq!(err.to_string(), "invalid base URL: ftp://x");
}

#[test]
fn chat_error_display_includes_detail() {
    let err = ChatError::Network("room request failed: HTTP 503".into());
    assert_eq!(err.to_string(), "network error: room request failed: HTTP 503");
}
