// crates/apg-gate/tests/sources/http_tests.rs
// ============================================================================
// Module: HTTP Source Tests
// Description: Tests for HTTP-backed gate documents against local servers.
// Purpose: Ensure network failures, bad statuses, and limits fail closed.
// Dependencies: apg-gate, tiny_http
// ============================================================================

//! ## Overview
//! Exercises [`apg_gate::HttpSource`] with loopback servers for the status,
//! timeout, refusal, redirect, and size-limit paths.

use std::time::Duration;

use apg_gate::FetchError;
use apg_gate::HttpSource;
use apg_gate::HttpSourceConfig;
use apg_gate::USER_AGENT;
use url::Url;

use crate::common::hanging_server;
use crate::common::refused_url;
use crate::common::serve_once;
use crate::common::serve_redirect;

/// Builds an HTTP source with a custom timeout and size limit.
fn source(timeout: Duration, max_bytes: usize) -> HttpSource {
    HttpSource::new(HttpSourceConfig {
        timeout,
        max_bytes,
        ..HttpSourceConfig::default()
    })
}

#[test]
fn http_source_returns_body_on_200() {
    let (url, handle) = serve_once(200, r#"{"enabled": true}"#);
    let content = HttpSource::default().fetch_url(&Url::parse(&url).unwrap()).unwrap();
    handle.join().unwrap();
    assert_eq!(content, r#"{"enabled": true}"#);
}

#[test]
fn http_source_sends_identifying_user_agent() {
    let (url, handle) = serve_once(200, "{}");
    let _ = HttpSource::default().fetch_url(&Url::parse(&url).unwrap());
    let user_agent = handle.join().unwrap();
    assert_eq!(user_agent.as_deref(), Some(USER_AGENT));
    assert_eq!(USER_AGENT, "asset-protocol-gui/1.0");
}

#[test]
fn http_source_rejects_non_200_statuses() {
    for status in [204, 404, 500] {
        let (url, handle) = serve_once(status, r#"{"enabled": true}"#);
        let err = HttpSource::default().fetch_url(&Url::parse(&url).unwrap()).unwrap_err();
        handle.join().unwrap();
        assert_eq!(err, FetchError::Status(status));
    }
}

#[test]
fn http_source_times_out_on_silent_server() {
    let (addr, handle) = hanging_server(Duration::from_secs(2));
    let url = Url::parse(&format!("http://{addr}/gate.json")).unwrap();
    let err = source(Duration::from_millis(200), 1024).fetch_url(&url).unwrap_err();
    handle.join().unwrap();
    assert!(
        matches!(err, FetchError::Timeout | FetchError::Network(_)),
        "unexpected error: {err:?}"
    );
}

#[test]
fn http_source_reports_refused_connections() {
    let url = Url::parse(&refused_url()).unwrap();
    let err = source(Duration::from_millis(500), 1024).fetch_url(&url).unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "unexpected error: {err:?}");
}

#[test]
fn http_source_follows_redirects_to_a_200() {
    let (url, handle) = serve_redirect(r#"{"enabled": true}"#);
    let content = HttpSource::default().fetch_url(&Url::parse(&url).unwrap()).unwrap();
    handle.join().unwrap();
    assert_eq!(content, r#"{"enabled": true}"#);
}

#[test]
fn http_source_enforces_size_limit() {
    let (url, handle) = serve_once(200, r#"{"enabled": true, "padding": "xxxxxxxxxxxxxxxx"}"#);
    let err = source(Duration::from_secs(2), 16).fetch_url(&Url::parse(&url).unwrap()).unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, FetchError::TooLarge { max_bytes: 16, .. }), "unexpected error: {err:?}");
}

#[test]
fn http_source_refuses_other_schemes() {
    let url = Url::parse("ftp://example.com/gate.json").unwrap();
    let err = HttpSource::default().fetch_url(&url).unwrap_err();
    assert!(matches!(err, FetchError::InvalidSource(_)), "unexpected error: {err:?}");
}
