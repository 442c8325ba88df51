// crates/apg-gate/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for apg-gate integration tests.
// Purpose: Provide stub sources, gate files, and local HTTP servers.
// Dependencies: apg-gate, tempfile, tiny_http
// ============================================================================

//! ## Overview
//! Provides shared helper functions and test utilities for gate checks.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::net::SocketAddr;
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use apg_gate::DocumentSource;
use apg_gate::FetchError;
use apg_gate::GateConfig;
use apg_gate::SourceKind;
use tempfile::TempDir;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Stub Source
// ============================================================================

/// Document source that records calls and returns a fixed result.
pub struct RecordingSource {
    /// Result returned for every fetch.
    result: Result<String, FetchError>,
    /// Number of fetch calls observed.
    calls: AtomicUsize,
    /// Kinds passed to fetch, in call order.
    kinds: Mutex<Vec<SourceKind>>,
}

impl RecordingSource {
    /// Creates a stub returning `content`.
    pub fn returning(content: &str) -> Self {
        Self::with_result(Ok(content.to_string()))
    }

    /// Creates a stub returning `result`.
    pub fn with_result(result: Result<String, FetchError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            kinds: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of fetch calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the kinds passed to fetch.
    pub fn kinds(&self) -> Vec<SourceKind> {
        self.kinds.lock().unwrap().clone()
    }
}

impl DocumentSource for RecordingSource {
    fn fetch(&self, kind: &SourceKind) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().unwrap().push(kind.clone());
        self.result.clone()
    }
}

// ============================================================================
// SECTION: Config Helpers
// ============================================================================

/// Returns a config pointing at `source` with a short timeout.
pub fn config_for(source: &str) -> GateConfig {
    GateConfig::default().with_source(source).with_timeout(Duration::from_secs(2))
}

/// Writes a gate file into a fresh temp dir.
pub fn gate_file(content: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("asset-protocol-gate.json");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

/// Converts an absolute path into a `file://` URI string.
pub fn file_uri(path: &std::path::Path) -> String {
    url::Url::from_file_path(path).unwrap().to_string()
}

// ============================================================================
// SECTION: HTTP Helpers
// ============================================================================

/// Serves one request with `status` and `body`; returns the URL and a handle
/// yielding the request's user agent.
pub fn serve_once(status: u16, body: &'static str) -> (String, thread::JoinHandle<Option<String>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        let request = server.recv().ok()?;
        let user_agent = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("User-Agent"))
            .map(|header| header.value.as_str().to_string());
        let _ = request.respond(Response::from_string(body).with_status_code(status));
        user_agent
    });
    (format!("http://{addr}/asset-protocol-gate.json"), handle)
}

/// Serves a redirect to `/final` followed by `body` with status 200.
pub fn serve_redirect(body: &'static str) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let location = format!("http://{addr}/final");
            let header = Header::from_bytes(&b"Location"[..], location.as_bytes()).unwrap();
            let _ = request.respond(Response::empty(302).with_header(header));
        }
        if let Ok(request) = server.recv() {
            let _ = request.respond(Response::from_string(body));
        }
    });
    (format!("http://{addr}/start"), handle)
}

/// Accepts one connection and holds it open without responding.
pub fn hanging_server(hold: Duration) -> (SocketAddr, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(hold);
            drop(stream);
        }
    });
    (addr, handle)
}

/// Returns a loopback URL whose port has no listener.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/asset-protocol-gate.json")
}
