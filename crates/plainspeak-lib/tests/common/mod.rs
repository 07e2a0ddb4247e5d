//! Shared fixtures: stub external services and multipart request building.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use tempfile::TempDir;

use plainspeak_lib::ocr::{OcrEngine, OcrError};
use plainspeak_lib::pipeline::Pipeline;
use plainspeak_lib::server::router;
use plainspeak_lib::simplify::{Simplifier, SimplifyError};
use plainspeak_lib::storage::UploadStore;
use plainspeak_lib::tts::{SpeechSynthesizer, SynthesisError};

pub const BOUNDARY: &str = "plainspeak-test-boundary";

// ─── Stub services ─────────────────────────────────────────────────────────

/// OCR engine returning fixed text and counting calls.
pub struct StubOcr {
    text: String,
    calls: AtomicUsize,
}

impl StubOcr {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for StubOcr {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn recognize(&self, _path: &Path) -> Result<String, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub enum StubSimplifier {
    /// Always answers with this text.
    Fixed(&'static str),
    /// Answers `Simple: <input>`.
    Echo,
    /// Every call fails with an HTTP status error.
    Failing,
}

#[async_trait]
impl Simplifier for StubSimplifier {
    async fn simplify(&self, text: &str) -> Result<String, SimplifyError> {
        match self {
            StubSimplifier::Fixed(reply) => Ok(reply.to_string()),
            StubSimplifier::Echo => Ok(format!("Simple: {}", text.trim())),
            StubSimplifier::Failing => Err(SimplifyError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "invalid key".into(),
            }),
        }
    }
}

/// Synthesizer whose "audio" is the UTF-8 text itself, so tests can tell
/// which text a served file came from.
#[derive(Default)]
pub struct StubTts {
    pub fail: bool,
    spoken: Mutex<Vec<String>>,
}

impl StubTts {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for StubTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        if self.fail {
            return Err(SynthesisError::NothingToSpeak);
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(text.as_bytes().to_vec())
    }
}

// ─── App harness ───────────────────────────────────────────────────────────

pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
    pub ocr: Arc<StubOcr>,
    pub tts: Arc<StubTts>,
}

impl TestApp {
    pub fn uploads(&self) -> &Path {
        self.dir.path()
    }
}

pub async fn app(ocr_text: &str, simplifier: StubSimplifier, tts: StubTts) -> TestApp {
    app_with_limit(ocr_text, simplifier, tts, 1024 * 1024).await
}

pub async fn app_with_limit(
    ocr_text: &str,
    simplifier: StubSimplifier,
    tts: StubTts,
    max_upload_bytes: usize,
) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = UploadStore::open(dir.path()).await.unwrap();
    let ocr = Arc::new(StubOcr {
        text: ocr_text.to_string(),
        calls: AtomicUsize::new(0),
    });
    let tts = Arc::new(tts);
    let pipeline = Pipeline::new(store, ocr.clone(), Arc::new(simplifier), tts.clone());

    TestApp {
        router: router(pipeline, max_upload_bytes),
        dir,
        ocr,
        tts,
    }
}

// ─── Requests ──────────────────────────────────────────────────────────────

/// One multipart part. `file_name: None` makes it a plain form field.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn image(file_name: &'a str, content_type: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            name: "image",
            file_name: Some(file_name),
            content_type: Some(content_type),
            bytes,
        }
    }
}

pub fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(ct) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

pub async fn body_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}
