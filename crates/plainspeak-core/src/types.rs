//! Shared types for the plainspeak service.
//!
//! Used by plainspeak-lib, plainspeak-cli and any HTTP client that wants the
//! wire shapes without pulling in tokio, axum or reqwest.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// URL prefix under which the working directory is served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "image";

/// Body of `GET /`.
pub const LIVENESS_TEXT: &str = "plainspeak backend is running.";

// ─── Upload types ──────────────────────────────────────────────────────────

/// How text is obtained from an upload. Resolved once at ingress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    PlainText,
    Image,
}

impl UploadKind {
    /// A `.txt` filename (any case) or a `text/plain` media type is read
    /// directly. Everything else is treated as an image and goes through OCR.
    pub fn classify(file_name: &str, content_type: Option<&str>) -> Self {
        let txt_extension = file_name.to_ascii_lowercase().ends_with(".txt");
        let plain_media = content_type
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("text/plain"));

        if txt_extension || plain_media {
            UploadKind::PlainText
        } else {
            UploadKind::Image
        }
    }
}

/// The two audio files produced per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioRole {
    Simplified,
    Original,
}

impl AudioRole {
    /// File name in the working directory for this role within one request.
    pub fn file_name(self, request_id: &str) -> String {
        let suffix = match self {
            AudioRole::Simplified => "simplified",
            AudioRole::Original => "original",
        };
        format!("{request_id}-{suffix}.wav")
    }
}

// ─── Readability ───────────────────────────────────────────────────────────

/// Readability metrics for one text. Logged per request, never sent to
/// the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    /// Flesch–Kincaid grade level.
    pub fkgl: f64,
    /// Dale–Chall readability score.
    pub dale_chall: f64,
}

/// Scores for the original and the simplified text of one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadabilityReport {
    pub original: Scores,
    pub simplified: Scores,
}

// ─── HTTP responses ────────────────────────────────────────────────────────

/// Successful reply to `POST /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyResponse {
    pub success: bool,
    pub original_text: String,
    pub summarized_text: String,
    /// URL of the simplified-text audio.
    pub summary_sound: String,
    /// URL of the original-text audio.
    pub original_sound: String,
}

/// Failed reply to `POST /`. Served with HTTP 200; callers check `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// ─── Configuration ─────────────────────────────────────────────────────────

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Working directory for uploads and generated audio.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Where the completion API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    /// Read from this environment variable on every request.
    Env(String),
    /// Fixed key supplied at startup.
    Static(String),
}

/// Remote chat-completion settings.
#[derive(Debug, Clone)]
pub struct SimplifierConfig {
    /// OpenAI-compatible base URL; `/chat/completions` is appended.
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub api_key: ApiKeySource,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            api_base: "https://openrouter.ai/api/v1".into(),
            model: "mistralai/mistral-7b-instruct".into(),
            temperature: 0.7,
            api_key: ApiKeySource::Env("OPENROUTER_API_KEY".into()),
        }
    }
}

/// Tesseract OCR settings.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Executable name or path of the `tesseract` binary.
    pub tesseract_cmd: String,
    /// Tesseract language pack, e.g. `eng`.
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".into(),
            language: "eng".into(),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub kokoro_url: String,
    /// Must be an English voice; output language is fixed.
    pub voice: String,
    pub speed: f32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            kokoro_url: "http://localhost:8880".into(),
            voice: "af_heart".into(),
            speed: 1.0,
        }
    }
}
