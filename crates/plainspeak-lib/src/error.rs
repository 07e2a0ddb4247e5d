//! Error taxonomy for the upload-and-simplify pipeline.
//!
//! Every variant renders to the single human-readable string returned to
//! the caller as `{"success": false, "error": ...}`. Only readability
//! failures are recoverable; everything else aborts the request.

use thiserror::Error;
use tracing::warn;

use plainspeak_core::readability::ReadabilityError;

use crate::ocr::OcrError;
use crate::simplify::SimplifyError;
use crate::tts::SynthesisError;

/// How the pipeline reacts to a stage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged; the request continues without the stage's output.
    Recoverable,
    /// Aborts the request and is reported to the caller.
    Fatal,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No file part in the request")]
    NoFilePart,

    #[error("No file selected")]
    NoFileSelected,

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Failed to save upload: {0}")]
    Storage(#[source] std::io::Error),

    #[error("Text file reading error: {0}")]
    TextRead(#[source] std::io::Error),

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("OCR produced empty text")]
    EmptyOcrResult,

    #[error("Simplification API error: {0}")]
    Simplification(#[from] SimplifyError),

    #[error("Empty output from simplification API")]
    EmptySimplificationResult,

    #[error("Readability evaluation failed: {0}")]
    Readability(#[from] ReadabilityError),

    #[error("TTS failed: {0}")]
    Tts(#[from] SynthesisError),
}

impl PipelineError {
    pub fn severity(&self) -> Severity {
        match self {
            PipelineError::Readability(_) => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }
}

/// Apply the two-tier policy to a stage result.
///
/// Recoverable errors are logged and turned into `Ok(None)`; fatal errors
/// pass through for the caller to propagate with `?`.
pub fn recover<T>(result: Result<T, PipelineError>) -> Result<Option<T>, PipelineError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => match e.severity() {
            Severity::Recoverable => {
                warn!("{e}");
                Ok(None)
            }
            Severity::Fatal => Err(e),
        },
    }
}
