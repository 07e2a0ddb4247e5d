//! Text extraction — one implementation per [`UploadKind`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use plainspeak_core::types::UploadKind;

use crate::error::PipelineError;
use crate::ocr::OcrEngine;
use crate::storage::StoredUpload;

/// Turns a stored upload into text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, upload: &StoredUpload) -> Result<String, PipelineError>;
}

/// Reads the upload as UTF-8. `\r\n` and lone `\r` line endings become `\n`;
/// nothing else is changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, upload: &StoredUpload) -> Result<String, PipelineError> {
        let text = tokio::fs::read_to_string(&upload.path)
            .await
            .map_err(PipelineError::TextRead)?;
        let text = normalize_newlines(text);
        info!("extracted {} chars from text file {}", text.len(), upload.file_name);
        debug!("extracted text:\n{text}");
        Ok(text)
    }
}

fn normalize_newlines(text: String) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text
    }
}

/// Runs an [`OcrEngine`] over the upload. Whitespace-only output is an error.
#[derive(Clone)]
pub struct OcrExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl OcrExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TextExtractor for OcrExtractor {
    async fn extract(&self, upload: &StoredUpload) -> Result<String, PipelineError> {
        let text = self.engine.recognize(&upload.path).await?;
        debug!("{} output:\n{text}", self.engine.name());

        if text.trim().is_empty() {
            return Err(PipelineError::EmptyOcrResult);
        }
        info!(
            "{} extracted {} chars from {}",
            self.engine.name(),
            text.len(),
            upload.file_name
        );
        Ok(text)
    }
}

/// Both extractors, selected by upload kind.
#[derive(Clone)]
pub struct Extractors {
    plain_text: PlainTextExtractor,
    ocr: OcrExtractor,
}

impl Extractors {
    pub fn new(ocr_engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            plain_text: PlainTextExtractor,
            ocr: OcrExtractor::new(ocr_engine),
        }
    }

    pub fn for_kind(&self, kind: UploadKind) -> &dyn TextExtractor {
        match kind {
            UploadKind::PlainText => &self.plain_text,
            UploadKind::Image => &self.ocr,
        }
    }
}
