//! The upload-and-simplify pipeline.
//!
//! ```text
//! ingest → extract → simplify → score → synthesize
//! ```
//!
//! Stages run strictly in order within one request. Every stage except
//! scoring is fatal on error; scoring goes through [`recover`].
//!
//! Audio file names embed a fresh request id, so concurrent requests never
//! write the same audio file. Uploaded files keep their client name and are
//! still shared between requests.

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use plainspeak_core::readability;
use plainspeak_core::types::{AudioRole, ReadabilityReport, SimplifyResponse, UploadKind};

use crate::error::{PipelineError, recover};
use crate::extract::Extractors;
use crate::ocr::OcrEngine;
use crate::simplify::Simplifier;
use crate::storage::{StoredUpload, UploadStore, base_name};
use crate::tts::{SpeechSynthesizer, SynthesisError};

/// The `image` part of a multipart submission.
#[derive(Debug, Clone)]
pub struct IncomingUpload {
    /// Client-supplied name; may be empty when no file was chosen.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Cloneable handle to the pipeline and its external services.
#[derive(Clone)]
pub struct Pipeline {
    store: UploadStore,
    extractors: Extractors,
    simplifier: Arc<dyn Simplifier>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl Pipeline {
    pub fn new(
        store: UploadStore,
        ocr: Arc<dyn OcrEngine>,
        simplifier: Arc<dyn Simplifier>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            store,
            extractors: Extractors::new(ocr),
            simplifier,
            synthesizer,
        }
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Process one submission end to end. `None` means the request carried
    /// no file part.
    pub async fn run(
        &self,
        upload: Option<IncomingUpload>,
    ) -> Result<SimplifyResponse, PipelineError> {
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("upload", request = %request_id);
        self.run_stages(&request_id, upload).instrument(span).await
    }

    async fn run_stages(
        &self,
        request_id: &str,
        upload: Option<IncomingUpload>,
    ) -> Result<SimplifyResponse, PipelineError> {
        let stored = self.ingest(upload).await?;
        let original_text = self.extract(&stored).await?;
        let summarized_text = self.simplify(&original_text).await?;
        // Scores are only logged; a failure here never reaches the client.
        recover(score_readability(&original_text, &summarized_text))?;
        let summary_sound = self
            .speak(request_id, AudioRole::Simplified, &summarized_text)
            .await?;
        let original_sound = self
            .speak(request_id, AudioRole::Original, &original_text)
            .await?;
        info!("audio files generated");

        Ok(SimplifyResponse {
            success: true,
            original_text,
            summarized_text,
            summary_sound,
            original_sound,
        })
    }

    /// Stage 1: validate the upload and persist it to the working directory.
    pub async fn ingest(
        &self,
        upload: Option<IncomingUpload>,
    ) -> Result<StoredUpload, PipelineError> {
        let upload = upload.ok_or(PipelineError::NoFilePart)?;
        let file_name = base_name(&upload.file_name)
            .ok_or(PipelineError::NoFileSelected)?
            .to_string();
        let kind = UploadKind::classify(&file_name, upload.content_type.as_deref());

        let path = self
            .store
            .save(&file_name, &upload.bytes)
            .await
            .map_err(PipelineError::Storage)?;
        info!("received {file_name} ({} bytes, {kind:?})", upload.bytes.len());

        Ok(StoredUpload {
            path,
            file_name,
            kind,
        })
    }

    /// Stage 2: plain-text read or OCR, by upload kind.
    pub async fn extract(&self, upload: &StoredUpload) -> Result<String, PipelineError> {
        self.extractors.for_kind(upload.kind).extract(upload).await
    }

    /// Stage 3: ask the completion API for a simplified version.
    pub async fn simplify(&self, text: &str) -> Result<String, PipelineError> {
        let simplified = self.simplifier.simplify(text).await?.trim().to_string();
        if simplified.is_empty() {
            return Err(PipelineError::EmptySimplificationResult);
        }
        info!("simplified {} chars to {}", text.len(), simplified.len());
        debug!("simplified text:\n{simplified}");
        Ok(simplified)
    }

    /// Stage 5, once per role: synthesize and save one audio file, returning
    /// its URL.
    async fn speak(
        &self,
        request_id: &str,
        role: AudioRole,
        text: &str,
    ) -> Result<String, PipelineError> {
        let wav = self.synthesizer.synthesize(text).await?;
        let file_name = role.file_name(request_id);
        self.store
            .save(&file_name, &wav)
            .await
            .map_err(SynthesisError::Save)?;
        Ok(UploadStore::url_for(&file_name))
    }
}

/// Stage 4: readability of both texts, logged for comparison.
pub fn score_readability(
    original: &str,
    simplified: &str,
) -> Result<ReadabilityReport, PipelineError> {
    let report = readability::report(original, simplified)?;
    info!(
        "Original FKGL: {:.2} → Simplified FKGL: {:.2}",
        report.original.fkgl, report.simplified.fkgl
    );
    info!(
        "Original Dale-Chall: {:.2} → Simplified Dale-Chall: {:.2}",
        report.original.dale_chall, report.simplified.dale_chall
    );
    Ok(report)
}
