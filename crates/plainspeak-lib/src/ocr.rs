//! OCR engines. The production engine shells out to the `tesseract` CLI.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use plainspeak_core::types::OcrConfig;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("cannot run {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{cmd} exited with {status}: {stderr}")]
    Failed {
        cmd: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("engine output is not UTF-8: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Engine(String),
}

/// Something that turns an image file into text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine identifier for logs.
    fn name(&self) -> &'static str;

    /// Recognize the text in the image at `path`. May return whitespace only;
    /// emptiness is judged by the caller.
    async fn recognize(&self, path: &Path) -> Result<String, OcrError>;
}

/// OCR engine wrapping the `tesseract` CLI tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    cmd: String,
    language: String,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            cmd: config.tesseract_cmd.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, path: &Path) -> Result<String, OcrError> {
        debug!("{} -l {} {}", self.cmd, self.language, path.display());

        // `stdout` as the output base makes tesseract print instead of
        // writing `<base>.txt`.
        let output = Command::new(&self.cmd)
            .arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OcrError::Spawn {
                cmd: self.cmd.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                cmd: self.cmd.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
