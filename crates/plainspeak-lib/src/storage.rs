//! Working directory for uploads and generated audio.
//!
//! Uploaded files keep their client-supplied name, so two uploads with the
//! same name overwrite each other. Audio files carry a per-request id and
//! never collide.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use plainspeak_core::types::{UploadKind, UPLOADS_ROUTE};

/// A file persisted at ingress.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: UploadKind,
}

/// Handle to the working directory. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open the working directory, creating it if absent.
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under `file_name`, replacing any existing file.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        debug!("stored {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Relative URL under which `file_name` is served.
    pub fn url_for(file_name: &str) -> String {
        format!("{UPLOADS_ROUTE}/{file_name}")
    }
}

/// Final path component of a client-supplied filename.
///
/// Browsers on Windows may send full paths, and a hostile client may send
/// `../` segments; only the last component is ever used on disk. Returns
/// `None` when nothing usable remains.
pub fn base_name(raw: &str) -> Option<&str> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
