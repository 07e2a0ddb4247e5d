//! plainspeak-lib — Upload-and-simplify engine.
//!
//! Upload storage, text extraction (plain text and OCR), LLM simplification,
//! readability scoring, speech synthesis and the HTTP API. Depends on
//! plainspeak-core for pure types and text processing.

pub mod error;
pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod server;
pub mod simplify;
pub mod storage;
pub mod tts;

#[cfg(test)]
mod test_support;

// Re-export plainspeak-core for convenience
pub use plainspeak_core;
