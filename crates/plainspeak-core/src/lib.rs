//! plainspeak-core — Pure types, readability metrics and text processing.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod readability;
pub mod text_prep;
pub mod types;
pub mod wav;
