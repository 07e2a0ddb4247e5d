//! Speech synthesis — text → WAV via a Kokoro server's OpenAI-compatible
//! `/v1/audio/speech` endpoint.
//!
//! ```text
//! synthesize(text) → clean markdown → POST Kokoro (wav) → buffer body
//!     → patch streaming sizes → validate header → WAV bytes
//! ```
//!
//! Output language is fixed to English: the request pins Kokoro's American
//! English pipeline and the configured voice must be an English one.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use plainspeak_core::text_prep::{clean_text_for_tts, is_speakable};
use plainspeak_core::types::TtsConfig;
use plainspeak_core::wav::{fix_wav_sizes, parse_wav_header};

/// Kokoro language code for American English.
const ENGLISH_LANG_CODE: &str = "a";

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("nothing to speak")]
    NothingToSpeak,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Kokoro returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid audio: {0}")]
    InvalidAudio(&'static str),

    #[error("cannot save audio: {0}")]
    Save(#[source] std::io::Error),
}

/// Converts text to encoded audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns a complete WAV file.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

/// [`SpeechSynthesizer`] backed by a Kokoro server.
#[derive(Clone)]
pub struct KokoroSynthesizer {
    client: reqwest::Client,
    url: String,
    voice: String,
    speed: f32,
}

impl KokoroSynthesizer {
    pub fn new(config: TtsConfig) -> Self {
        let url = format!("{}/v1/audio/speech", config.kokoro_url.trim_end_matches('/'));
        Self {
            client: reqwest::Client::new(),
            url,
            voice: config.voice,
            speed: config.speed,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for KokoroSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let cleaned = clean_text_for_tts(text);
        if !is_speakable(&cleaned) {
            return Err(SynthesisError::NothingToSpeak);
        }

        let body = serde_json::json!({
            "input": cleaned,
            "voice": self.voice,
            "model": "kokoro",
            "response_format": "wav",
            "stream": false,
            "speed": self.speed,
            "lang_code": ENGLISH_LANG_CODE,
        });

        debug!("tts: POST {} chars", cleaned.len());

        let resp = self.client.post(&self.url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SynthesisError::Status { status, body });
        }

        let wav = fix_wav_sizes(resp.bytes().await?.to_vec());
        let header = parse_wav_header(&wav).map_err(SynthesisError::InvalidAudio)?;
        debug!(
            "tts: {} bytes, {} ms at {} Hz",
            wav.len(),
            header.duration_ms(wav.len() - header.data_offset),
            header.sample_rate
        );

        Ok(wav)
    }
}
