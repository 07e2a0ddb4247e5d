//! WAV header utilities for synthesized speech.
//!
//! Pure functions, no I/O. The TTS client buffers a whole response, patches
//! streaming size sentinels and validates the header before the audio is
//! written to the working directory.

/// Size sentinel written by servers that stream WAV with unknown length.
const STREAMING_SIZE: u32 = 0xFFFF_FFFF;

/// Parsed WAV header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Byte offset in the buffer where raw PCM data begins.
    pub data_offset: usize,
}

impl WavHeader {
    /// Playback length of `data_len` bytes of PCM in this format.
    pub fn duration_ms(&self, data_len: usize) -> u64 {
        let bytes_per_sec = self.sample_rate as u64
            * self.channels as u64
            * (self.bits_per_sample as u64 / 8).max(1);
        if bytes_per_sec == 0 {
            return 0;
        }
        data_len as u64 * 1000 / bytes_per_sec
    }
}

/// Parse a PCM WAV header.
///
/// Chunk sizes equal to the streaming sentinel are ignored, so headers from
/// chunked responses parse before [`fix_wav_sizes`] has run.
pub fn parse_wav_header(buf: &[u8]) -> Result<WavHeader, &'static str> {
    if buf.len() < 12 {
        return Err("too short for RIFF header");
    }
    if &buf[0..4] != b"RIFF" {
        return Err("missing RIFF tag");
    }
    if &buf[8..12] != b"WAVE" {
        return Err("missing WAVE tag");
    }

    let mut pos = 12;
    let mut format: Option<(u16, u32, u16)> = None;

    while pos + 8 <= buf.len() {
        let chunk_id = &buf[pos..pos + 4];
        let chunk_size = read_u32(buf, pos + 4);

        if chunk_id == b"fmt " {
            if pos + 24 > buf.len() {
                return Err("fmt chunk truncated");
            }
            if read_u16(buf, pos + 8) != 1 {
                return Err("not PCM format");
            }
            format = Some((
                read_u16(buf, pos + 10),
                read_u32(buf, pos + 12),
                read_u16(buf, pos + 22),
            ));
            let skip = if chunk_size == STREAMING_SIZE {
                16
            } else {
                chunk_size as usize
            };
            pos += 8 + skip;
            continue;
        }

        if chunk_id == b"data" {
            let (channels, sample_rate, bits_per_sample) =
                format.ok_or("data chunk before fmt chunk")?;
            return Ok(WavHeader {
                channels,
                sample_rate,
                bits_per_sample,
                data_offset: pos + 8,
            });
        }

        let skip = if chunk_size == STREAMING_SIZE {
            0
        } else {
            chunk_size as usize
        };
        pos += 8 + skip;
    }

    Err("data chunk not found")
}

/// Replace streaming size sentinels in the RIFF and `data` chunk headers
/// with the real sizes of a fully buffered file.
pub fn fix_wav_sizes(mut wav: Vec<u8>) -> Vec<u8> {
    if wav.len() < 44 || &wav[0..4] != b"RIFF" {
        return wav;
    }
    let riff_size = (wav.len() - 8) as u32;
    wav[4..8].copy_from_slice(&riff_size.to_le_bytes());

    let mut pos = 12;
    while pos + 8 <= wav.len() {
        if &wav[pos..pos + 4] == b"data" {
            let data_size = (wav.len() - pos - 8) as u32;
            wav[pos + 4..pos + 8].copy_from_slice(&data_size.to_le_bytes());
            break;
        }
        let chunk_size = read_u32(&wav, pos + 4);
        let skip = if chunk_size == STREAMING_SIZE {
            0
        } else {
            chunk_size as usize
        };
        pos += 8 + skip;
    }

    wav
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
