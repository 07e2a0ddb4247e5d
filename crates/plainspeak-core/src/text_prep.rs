//! Text preparation — markdown cleaning for speech, sentence and word
//! segmentation for readability scoring.
//!
//! Pure functions, no I/O.

use regex::Regex;
use std::sync::LazyLock;

// Compiled once, reused across requests.
static RE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|\n)(\|[^\n]+\|(?:\n\|[^\n]+\|)*)").unwrap());
static RE_FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static RE_INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RE_HR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-*_]{3,}[ \t]*$").unwrap());
static RE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").unwrap());
static RE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static RE_LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*•]|\d+[.)])[ \t]+").unwrap());
static RE_MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static RE_MULTI_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip markdown so completion output reads naturally when spoken.
///
/// Models often answer with bullet lists and emphasis even when asked for
/// plain prose. Tables and fenced code have no spoken form and are dropped;
/// list items keep their text and lose the marker.
pub fn clean_text_for_tts(text: &str) -> String {
    let mut c = RE_TABLE.replace_all(text, "\n").into_owned();
    c = RE_FENCED_CODE.replace_all(&c, " ").into_owned();
    c = RE_INLINE_CODE.replace_all(&c, "$1").into_owned();
    c = RE_HR.replace_all(&c, "").into_owned();
    // List markers before emphasis, so `* item` lines are not read as italics.
    c = RE_LIST_MARKER.replace_all(&c, "").into_owned();
    c = RE_BOLD.replace_all(&c, "$1").into_owned();
    c = RE_ITALIC.replace_all(&c, "$1").into_owned();
    c = RE_HEADING.replace_all(&c, "").into_owned();
    c = RE_LINK.replace_all(&c, "$1").into_owned();
    c = RE_MULTI_SPACE.replace_all(&c, " ").into_owned();
    c = RE_MULTI_NEWLINE.replace_all(&c, "\n\n").into_owned();

    c.trim().to_string()
}

/// True when the text has something a synthesizer can pronounce: at least
/// one letter or digit. A single letter such as "I" counts.
pub fn is_speakable(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace, and
/// at paragraph breaks (blank lines).
///
/// Returns non-empty, trimmed strings.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        let end = match (c, next) {
            ('\n', Some('\n')) => Some(i),
            ('.' | '!' | '?', Some(n)) if n.is_whitespace() => Some(i + c.len_utf8()),
            _ => None,
        };
        if let Some(end) = end {
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

/// Split text into words: whitespace-separated tokens with punctuation
/// removed. Apostrophes inside a word are kept ("don't"), hyphens are
/// dropped ("well-known" → "wellknown"). Tokens that were pure punctuation
/// are discarded.
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '’')
                .collect::<String>()
        })
        .map(|w| w.trim_matches(|c| c == '\'' || c == '’').to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

fn push_trimmed(out: &mut Vec<String>, chunk: &str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        out.push(chunk.to_string());
    }
}
