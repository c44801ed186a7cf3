//! Content validation for fetched pages.
//!
//! Cheap lexical checks run first: a page that asks for JavaScript or shows a
//! block/challenge banner is rejected before any extraction or uniqueness
//! work happens, even when it would also fail the length or diversity checks.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Minimum characters of extracted text for a page to count as content.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Extracted text is truncated to this many characters.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Pages whose unique-word ratio falls below this are templated filler.
pub const MIN_UNIQUE_WORD_RATIO: f64 = 0.30;

const JS_REQUIRED_PHRASES: &[&str] = &[
    "enable javascript",
    "javascript is required",
    "javascript is disabled",
    "javascript must be enabled",
    "requires javascript",
    "turn on javascript",
    "please enable js",
    "you need to enable javascript",
];

const BLOCKING_PHRASES: &[&str] = &[
    "access denied",
    "access to this page has been denied",
    "rate limit",
    "too many requests",
    "forbidden",
    "unavailable",
    "unusual traffic",
    "are you a robot",
    "verify you are human",
    "captcha",
    "attention required! | cloudflare",
    "/cdn-cgi/challenge-platform/",
    "cf-chl-",
    "log in to continue",
    "sign in to continue",
    "sign in to view",
    "join to view",
    "authwall",
];

static BOILERPLATE_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<(script|style|noscript|nav|header|footer|aside|svg|template)\b[^>]*>.*?</(script|style|noscript|nav|header|footer|aside|svg|template)\s*>",
    )
    .expect("valid boilerplate regex")
});

static MAIN_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<main\b[^>]*>(.*?)</main\s*>|<article\b[^>]*>(.*?)</article\s*>|<(?:div|section)\b[^>]*role\s*=\s*["']main["'][^>]*>(.*?)</(?:div|section)\s*>"#,
    )
    .expect("valid main-region regex")
});

static BODY_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)</body\s*>").expect("valid body regex"));

static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"));

/// Outcome of validating one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentVerdict {
    /// Usable text, already cleaned and truncated to [`MAX_CONTENT_CHARS`].
    Valid(String),
    JsRequired,
    Blocked,
    Insufficient,
    Repetitive,
}

/// Validity tag recorded per fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    Valid,
    JsRequired,
    Blocked,
    Insufficient,
    Repetitive,
    TransportError,
}

impl ContentVerdict {
    #[must_use]
    pub fn validity(&self) -> Validity {
        match self {
            ContentVerdict::Valid(_) => Validity::Valid,
            ContentVerdict::JsRequired => Validity::JsRequired,
            ContentVerdict::Blocked => Validity::Blocked,
            ContentVerdict::Insufficient => Validity::Insufficient,
            ContentVerdict::Repetitive => Validity::Repetitive,
        }
    }
}

/// Validate raw page text or a raw HTML document.
#[must_use]
pub fn validate_content(raw: &str) -> ContentVerdict {
    let lowered = raw.to_lowercase();

    if JS_REQUIRED_PHRASES.iter().any(|p| lowered.contains(p)) {
        return ContentVerdict::JsRequired;
    }
    if BLOCKING_PHRASES.iter().any(|p| lowered.contains(p)) {
        return ContentVerdict::Blocked;
    }

    let text = extract_text(raw);
    if text.chars().count() < MIN_CONTENT_CHARS {
        return ContentVerdict::Insufficient;
    }
    if unique_word_ratio(&text) < MIN_UNIQUE_WORD_RATIO {
        return ContentVerdict::Repetitive;
    }

    ContentVerdict::Valid(truncate_chars(&text, MAX_CONTENT_CHARS))
}

/// Pull readable text out of a page: main content region when one exists,
/// otherwise the body, otherwise the whole input.
pub(crate) fn extract_text(raw: &str) -> String {
    let without_comments = COMMENTS.replace_all(raw, " ");
    let stripped = BOILERPLATE_BLOCKS.replace_all(&without_comments, " ");

    let region = MAIN_REGION
        .captures(&stripped)
        .and_then(|cap| cap.iter().skip(1).flatten().next().map(|m| m.as_str()))
        .or_else(|| {
            BODY_REGION
                .captures(&stripped)
                .and_then(|cap| cap.get(1).map(|m| m.as_str()))
        })
        .unwrap_or(&stripped);

    let no_tags = TAGS.replace_all(region, " ");
    let decoded = decode_entities(&no_tags);
    decoded
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(input: &str) -> String {
    input
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Ratio of distinct words to total words, ignoring case and punctuation.
fn unique_word_ratio(text: &str) -> f64 {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    #[allow(clippy::cast_precision_loss)]
    let ratio = unique.len() as f64 / words.len() as f64;
    ratio
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_owned(),
        None => text.to_owned(),
    }
}
