//! URL classification against a fixed platform-domain table.

use serde::Serialize;

/// Social platforms the pipeline knows how to reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    TwitterX,
    Threads,
    LinkedIn,
    Facebook,
    TikTok,
    YouTube,
    Unknown,
}

impl Platform {
    /// Human-readable platform name used in reports and prompts.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::TwitterX => "Twitter/X",
            Platform::Threads => "Threads",
            Platform::LinkedIn => "LinkedIn",
            Platform::Facebook => "Facebook",
            Platform::TikTok => "TikTok",
            Platform::YouTube => "YouTube",
            Platform::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One row of the platform taxonomy.
struct PlatformEntry {
    platform: Platform,
    domains: &'static [&'static str],
    content_category: &'static str,
    known_blocked: bool,
}

/// Platform → domain patterns.
///
/// `known_blocked` marks platforms observed to reject non-browser HTTP
/// clients outright (login walls, JS-only shells, 429s on first request).
const PLATFORM_TABLE: &[PlatformEntry] = &[
    PlatformEntry {
        platform: Platform::Instagram,
        domains: &["instagram.com", "instagr.am"],
        content_category: "photo_sharing",
        known_blocked: true,
    },
    PlatformEntry {
        platform: Platform::TwitterX,
        domains: &["twitter.com", "x.com", "t.co"],
        content_category: "microblogging",
        known_blocked: true,
    },
    PlatformEntry {
        platform: Platform::Threads,
        domains: &["threads.net", "threads.com"],
        content_category: "text_conversations",
        known_blocked: true,
    },
    PlatformEntry {
        platform: Platform::LinkedIn,
        domains: &["linkedin.com", "lnkd.in"],
        content_category: "professional_network",
        known_blocked: false,
    },
    PlatformEntry {
        platform: Platform::Facebook,
        domains: &["facebook.com", "fb.com", "fb.me"],
        content_category: "social_network",
        known_blocked: true,
    },
    PlatformEntry {
        platform: Platform::TikTok,
        domains: &["tiktok.com"],
        content_category: "short_video",
        known_blocked: true,
    },
    PlatformEntry {
        platform: Platform::YouTube,
        domains: &["youtube.com", "youtu.be"],
        content_category: "video_sharing",
        known_blocked: false,
    },
];

const UNKNOWN_CATEGORY: &str = "general_web";

/// Classification of one input URL. Derived once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlDescriptor {
    pub raw_url: String,
    pub platform: Platform,
    pub content_category: &'static str,
    pub known_blocked: bool,
}

/// Classify a URL into a platform taxonomy entry.
///
/// Total and deterministic: every input yields a descriptor. Matching is
/// case-insensitive. When the input parses as a URL (a missing scheme is
/// treated as `https://`), a domain matches when it equals the host or is a
/// parent domain of it, so `x.com` does not match `dropbox.com`. Inputs that
/// cannot be parsed at all fall back to substring matching.
#[must_use]
pub fn classify(raw_url: &str) -> UrlDescriptor {
    let entry = match parse_host(raw_url) {
        Some(host) => PLATFORM_TABLE
            .iter()
            .find(|entry| entry.domains.iter().any(|d| host_matches(&host, d))),
        None => {
            let lowered = raw_url.to_lowercase();
            PLATFORM_TABLE
                .iter()
                .find(|entry| entry.domains.iter().any(|d| lowered.contains(d)))
        }
    };

    match entry {
        Some(entry) => UrlDescriptor {
            raw_url: raw_url.to_owned(),
            platform: entry.platform,
            content_category: entry.content_category,
            known_blocked: entry.known_blocked,
        },
        None => UrlDescriptor {
            raw_url: raw_url.to_owned(),
            platform: Platform::Unknown,
            content_category: UNKNOWN_CATEGORY,
            known_blocked: false,
        },
    }
}

/// Parse `raw_url` into a URL, assuming `https://` when no scheme is given.
pub(crate) fn parse_url(raw_url: &str) -> Option<reqwest::Url> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    reqwest::Url::parse(&candidate)
        .ok()
        .filter(|url| url.host_str().is_some())
}

fn parse_host(raw_url: &str) -> Option<String> {
    parse_url(raw_url).and_then(|url| url.host_str().map(str::to_lowercase))
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
