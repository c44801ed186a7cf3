//! Structural URL analysis: what can be inferred from a URL's path and query
//! alone, without any network access.
//!
//! Used as the last-resort fallback when scraping fails and as the only
//! source of content for known-blocked platforms.

use std::collections::BTreeSet;

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::platform::{classify, parse_url, Platform, UrlDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Profile,
    PhotoPost,
    Reel,
    Story,
    Video,
    Short,
    Post,
    Reply,
    Media,
    Channel,
    Company,
    Article,
    Group,
    Hashtag,
    Playlist,
}

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Profile => "profile",
            ContentType::PhotoPost => "photo_post",
            ContentType::Reel => "reel",
            ContentType::Story => "story",
            ContentType::Video => "video",
            ContentType::Short => "short",
            ContentType::Post => "post",
            ContentType::Reply => "reply",
            ContentType::Media => "media",
            ContentType::Channel => "channel",
            ContentType::Company => "company",
            ContentType::Article => "article",
            ContentType::Group => "group",
            ContentType::Hashtag => "hashtag",
            ContentType::Playlist => "playlist",
        }
    }

    /// Whether the URL points at one specific piece of published content.
    fn is_content_item(self) -> bool {
        matches!(
            self,
            ContentType::PhotoPost
                | ContentType::Reel
                | ContentType::Story
                | ContentType::Video
                | ContentType::Short
                | ContentType::Post
                | ContentType::Reply
                | ContentType::Media
                | ContentType::Article
        )
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityLevel::Low => f.write_str("low"),
            ActivityLevel::Moderate => f.write_str("moderate"),
            ActivityLevel::High => f.write_str("high"),
        }
    }
}

/// Attributes derived purely from URL text. Cheap to recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralAnalysis {
    pub descriptor: UrlDescriptor,
    pub username: Option<String>,
    pub content_type: ContentType,
    pub engagement_indicators: BTreeSet<&'static str>,
    pub content_themes: BTreeSet<&'static str>,
    pub activity_level: ActivityLevel,
}

/// Engagement signals a page of each content type usually exposes.
const ENGAGEMENT_TABLE: &[(ContentType, &[&str])] = &[
    (ContentType::Profile, &["followers", "following", "posts"]),
    (ContentType::PhotoPost, &["likes", "comments", "saves"]),
    (ContentType::Reel, &["views", "likes", "shares"]),
    (ContentType::Story, &["views", "replies"]),
    (ContentType::Video, &["views", "likes", "comments"]),
    (ContentType::Short, &["views", "likes"]),
    (ContentType::Post, &["likes", "replies", "reposts"]),
    (ContentType::Reply, &["replies", "likes"]),
    (ContentType::Media, &["views", "likes"]),
    (ContentType::Channel, &["subscribers", "views", "uploads"]),
    (ContentType::Company, &["followers", "employees"]),
    (ContentType::Article, &["reactions", "comments"]),
    (ContentType::Group, &["members", "posts"]),
    (ContentType::Hashtag, &["post_count"]),
    (ContentType::Playlist, &["videos", "views"]),
];

/// Handle keyword → theme tag.
///
/// Keywords of three or more letters must start a handle token; shorter ones
/// must equal a whole token (so `ai` does not fire on `daisy`).
const THEME_TABLE: &[(&str, &[&str])] = &[
    ("fitness", &["fit", "gym", "workout", "yoga", "run", "muscle", "lift"]),
    ("food", &["food", "chef", "cook", "eat", "bake", "recipe", "kitchen"]),
    ("travel", &["travel", "wander", "trip", "explore", "nomad", "voyage"]),
    ("technology", &["tech", "dev", "code", "ai", "data", "hack", "software"]),
    ("art", &["art", "design", "draw", "paint", "creative", "illustr"]),
    ("music", &["music", "beat", "dj", "song", "band", "sound"]),
    ("fashion", &["style", "fashion", "outfit", "wear", "vogue"]),
    ("gaming", &["game", "gamer", "play", "esport", "twitch"]),
    ("photography", &["photo", "cam", "shoot", "lens", "pic"]),
    ("business", &["biz", "ceo", "founder", "startup", "brand", "consult"]),
    ("beauty", &["beauty", "makeup", "skin", "glow", "nails"]),
    ("education", &["learn", "teach", "edu", "study", "tutor"]),
];

/// Path segments that are site sections, never handles.
const RESERVED_SEGMENTS: &[&str] = &[
    "about", "accounts", "c", "channel", "company", "direct", "discover", "events",
    "explore", "feed", "foryou", "groups", "hashtag", "home", "i", "in", "intent",
    "marketplace", "music", "p", "pages", "playlist", "posts", "pulse", "reel", "reels",
    "search", "settings", "share", "sharer", "shorts", "stories", "tag", "tv", "user",
    "watch",
];

/// Analyze a raw URL string. Never fails.
#[must_use]
pub fn analyze_url(raw_url: &str) -> StructuralAnalysis {
    analyze_descriptor(&classify(raw_url))
}

/// Analyze an already-classified URL. Never fails; URLs with no recognizable
/// pattern degrade to a `profile` with `low` activity.
#[must_use]
pub fn analyze_descriptor(descriptor: &UrlDescriptor) -> StructuralAnalysis {
    let (username, content_type) = match parse_url(&descriptor.raw_url) {
        Some(url) => match_patterns(descriptor.platform, &url),
        None => (None, ContentType::Profile),
    };

    let engagement_indicators: BTreeSet<&'static str> = ENGAGEMENT_TABLE
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, tags)| tags.iter().copied().collect())
        .unwrap_or_default();

    let content_themes = username.as_deref().map(match_themes).unwrap_or_default();

    let activity_level = if content_type.is_content_item() {
        ActivityLevel::High
    } else if username.is_some() {
        ActivityLevel::Moderate
    } else {
        ActivityLevel::Low
    };

    StructuralAnalysis {
        descriptor: descriptor.clone(),
        username,
        content_type,
        engagement_indicators,
        content_themes,
        activity_level,
    }
}

fn match_patterns(platform: Platform, url: &reqwest::Url) -> (Option<String>, ContentType) {
    let segments: Vec<String> = url
        .path_segments()
        .map(|segs| {
            segs.filter(|s| !s.is_empty())
                .map(|s| percent_decode_str(s).decode_utf8_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    let segs: Vec<&str> = segments.iter().map(String::as_str).collect();
    let query = |key: &str| -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.to_string())
    };
    let lowered: Vec<String> = segs.iter().map(|s| s.to_lowercase()).collect();
    let lower: Vec<&str> = lowered.iter().map(String::as_str).collect();

    let (handle, content_type) = match platform {
        Platform::Instagram => match (lower.as_slice(), segs.as_slice()) {
            (["p", ..], _) => (None, ContentType::PhotoPost),
            (["reel" | "reels", ..], _) => (None, ContentType::Reel),
            (["tv", ..], _) => (None, ContentType::Video),
            (["stories", _, ..], [_, user, ..]) => (Some(*user), ContentType::Story),
            (["explore", "tags", _, ..], _) => (None, ContentType::Hashtag),
            ([_, "p", ..], [user, ..]) => (Some(*user), ContentType::PhotoPost),
            ([_, "reel" | "reels", ..], [user, ..]) => (Some(*user), ContentType::Reel),
            ([first, ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Profile)
            }
            _ => (None, ContentType::Profile),
        },
        Platform::TwitterX => match (lower.as_slice(), segs.as_slice()) {
            (["hashtag", _, ..], _) => (None, ContentType::Hashtag),
            ([first, "status", ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Post)
            }
            ([first, "with_replies", ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Reply)
            }
            ([first, "media", ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Media)
            }
            ([first, ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Profile)
            }
            _ => (None, ContentType::Profile),
        },
        Platform::Threads => match (lower.as_slice(), segs.as_slice()) {
            ([_, "post", ..], [user, ..]) => (Some(*user), ContentType::Post),
            ([_, "replies", ..], [user, ..]) => (Some(*user), ContentType::Reply),
            ([first, ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Profile)
            }
            _ => (None, ContentType::Profile),
        },
        Platform::LinkedIn => match (lower.as_slice(), segs.as_slice()) {
            (["in", _, ..], [_, user, ..]) => (Some(*user), ContentType::Profile),
            (["company", _, ..], [_, name, ..]) => (Some(*name), ContentType::Company),
            (["posts", _, ..], [_, slug, ..]) => {
                (slug.split('_').next(), ContentType::Post)
            }
            (["feed", "update", ..], _) => (None, ContentType::Post),
            (["pulse", ..], _) => (None, ContentType::Article),
            _ => (None, ContentType::Profile),
        },
        Platform::Facebook => match (lower.as_slice(), segs.as_slice()) {
            (["profile.php"], _) => {
                return (
                    query("id").and_then(|id| normalize_handle(&id)),
                    ContentType::Profile,
                );
            }
            (["groups", _, ..], [_, group, ..]) => (Some(*group), ContentType::Group),
            (["watch", ..], _) => (None, ContentType::Video),
            ([first, "posts", ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Post)
            }
            ([first, "videos", ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Video)
            }
            ([first, "photos", ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::PhotoPost)
            }
            ([first, ..], [user, ..]) if !is_reserved(first) => {
                (Some(*user), ContentType::Profile)
            }
            _ => (None, ContentType::Profile),
        },
        Platform::TikTok => match (lower.as_slice(), segs.as_slice()) {
            (["tag", _, ..], _) => (None, ContentType::Hashtag),
            ([_, "video", ..], [user, ..]) => (Some(*user), ContentType::Video),
            ([first, ..], [user, ..]) if first.starts_with('@') => {
                (Some(*user), ContentType::Profile)
            }
            _ => (None, ContentType::Profile),
        },
        Platform::YouTube => {
            let short_link = url
                .host_str()
                .is_some_and(|h| h.eq_ignore_ascii_case("youtu.be"));
            match (lower.as_slice(), segs.as_slice()) {
                ([_, ..], _) if short_link => (None, ContentType::Video),
                (["watch", ..], _) if query("v").is_some() => (None, ContentType::Video),
                (["shorts", _, ..], _) => (None, ContentType::Short),
                (["playlist", ..], _) if query("list").is_some() => {
                    (None, ContentType::Playlist)
                }
                (["channel" | "c" | "user", _, ..], [_, name, ..]) => {
                    (Some(*name), ContentType::Channel)
                }
                ([first, ..], [handle, ..]) if first.starts_with('@') => {
                    (Some(*handle), ContentType::Channel)
                }
                _ => (None, ContentType::Profile),
            }
        }
        Platform::Unknown => (None, ContentType::Profile),
    };

    (handle.and_then(normalize_handle), content_type)
}

fn is_reserved(segment: &str) -> bool {
    RESERVED_SEGMENTS.contains(&segment)
}

fn normalize_handle(raw: &str) -> Option<String> {
    let handle = raw.trim().trim_start_matches('@').trim();
    if handle.is_empty() {
        None
    } else {
        Some(handle.to_owned())
    }
}

fn match_themes(handle: &str) -> BTreeSet<&'static str> {
    let tokens = handle_tokens(handle);

    THEME_TABLE
        .iter()
        .filter(|(_, keywords)| {
            keywords.iter().any(|kw| {
                tokens.iter().any(|token| {
                    if kw.len() >= 3 {
                        token.starts_with(kw)
                    } else {
                        token == kw
                    }
                })
            })
        })
        .map(|(theme, _)| *theme)
        .collect()
}

/// Lowercased handle words, split at non-letters and at camel-case humps.
fn handle_tokens(handle: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in handle.chars() {
        if !c.is_alphabetic() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
#[path = "structural_test.rs"]
mod tests;
