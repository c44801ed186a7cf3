//! Text rendering for structural fallbacks.

use std::fmt::Write as _;

use crate::platform::Platform;
use crate::structural::StructuralAnalysis;

pub const NOT_ACCESSIBLE_NOTE: &str = "not accessible, platform restricts automated access";
pub const SCRAPING_FAILED_NOTE: &str = "scraping failed, showing structural analysis";

/// Canned description of how people typically use each platform.
#[must_use]
pub fn platform_narrative(platform: Platform) -> &'static str {
    match platform {
        Platform::Instagram => {
            "Instagram activity centres on curated photos, reels and stories. \
             Users tend to express identity visually, follow creators and friends, \
             and engage through likes, comments and story replies."
        }
        Platform::TwitterX => {
            "Twitter/X activity is short-form and conversational. Users follow news \
             and personalities, share opinions in real time, and engage through \
             replies, reposts and quote posts."
        }
        Platform::Threads => {
            "Threads activity is text-first conversation linked to an Instagram \
             identity. Users post casual updates and join discussions through \
             replies and reposts."
        }
        Platform::LinkedIn => {
            "LinkedIn activity is professional. Users present career history and \
             skills, share industry updates and articles, and network through \
             connections, endorsements and comments."
        }
        Platform::Facebook => {
            "Facebook activity mixes personal updates, photos, group membership and \
             event participation. Users engage with friends and communities through \
             reactions, comments and shares."
        }
        Platform::TikTok => {
            "TikTok activity revolves around short vertical videos shaped by trends, \
             sounds and challenges. Users create or remix content and engage through \
             likes, comments, duets and shares."
        }
        Platform::YouTube => {
            "YouTube activity centres on long and short form video. Channels publish \
             tutorials, entertainment or vlogs, and audiences engage through views, \
             subscriptions and comments."
        }
        Platform::Unknown => {
            "This site is not a recognised social platform. Its content reflects \
             whatever the owner chose to publish."
        }
    }
}

/// Render a structural analysis as a readable block.
///
/// `note` heads the block so downstream readers can tell fallback content
/// from scraped text. The platform narrative is included only when asked.
#[must_use]
pub fn render_structural(
    analysis: &StructuralAnalysis,
    note: &str,
    include_platform_narrative: bool,
) -> String {
    let platform = analysis.descriptor.platform;
    let mut out = String::new();

    let _ = writeln!(out, "{platform} ({note})");
    let _ = writeln!(out, "URL: {}", analysis.descriptor.raw_url);
    let _ = writeln!(out, "Content type: {}", analysis.content_type);
    if let Some(username) = &analysis.username {
        let _ = writeln!(out, "Username: {username}");
    }
    let _ = writeln!(out, "Activity level: {}", analysis.activity_level);
    if !analysis.engagement_indicators.is_empty() {
        let indicators: Vec<&str> = analysis.engagement_indicators.iter().copied().collect();
        let _ = writeln!(out, "Engagement indicators: {}", indicators.join(", "));
    }
    if !analysis.content_themes.is_empty() {
        let themes: Vec<&str> = analysis.content_themes.iter().copied().collect();
        let _ = writeln!(out, "Content themes: {}", themes.join(", "));
    }
    if include_platform_narrative {
        let _ = writeln!(out, "Platform behaviour: {}", platform_narrative(platform));
    }

    out.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural::analyze_url;

    #[test]
    fn blocked_rendering_includes_note_and_narrative() {
        let analysis = analyze_url("https://www.tiktok.com/@chef.maria/video/1");
        let text = render_structural(&analysis, NOT_ACCESSIBLE_NOTE, true);
        assert!(text.starts_with("TikTok (not accessible, platform restricts automated access)"));
        assert!(text.contains("Username: chef.maria"));
        assert!(text.contains("Content type: video"));
        assert!(text.contains("Content themes: food"));
        assert!(text.contains("short vertical videos"));
    }

    #[test]
    fn failed_rendering_omits_narrative() {
        let analysis = analyze_url("https://example.com/");
        let text = render_structural(&analysis, SCRAPING_FAILED_NOTE, false);
        assert!(text.contains(SCRAPING_FAILED_NOTE));
        assert!(!text.contains("Platform behaviour"));
        assert!(!text.contains("Username:"));
    }

    #[test]
    fn every_platform_has_a_narrative() {
        for platform in [
            Platform::Instagram,
            Platform::TwitterX,
            Platform::Threads,
            Platform::LinkedIn,
            Platform::Facebook,
            Platform::TikTok,
            Platform::YouTube,
            Platform::Unknown,
        ] {
            assert!(!platform_narrative(platform).is_empty());
        }
    }
}
