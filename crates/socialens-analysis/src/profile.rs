//! Builds the [`UserContext`] the analyzers and chat prompt draw on.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use socialens_core::Completer;
use socialens_scraper::AcquisitionEngine;
use socialens_store::UserId;

use crate::types::UserContext;

/// What a user told us about themselves at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub bio: String,
    pub interests: Vec<String>,
    pub social_links: Vec<String>,
}

/// Analyze the profile and the user's social links concurrently and merge
/// both into a [`UserContext`].
///
/// Never fails: a failed profile analysis degrades to a templated summary,
/// and a profile without links gets no social summary.
pub async fn build_user_context(
    completer: &dyn Completer,
    engine: &AcquisitionEngine,
    profile: &UserProfile,
) -> UserContext {
    let (profile_summary, report) = tokio::join!(
        analyze_profile(completer, profile),
        engine.analyze_urls(profile.social_links.as_slice()),
    );

    let (social_summary, platforms) = if report.is_empty() {
        (None, Vec::new())
    } else {
        let platforms = report
            .accessibility
            .iter()
            .map(|note| note.platform.display_name().to_owned())
            .collect();
        (Some(report.summary), platforms)
    };

    UserContext {
        user_id: profile.user_id,
        display_name: profile.display_name.clone(),
        profile_summary,
        social_summary,
        platforms,
    }
}

async fn analyze_profile(completer: &dyn Completer, profile: &UserProfile) -> String {
    match completer.complete(&profile_prompt(profile)).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
        Ok(_) => {
            tracing::warn!(
                user_id = profile.user_id,
                "profile analysis was blank; using template"
            );
            template_profile(profile)
        }
        Err(e) => {
            tracing::warn!(
                user_id = profile.user_id,
                error = %e,
                "profile analysis failed; using template"
            );
            template_profile(profile)
        }
    }
}

fn profile_prompt(profile: &UserProfile) -> String {
    format!(
        "Analyze this user profile to help personalize future conversations.\n\n\
         {facts}\n\n\
         Respond with exactly these sections:\n\
         KEY INTERESTS:\n- ...\n\
         PERSONALITY TRAITS:\n- ...\n\
         CONVERSATION TOPICS:\n- ...",
        facts = profile_facts(profile),
    )
}

fn template_profile(profile: &UserProfile) -> String {
    format!(
        "{}\nAutomated profile analysis unavailable.",
        profile_facts(profile)
    )
}

fn profile_facts(profile: &UserProfile) -> String {
    let mut out = String::new();
    let name = if profile.display_name.is_empty() {
        "(not given)"
    } else {
        profile.display_name.as_str()
    };
    let _ = writeln!(out, "Name: {name}");
    if !profile.bio.trim().is_empty() {
        let _ = writeln!(out, "Bio: {}", profile.bio.trim());
    }
    if !profile.interests.is_empty() {
        let _ = writeln!(out, "Interests: {}", profile.interests.join(", "));
    }
    let _ = write!(out, "Social links: {}", profile.social_links.len());
    out
}
