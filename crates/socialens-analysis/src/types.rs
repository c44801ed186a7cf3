use serde::{Deserialize, Serialize};
use socialens_store::{SentimentFields, UserId};

pub const DEFAULT_QUALITY_SCORE: f64 = 0.7;
pub const DEFAULT_SATISFACTION: f64 = 0.7;
pub const DEFAULT_SENTIMENT_SCORE: f64 = 0.7;
pub const DEFAULT_ENGAGEMENT_LEVEL: f64 = 0.6;
pub const DEFAULT_MOOD_NARRATIVE: &str = "Unable to determine mood";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Render a transcript as `role: content` lines.
#[must_use]
pub fn render_conversation(conversation: &[ConversationMessage]) -> String {
    conversation
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Conversation quality along four dimensions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub relevance: f64,
    pub clarity: f64,
    pub flow: f64,
    pub engagement: f64,
}

impl Default for QualityMetrics {
    fn default() -> Self {
        Self {
            relevance: DEFAULT_QUALITY_SCORE,
            clarity: DEFAULT_QUALITY_SCORE,
            flow: DEFAULT_QUALITY_SCORE,
            engagement: DEFAULT_QUALITY_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub score: f64,
    pub emotions: Vec<String>,
    pub engagement_level: f64,
    pub topics: Vec<String>,
    pub mood_narrative: String,
    pub main_topics: Vec<String>,
}

impl Default for SentimentAnalysis {
    fn default() -> Self {
        Self {
            score: DEFAULT_SENTIMENT_SCORE,
            emotions: vec!["neutral".to_owned()],
            engagement_level: DEFAULT_ENGAGEMENT_LEVEL,
            topics: Vec::new(),
            mood_narrative: DEFAULT_MOOD_NARRATIVE.to_owned(),
            main_topics: Vec::new(),
        }
    }
}

impl From<&SentimentAnalysis> for SentimentFields {
    fn from(s: &SentimentAnalysis) -> Self {
        SentimentFields {
            score: s.score,
            emotions: s.emotions.clone(),
            engagement_level: s.engagement_level,
            topics: s.topics.clone(),
            mood_narrative: s.mood_narrative.clone(),
            main_topics: s.main_topics.clone(),
        }
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub quality_metrics: QualityMetrics,
    pub satisfaction: f64,
    pub sentiment: SentimentAnalysis,
    pub recommendations: Vec<String>,
}

impl AnalysisBundle {
    /// The bundle produced when every analyzer falls back.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            quality_metrics: QualityMetrics::default(),
            satisfaction: DEFAULT_SATISFACTION,
            sentiment: SentimentAnalysis::default(),
            recommendations: Vec::new(),
        }
    }
}

/// What the analyzers and the chat prompt know about a user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: UserId,
    pub display_name: String,
    pub profile_summary: String,
    pub social_summary: Option<String>,
    pub platforms: Vec<String>,
}

impl UserContext {
    /// Context for a user nothing is known about yet.
    #[must_use]
    pub fn anonymous(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Prompt-ready text block. Empty sections are omitted.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if !self.display_name.is_empty() {
            parts.push(format!("Name: {}", self.display_name));
        }
        if !self.profile_summary.is_empty() {
            parts.push(format!("Profile analysis:\n{}", self.profile_summary));
        }
        if let Some(social) = &self.social_summary {
            parts.push(format!("Social media analysis:\n{social}"));
        }
        if !self.platforms.is_empty() {
            parts.push(format!("Platforms: {}", self.platforms.join(", ")));
        }
        if parts.is_empty() {
            "No user context available.".to_owned()
        } else {
            parts.join("\n\n")
        }
    }
}
