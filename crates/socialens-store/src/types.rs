use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TurnId = i64;

/// One user message and the reply it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub user_id: UserId,
    pub message: String,
    pub response: String,
    pub satisfaction_score: f64,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Characters in the message and the response combined.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.message.chars().count() + self.response.chars().count()
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Sentiment portion of an analysis, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentFields {
    pub score: f64,
    pub emotions: Vec<String>,
    pub engagement_level: f64,
    pub topics: Vec<String>,
    pub mood_narrative: String,
    pub main_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: i64,
    pub user_id: UserId,
    pub conversation_id: TurnId,
    pub fields: SentimentFields,
    pub date: NaiveDate,
}
