//! Conversation persistence contract and the aggregations built on it.
//!
//! Durable storage lives behind [`ConversationStore`]; this crate ships an
//! in-memory implementation plus the pure session and day rollups that
//! consume stored rows.

pub mod daily;
pub mod memory;
pub mod sessions;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub use daily::{summarize_days, window_start, DaySummary};
pub use memory::MemoryStore;
pub use sessions::{group_into_sessions, ConversationPair, Session, SessionExcerpt};
pub use types::{ConversationTurn, SentimentFields, SentimentRecord, TurnId, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation turn {turn_id} not found for user {user_id}")]
    TurnNotFound { user_id: UserId, turn_id: TurnId },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Storage collaborator for conversation turns and per-turn sentiment.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist a completed turn and return its id. Turns are immutable once
    /// saved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the write.
    async fn save_turn(
        &self,
        user_id: UserId,
        message: &str,
        response: &str,
        satisfaction_score: f64,
    ) -> Result<TurnId, StoreError>;

    /// Attach sentiment to a saved turn. A second save for the same turn
    /// replaces the first, so each turn has at most one record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TurnNotFound`] if the turn does not exist for
    /// this user.
    async fn save_sentiment(
        &self,
        user_id: UserId,
        turn_id: TurnId,
        fields: &SentimentFields,
    ) -> Result<(), StoreError>;

    /// The user's most recent turns, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    async fn turns_by_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError>;

    /// Every turn on the user's `day_limit` most recent active dates (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    async fn turns_for_recent_days(
        &self,
        user_id: UserId,
        day_limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError>;

    /// Sentiment records dated on or after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    async fn sentiment_since(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<Vec<SentimentRecord>, StoreError>;
}
