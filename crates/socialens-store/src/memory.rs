//! In-memory [`ConversationStore`]. Backs the CLI and the test suites; data
//! lives only as long as the store.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::types::{ConversationTurn, SentimentFields, SentimentRecord, TurnId, UserId};
use crate::{ConversationStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    turns: Vec<ConversationTurn>,
    sentiments: Vec<SentimentRecord>,
    next_turn_id: TurnId,
    next_sentiment_id: i64,
}

/// Thread-safe in-memory store with incrementing ids.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a turn with an explicit timestamp. Used to seed history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] if the score is not a finite
    /// number.
    pub fn insert_turn_at(
        &self,
        user_id: UserId,
        message: &str,
        response: &str,
        satisfaction_score: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<TurnId, StoreError> {
        if !satisfaction_score.is_finite() {
            return Err(StoreError::InvalidInput {
                field: "satisfaction_score",
                reason: format!("{satisfaction_score} is not finite"),
            });
        }
        let mut inner = self.lock();
        inner.next_turn_id += 1;
        let id = inner.next_turn_id;
        inner.turns.push(ConversationTurn {
            id,
            user_id,
            message: message.to_owned(),
            response: response.to_owned(),
            satisfaction_score: satisfaction_score.clamp(0.0, 1.0),
            timestamp,
        });
        Ok(id)
    }

    /// Snapshot of every stored turn, in insertion order.
    #[must_use]
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.lock().turns.clone()
    }

    /// Snapshot of every stored sentiment record.
    #[must_use]
    pub fn sentiments(&self) -> Vec<SentimentRecord> {
        self.lock().sentiments.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn save_turn(
        &self,
        user_id: UserId,
        message: &str,
        response: &str,
        satisfaction_score: f64,
    ) -> Result<TurnId, StoreError> {
        self.insert_turn_at(user_id, message, response, satisfaction_score, Utc::now())
    }

    async fn save_sentiment(
        &self,
        user_id: UserId,
        turn_id: TurnId,
        fields: &SentimentFields,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let date = inner
            .turns
            .iter()
            .find(|t| t.id == turn_id && t.user_id == user_id)
            .map(ConversationTurn::date)
            .ok_or(StoreError::TurnNotFound { user_id, turn_id })?;

        if let Some(existing) = inner
            .sentiments
            .iter_mut()
            .find(|r| r.conversation_id == turn_id)
        {
            existing.fields = fields.clone();
            return Ok(());
        }

        inner.next_sentiment_id += 1;
        let id = inner.next_sentiment_id;
        inner.sentiments.push(SentimentRecord {
            id,
            user_id,
            conversation_id: turn_id,
            fields: fields.clone(),
            date,
        });
        Ok(())
    }

    async fn turns_by_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let inner = self.lock();
        let mut turns: Vec<ConversationTurn> = inner
            .turns
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        turns.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        turns.truncate(limit);
        Ok(turns)
    }

    async fn turns_for_recent_days(
        &self,
        user_id: UserId,
        day_limit: usize,
    ) -> Result<Vec<ConversationTurn>, StoreError> {
        let inner = self.lock();
        let dates: BTreeSet<NaiveDate> = inner
            .turns
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(ConversationTurn::date)
            .collect();
        let kept: BTreeSet<NaiveDate> = dates.into_iter().rev().take(day_limit).collect();

        Ok(inner
            .turns
            .iter()
            .filter(|t| t.user_id == user_id && kept.contains(&t.date()))
            .cloned()
            .collect())
    }

    async fn sentiment_since(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<Vec<SentimentRecord>, StoreError> {
        Ok(self
            .lock()
            .sentiments
            .iter()
            .filter(|r| r.user_id == user_id && r.date >= since)
            .cloned()
            .collect())
    }
}
