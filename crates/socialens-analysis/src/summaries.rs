//! Cached session and day summaries per user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use socialens_store::{
    group_into_sessions, summarize_days, window_start, ConversationStore, DaySummary, Session,
    StoreError, UserId,
};

/// Session count refreshed after each background analysis.
pub const DEFAULT_SESSION_LIMIT: usize = 5;

/// Day window refreshed after each background analysis.
pub const DEFAULT_DAILY_WINDOW: u32 = 7;

#[derive(Debug, Default)]
struct Cache {
    sessions: HashMap<(UserId, usize), Vec<Session>>,
    daily: HashMap<(UserId, u32, NaiveDate), Vec<DaySummary>>,
    /// Bumped on every invalidation; a load only fills the cache if the
    /// user's epoch is unchanged since it started.
    epochs: HashMap<UserId, u64>,
}

impl Cache {
    fn epoch(&self, user_id: UserId) -> u64 {
        self.epochs.get(&user_id).copied().unwrap_or_default()
    }

    /// Drop the user's views and return the new epoch.
    fn invalidate(&mut self, user_id: UserId) -> u64 {
        self.sessions.retain(|(user, _), _| *user != user_id);
        self.daily.retain(|(user, _, _), _| *user != user_id);
        let epoch = self.epochs.entry(user_id).or_default();
        *epoch += 1;
        *epoch
    }

    fn insert_daily(&mut self, key: (UserId, u32, NaiveDate), summaries: Vec<DaySummary>) {
        let (user_id, _, today) = key;
        self.daily
            .retain(|(user, _, date), _| *user != user_id || *date >= today);
        self.daily.insert(key, summaries);
    }
}

/// Reads rollups through the store and caches them until invalidated.
pub struct SummaryService {
    store: Arc<dyn ConversationStore>,
    cache: Mutex<Cache>,
}

impl SummaryService {
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// The user's sessions over their `limit` most recent active dates,
    /// newest first. A store failure yields an empty list.
    pub async fn session_summaries(&self, user_id: UserId, limit: usize) -> Vec<Session> {
        let epoch = {
            let cache = self.lock();
            if let Some(hit) = cache.sessions.get(&(user_id, limit)) {
                return hit.clone();
            }
            cache.epoch(user_id)
        };
        match self.load_sessions(user_id, limit).await {
            Ok(sessions) => {
                let mut cache = self.lock();
                if cache.epoch(user_id) == epoch {
                    cache.sessions.insert((user_id, limit), sessions.clone());
                }
                sessions
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "session summaries unavailable");
                Vec::new()
            }
        }
    }

    /// Per-day sentiment over the trailing `days` window ending today (UTC).
    pub async fn daily_sentiment(&self, user_id: UserId, days: u32) -> Vec<DaySummary> {
        self.daily_sentiment_as_of(user_id, days, Utc::now().date_naive())
            .await
    }

    /// [`Self::daily_sentiment`] with an explicit "today".
    pub async fn daily_sentiment_as_of(
        &self,
        user_id: UserId,
        days: u32,
        today: NaiveDate,
    ) -> Vec<DaySummary> {
        let key = (user_id, days, today);
        let epoch = {
            let cache = self.lock();
            if let Some(hit) = cache.daily.get(&key) {
                return hit.clone();
            }
            cache.epoch(user_id)
        };
        match self.load_daily(user_id, days, today).await {
            Ok(summaries) => {
                let mut cache = self.lock();
                if cache.epoch(user_id) == epoch {
                    cache.insert_daily(key, summaries.clone());
                }
                summaries
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "daily sentiment unavailable");
                Vec::new()
            }
        }
    }

    /// Drop every cached view for a user. Loads already in flight for the
    /// user will not be cached.
    pub fn invalidate(&self, user_id: UserId) {
        self.lock().invalidate(user_id);
    }

    /// Invalidate and recompute the default views for a user. A refresh
    /// that started earlier never overwrites one that started later.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read; the cache is
    /// left empty for that user.
    pub async fn refresh(&self, user_id: UserId) -> Result<(), StoreError> {
        let epoch = self.lock().invalidate(user_id);
        let today = Utc::now().date_naive();
        let sessions = self.load_sessions(user_id, DEFAULT_SESSION_LIMIT).await?;
        let daily = self.load_daily(user_id, DEFAULT_DAILY_WINDOW, today).await?;

        let mut cache = self.lock();
        if cache.epoch(user_id) == epoch {
            cache
                .sessions
                .insert((user_id, DEFAULT_SESSION_LIMIT), sessions);
            cache.insert_daily((user_id, DEFAULT_DAILY_WINDOW, today), daily);
        }
        Ok(())
    }

    async fn load_sessions(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Session>, StoreError> {
        let turns = self.store.turns_for_recent_days(user_id, limit).await?;
        Ok(group_into_sessions(&turns))
    }

    async fn load_daily(
        &self,
        user_id: UserId,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DaySummary>, StoreError> {
        let records = self
            .store
            .sentiment_since(user_id, window_start(today, days))
            .await?;
        Ok(summarize_days(
            &records
                .into_iter()
                .filter(|r| r.date <= today)
                .collect::<Vec<_>>(),
        ))
    }

    fn lock(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SummaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryService").finish_non_exhaustive()
    }
}
