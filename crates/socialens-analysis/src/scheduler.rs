//! Detached, debounced background analysis after each saved turn.
//!
//! Requests are coalesced per user: a request waits out the debounce delay
//! and is dropped if a newer request for the same user arrived meanwhile.
//! Runs for one user are serialized; runs for different users are not.
//! Every failure is logged and absorbed; the saved turn is never touched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use socialens_store::{ConversationStore, SentimentFields, TurnId, UserId};
use tokio::task::JoinHandle;

use crate::orchestrator::ConversationAnalyzer;
use crate::summaries::SummaryService;
use crate::types::{AnalysisBundle, ConversationMessage, UserContext};

/// Default debounce before a background run starts.
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(2000);

/// One request for background analysis.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub user_id: UserId,
    pub turn_id: TurnId,
    pub conversation: Vec<ConversationMessage>,
    pub context: UserContext,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(AnalysisBundle),
    /// A newer request for the same user replaced this one.
    Superseded,
}

#[derive(Debug, Default)]
struct UserSlot {
    generation: u64,
    run_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Pending and running work per user. A slot is removed once its newest
/// request finishes, so generations are issued scheduler-wide and never
/// reused.
#[derive(Debug, Default)]
struct Slots {
    issued: u64,
    users: HashMap<UserId, UserSlot>,
}

pub struct AnalysisScheduler {
    analyzer: Arc<ConversationAnalyzer>,
    store: Arc<dyn ConversationStore>,
    summaries: Arc<SummaryService>,
    delay: Duration,
    slots: Arc<Mutex<Slots>>,
}

impl AnalysisScheduler {
    #[must_use]
    pub fn new(
        analyzer: Arc<ConversationAnalyzer>,
        store: Arc<dyn ConversationStore>,
        summaries: Arc<SummaryService>,
        delay: Duration,
    ) -> Self {
        Self {
            analyzer,
            store,
            summaries,
            delay,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    /// Schedule a detached run. The handle may be awaited or dropped; the
    /// run proceeds either way.
    pub fn schedule(&self, job: AnalysisJob) -> JoinHandle<JobOutcome> {
        let (generation, run_lock) = {
            let mut slots = lock(&self.slots);
            slots.issued += 1;
            let generation = slots.issued;
            let slot = slots.users.entry(job.user_id).or_default();
            slot.generation = generation;
            (generation, Arc::clone(&slot.run_lock))
        };

        let slots = Arc::clone(&self.slots);
        let analyzer = Arc::clone(&self.analyzer);
        let store = Arc::clone(&self.store);
        let summaries = Arc::clone(&self.summaries);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if is_superseded(&slots, job.user_id, generation) {
                tracing::debug!(
                    user_id = job.user_id,
                    turn_id = job.turn_id,
                    "analysis superseded"
                );
                return JobOutcome::Superseded;
            }

            let _guard = run_lock.lock().await;
            if is_superseded(&slots, job.user_id, generation) {
                tracing::debug!(
                    user_id = job.user_id,
                    turn_id = job.turn_id,
                    "analysis superseded"
                );
                return JobOutcome::Superseded;
            }

            let bundle = analyzer
                .analyze(
                    &conversation_key(job.user_id),
                    &job.conversation,
                    &job.context,
                )
                .await;

            let fields = SentimentFields::from(&bundle.sentiment);
            if let Err(e) = store.save_sentiment(job.user_id, job.turn_id, &fields).await {
                tracing::warn!(
                    user_id = job.user_id,
                    turn_id = job.turn_id,
                    error = %e,
                    "background analysis: failed to save sentiment"
                );
            }
            if let Err(e) = summaries.refresh(job.user_id).await {
                tracing::warn!(
                    user_id = job.user_id,
                    error = %e,
                    "background analysis: failed to refresh summaries"
                );
            }

            release_slot(&slots, job.user_id, generation);
            tracing::info!(
                user_id = job.user_id,
                turn_id = job.turn_id,
                satisfaction = bundle.satisfaction,
                "background analysis complete"
            );
            JobOutcome::Completed(bundle)
        })
    }
}

impl std::fmt::Debug for AnalysisScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisScheduler")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// History key for a user's conversation.
#[must_use]
pub fn conversation_key(user_id: UserId) -> String {
    format!("user:{user_id}")
}

/// A missing slot means a newer request already finished and released it.
fn is_superseded(slots: &Mutex<Slots>, user_id: UserId, generation: u64) -> bool {
    lock(slots)
        .users
        .get(&user_id)
        .is_none_or(|slot| slot.generation != generation)
}

fn release_slot(slots: &Mutex<Slots>, user_id: UserId, generation: u64) {
    let mut slots = lock(slots);
    if slots
        .users
        .get(&user_id)
        .is_some_and(|slot| slot.generation == generation)
    {
        slots.users.remove(&user_id);
    }
}

fn lock(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}
