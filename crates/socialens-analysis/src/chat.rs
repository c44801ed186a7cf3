//! One conversational turn: reply, persist, then hand off to background
//! analysis.

use std::sync::Arc;

use socialens_core::Completer;
use socialens_store::{ConversationStore, StoreError, TurnId, UserId};
use tokio::task::JoinHandle;

use crate::history::AnalysisHistory;
use crate::scheduler::{conversation_key, AnalysisJob, AnalysisScheduler, JobOutcome};
use crate::types::{render_conversation, ConversationMessage, UserContext, DEFAULT_SATISFACTION};

/// History messages carried into the reply prompt.
pub const PROMPT_HISTORY_MESSAGES: usize = 5;

pub const APOLOGY_REPLY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

const DEFAULT_PERSONA: &str = "You are a warm, attentive conversational companion. Use what you \
know about the user to keep the conversation personal, and ask a follow-up question when it fits.";

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub user_id: UserId,
    pub message: String,
    pub context: UserContext,
    /// Earlier messages of this conversation, oldest first. Left empty, it
    /// is filled from the user's stored turns.
    pub history: Vec<ConversationMessage>,
}

#[derive(Debug)]
pub struct ChatReply {
    pub turn_id: TurnId,
    pub response: String,
    /// The scheduled background run; dropping it does not cancel the run.
    pub analysis: JoinHandle<JobOutcome>,
}

pub struct ChatService {
    completer: Arc<dyn Completer>,
    store: Arc<dyn ConversationStore>,
    history: Arc<AnalysisHistory>,
    scheduler: AnalysisScheduler,
    persona: String,
}

impl ChatService {
    #[must_use]
    pub fn new(
        completer: Arc<dyn Completer>,
        store: Arc<dyn ConversationStore>,
        history: Arc<AnalysisHistory>,
        scheduler: AnalysisScheduler,
    ) -> Self {
        Self {
            completer,
            store,
            history,
            scheduler,
            persona: DEFAULT_PERSONA.to_owned(),
        }
    }

    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Generate a reply, save the turn and schedule analysis of it.
    ///
    /// A generative failure is not an error: the apology reply is saved
    /// and returned instead.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the turn cannot be saved. No analysis is
    /// scheduled in that case.
    pub async fn handle_turn(&self, mut request: ChatRequest) -> Result<ChatReply, StoreError> {
        if request.history.is_empty() {
            request.history = self.stored_history(request.user_id).await;
        }
        let prompt = reply_prompt(&self.persona, &request);
        let response = match self.completer.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => {
                tracing::warn!(user_id = request.user_id, "chat reply was blank");
                APOLOGY_REPLY.to_owned()
            }
            Err(e) => {
                tracing::warn!(user_id = request.user_id, error = %e, "chat reply failed");
                APOLOGY_REPLY.to_owned()
            }
        };

        let satisfaction = self
            .history
            .latest(&conversation_key(request.user_id))
            .map_or(DEFAULT_SATISFACTION, |bundle| bundle.satisfaction);
        let turn_id = self
            .store
            .save_turn(request.user_id, &request.message, &response, satisfaction)
            .await?;

        let mut conversation = request.history;
        conversation.push(ConversationMessage::user(request.message));
        conversation.push(ConversationMessage::assistant(response.clone()));
        let analysis = self.scheduler.schedule(AnalysisJob {
            user_id: request.user_id,
            turn_id,
            conversation,
            context: request.context,
        });

        Ok(ChatReply {
            turn_id,
            response,
            analysis,
        })
    }

    /// The user's latest stored turns as messages, oldest first. A read
    /// failure yields no history.
    async fn stored_history(&self, user_id: UserId) -> Vec<ConversationMessage> {
        let limit = PROMPT_HISTORY_MESSAGES.div_ceil(2);
        match self.store.turns_by_user(user_id, limit).await {
            Ok(turns) => turns
                .into_iter()
                .rev()
                .flat_map(|turn| {
                    [
                        ConversationMessage::user(turn.message),
                        ConversationMessage::assistant(turn.response),
                    ]
                })
                .collect(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "stored history unavailable");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

fn reply_prompt(persona: &str, request: &ChatRequest) -> String {
    let skip = request
        .history
        .len()
        .saturating_sub(PROMPT_HISTORY_MESSAGES);
    let recent = render_conversation(&request.history[skip..]);
    let recent = if recent.is_empty() {
        "(no earlier messages)".to_owned()
    } else {
        recent
    };

    format!(
        "{persona}\n\n\
         What you know about the user:\n{context}\n\n\
         Recent conversation:\n{recent}\n\n\
         user: {message}\n\
         assistant:",
        context = request.context.render(),
        message = request.message,
    )
}
