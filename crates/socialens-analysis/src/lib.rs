pub mod analyzers;
pub mod chat;
pub mod history;
pub mod llm;
pub mod orchestrator;
pub mod profile;
pub mod scheduler;
pub mod summaries;
pub mod types;

#[cfg(test)]
mod test_support;

pub use analyzers::{
    analyze_sentiment, assess_quality, assess_satisfaction, recommend, recover, AnalyzerError,
};
pub use chat::{ChatReply, ChatRequest, ChatService, APOLOGY_REPLY};
pub use history::AnalysisHistory;
pub use llm::OpenAiCompleter;
pub use orchestrator::ConversationAnalyzer;
pub use profile::{build_user_context, UserProfile};
pub use scheduler::{
    conversation_key, AnalysisJob, AnalysisScheduler, JobOutcome, DEFAULT_ANALYSIS_DELAY,
};
pub use summaries::{SummaryService, DEFAULT_DAILY_WINDOW, DEFAULT_SESSION_LIMIT};
pub use types::{
    render_conversation, AnalysisBundle, ConversationMessage, QualityMetrics, Role,
    SentimentAnalysis, UserContext,
};
