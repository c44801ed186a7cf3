//! `chat` command: an interactive conversation on stdin backed by an
//! in-memory store.
//!
//! Lines starting with `/` are commands: `/sessions`, `/daily` and `/quit`.
//! Everything else is sent as a chat message.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use socialens_analysis::{
    build_user_context, AnalysisHistory, AnalysisScheduler, ChatRequest, ChatService,
    ConversationAnalyzer, ConversationMessage, SummaryService, UserContext, UserProfile,
    DEFAULT_DAILY_WINDOW, DEFAULT_SESSION_LIMIT,
};
use socialens_core::{AppConfig, Completer};
use socialens_scraper::AcquisitionEngine;
use socialens_store::{DaySummary, MemoryStore, Session, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Messages kept locally and passed as history with each turn.
const LOCAL_HISTORY_MESSAGES: usize = 20;

#[derive(Debug, Args)]
pub(crate) struct ChatArgs {
    /// Numeric user id the conversation is stored under
    #[arg(long)]
    pub(crate) user_id: UserId,

    /// Display name used in prompts
    #[arg(long)]
    pub(crate) name: Option<String>,

    /// Short self-description
    #[arg(long)]
    pub(crate) bio: Option<String>,

    /// Interest to include in the profile (repeatable)
    #[arg(long = "interest")]
    pub(crate) interests: Vec<String>,

    /// Social media profile URL to analyze before chatting (repeatable)
    #[arg(long = "link")]
    pub(crate) links: Vec<String>,
}

impl ChatArgs {
    fn has_profile(&self) -> bool {
        self.name.is_some()
            || self.bio.is_some()
            || !self.interests.is_empty()
            || !self.links.is_empty()
    }

    fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            display_name: self.name.clone().unwrap_or_default(),
            bio: self.bio.clone().unwrap_or_default(),
            interests: self.interests.clone(),
            social_links: self.links.clone(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Message(String),
    Sessions,
    Daily,
    Quit,
    Unknown(String),
    Blank,
}

pub(crate) fn parse_input(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Blank,
        "/sessions" => Input::Sessions,
        "/daily" => Input::Daily,
        "/quit" | "/exit" => Input::Quit,
        _ if line.starts_with('/') => Input::Unknown(line.to_owned()),
        _ => Input::Message(line.to_owned()),
    }
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be built or stdin cannot be
/// read. Chat and analysis failures are reported inline and do not end the
/// session; a failed save is printed and the message is dropped.
pub(crate) async fn run_chat(
    config: &AppConfig,
    completer: Arc<dyn Completer>,
    args: ChatArgs,
) -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let history = Arc::new(AnalysisHistory::new(config.analysis_history_capacity));
    let summaries = Arc::new(SummaryService::new(store.clone()));
    let analyzer = Arc::new(ConversationAnalyzer::new(
        Arc::clone(&completer),
        Arc::clone(&history),
    ));
    let scheduler = AnalysisScheduler::new(
        analyzer,
        store.clone(),
        Arc::clone(&summaries),
        Duration::from_millis(config.analysis_delay_ms),
    );
    let chat = ChatService::new(Arc::clone(&completer), store, history, scheduler);

    let context = if args.has_profile() {
        println!("Building your profile...");
        let engine = AcquisitionEngine::from_config(config, Arc::clone(&completer))?;
        build_user_context(completer.as_ref(), &engine, &args.profile()).await
    } else {
        UserContext::anonymous(args.user_id)
    };

    println!("Chatting as user {}. Commands: /sessions, /daily, /quit", args.user_id);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut transcript: Vec<ConversationMessage> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Blank => {}
            Input::Quit => break,
            Input::Sessions => {
                let sessions = summaries
                    .session_summaries(args.user_id, DEFAULT_SESSION_LIMIT)
                    .await;
                print!("{}", render_sessions(&sessions));
            }
            Input::Daily => {
                let days = summaries
                    .daily_sentiment(args.user_id, DEFAULT_DAILY_WINDOW)
                    .await;
                print!("{}", render_days(&days));
            }
            Input::Unknown(command) => println!("unknown command {command}"),
            Input::Message(message) => {
                let request = ChatRequest {
                    user_id: args.user_id,
                    message: message.clone(),
                    context: context.clone(),
                    history: transcript.clone(),
                };
                match chat.handle_turn(request).await {
                    Ok(reply) => {
                        println!("{}", reply.response);
                        transcript.push(ConversationMessage::user(message));
                        transcript.push(ConversationMessage::assistant(reply.response));
                        let excess = transcript.len().saturating_sub(LOCAL_HISTORY_MESSAGES);
                        transcript.drain(..excess);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to save turn");
                        println!("(message could not be saved: {e})");
                    }
                }
            }
        }
    }

    Ok(())
}

pub(crate) fn render_sessions(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return "no sessions yet\n".to_owned();
    }

    let mut out = String::new();
    for session in sessions {
        let _ = writeln!(
            out,
            "{} | {} turn(s) | satisfaction {:.2}{}",
            session.date,
            session.conversation_count,
            session.avg_satisfaction,
            if session.is_long { " | long" } else { "" }
        );
        let excerpt = session.excerpt();
        for pair in excerpt.head {
            let _ = writeln!(out, "  you: {}\n  bot: {}", pair.message, pair.response);
        }
        if excerpt.omitted > 0 {
            let _ = writeln!(out, "  ... {} more ...", excerpt.omitted);
        }
        for pair in excerpt.tail {
            let _ = writeln!(out, "  you: {}\n  bot: {}", pair.message, pair.response);
        }
    }
    out
}

pub(crate) fn render_days(days: &[DaySummary]) -> String {
    if days.is_empty() {
        return "no sentiment recorded yet\n".to_owned();
    }

    let mut out = format!(
        "{:<12}{:<11}{:<12}{:<9}EMOTIONS\n",
        "DATE", "SENTIMENT", "ENGAGEMENT", "RECORDS"
    );
    for day in days {
        let _ = writeln!(
            out,
            "{:<12}{:<11.2}{:<12.2}{:<9}{}",
            day.date.to_string(),
            day.avg_sentiment,
            day.avg_engagement,
            day.record_count,
            day.top_emotions.join(", ")
        );
    }
    out
}
