//! A chat turn end to end: OpenAI-compatible service (wiremock), in-memory
//! store, background analysis and the refreshed summaries.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use socialens_analysis::{
    conversation_key, AnalysisHistory, AnalysisScheduler, ChatRequest, ChatService,
    ConversationAnalyzer, ConversationMessage, JobOutcome, OpenAiCompleter, SummaryService,
    UserContext,
};
use socialens_core::Completer;
use socialens_store::MemoryStore;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

async fn mount(server: &MockServer, key: &str, priority: u8, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains(key))
        .respond_with(completion(content))
        .with_priority(priority)
        .mount(server)
        .await;
}

async fn language_model() -> MockServer {
    let server = MockServer::start().await;
    mount(
        &server,
        "quality metrics (0-1)",
        1,
        r#"{"relevance": 0.9, "clarity": 0.85, "flow": 0.8, "engagement": 0.9}"#,
    )
    .await;
    mount(&server, "satisfaction level", 2, "0.88").await;
    mount(
        &server,
        "Analyze the sentiment",
        3,
        "```json\n{\"score\": 0.75, \"emotions\": [\"curious\"], \"engagement_level\": 0.8, \
         \"topics\": [\"gardening\"], \"mood_narrative\": \"Engaged and curious.\", \
         \"main_topics\": [\"gardening\"]}\n```",
    )
    .await;
    mount(
        &server,
        "recommendations for improvement",
        4,
        "1. Suggest a planting calendar\n2. Ask about their climate",
    )
    .await;
    mount(
        &server,
        "assistant:",
        10,
        "Tomatoes love sun. What is your climate like?",
    )
    .await;
    server
}

struct Harness {
    chat: ChatService,
    store: Arc<MemoryStore>,
    summaries: Arc<SummaryService>,
    history: Arc<AnalysisHistory>,
}

fn harness(server: &MockServer) -> Harness {
    let completer: Arc<dyn Completer> = Arc::new(
        OpenAiCompleter::new("sk-test", &format!("{}/v1", server.uri()), "gpt-test", 5)
            .expect("client builds"),
    );
    let store = Arc::new(MemoryStore::new());
    let history = Arc::new(AnalysisHistory::new(50));
    let summaries = Arc::new(SummaryService::new(store.clone()));
    let analyzer = Arc::new(ConversationAnalyzer::new(completer.clone(), history.clone()));
    let scheduler = AnalysisScheduler::new(
        analyzer,
        store.clone(),
        summaries.clone(),
        Duration::from_millis(150),
    );
    Harness {
        chat: ChatService::new(completer, store.clone(), history.clone(), scheduler),
        store,
        summaries,
        history,
    }
}

fn request(message: &str, history: Vec<ConversationMessage>) -> ChatRequest {
    ChatRequest {
        user_id: 7,
        message: message.to_owned(),
        context: UserContext {
            display_name: "Riley".to_owned(),
            profile_summary: "KEY INTERESTS:\n- gardening".to_owned(),
            ..UserContext::anonymous(7)
        },
        history,
    }
}

#[tokio::test]
async fn turn_is_answered_saved_and_analyzed() {
    let server = language_model().await;
    let h = harness(&server);

    let reply = h
        .chat
        .handle_turn(request("How do I grow tomatoes?", vec![]))
        .await
        .unwrap();
    assert_eq!(reply.response, "Tomatoes love sun. What is your climate like?");

    let JobOutcome::Completed(bundle) = reply.analysis.await.unwrap() else {
        panic!("analysis should complete");
    };
    assert!((bundle.satisfaction - 0.88).abs() < f64::EPSILON);
    assert_eq!(bundle.sentiment.emotions, vec!["curious"]);
    assert_eq!(
        bundle.recommendations,
        vec!["Suggest a planting calendar", "Ask about their climate"]
    );

    let records = h.store.sentiments();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].conversation_id, reply.turn_id);
    assert_eq!(h.history.recent(&conversation_key(7)).len(), 1);

    let sessions = h.summaries.session_summaries(7, 5).await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].pairs[0].message, "How do I grow tomatoes?");

    let days = h.summaries.daily_sentiment(7, 7).await;
    assert_eq!(days.len(), 1);
    assert!((days[0].avg_sentiment - 0.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn rapid_turns_are_analyzed_once() {
    let server = language_model().await;
    let h = harness(&server);

    let first = h
        .chat
        .handle_turn(request("How do I grow tomatoes?", vec![]))
        .await
        .unwrap();
    let second = h
        .chat
        .handle_turn(request(
            "It is pretty dry here.",
            vec![
                ConversationMessage::user("How do I grow tomatoes?"),
                ConversationMessage::assistant(first.response.clone()),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(first.analysis.await.unwrap(), JobOutcome::Superseded);
    assert!(matches!(second.analysis.await.unwrap(), JobOutcome::Completed(_)));

    assert_eq!(h.store.turns().len(), 2);
    let records = h.store.sentiments();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].conversation_id, second.turn_id);
}

#[tokio::test]
async fn unavailable_service_still_saves_the_turn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let h = harness(&server);

    let reply = h.chat.handle_turn(request("hello", vec![])).await.unwrap();
    assert_eq!(reply.response, socialens_analysis::APOLOGY_REPLY);
    reply.analysis.await.unwrap();

    assert_eq!(h.store.turns().len(), 1);
    // Defaulted sentiment is still persisted against the turn.
    assert!((h.store.sentiments()[0].fields.score - 0.7).abs() < f64::EPSILON);
}
