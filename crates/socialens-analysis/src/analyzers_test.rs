use socialens_core::DisabledCompleter;

use super::*;
use crate::test_support::{
    ScriptedCompleter, QUALITY_KEY, RECOMMEND_KEY, SATISFACTION_KEY, SENTIMENT_KEY,
};

fn conversation() -> Vec<ConversationMessage> {
    vec![
        ConversationMessage::user("Any tips for a first half marathon?"),
        ConversationMessage::assistant("Build mileage slowly and taper the final week."),
    ]
}

#[tokio::test]
async fn quality_parses_fenced_json_and_clamps() {
    let completer = ScriptedCompleter::new().reply(
        QUALITY_KEY,
        "```json\n{\"relevance\": 1.4, \"clarity\": 0.8, \"flow\": -0.2, \"engagement\": 0.5}\n```",
    );
    let metrics = assess_quality(&completer, &conversation()).await.unwrap();
    assert!((metrics.relevance - 1.0).abs() < f64::EPSILON);
    assert!((metrics.clarity - 0.8).abs() < f64::EPSILON);
    assert!(metrics.flow.abs() < f64::EPSILON);
}

#[tokio::test]
async fn quality_missing_dimension_is_parse_error() {
    let completer =
        ScriptedCompleter::new().reply(QUALITY_KEY, r#"{"relevance": 0.8, "clarity": 0.8}"#);
    let err = assess_quality(&completer, &conversation()).await.unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn satisfaction_non_numeric_is_parse_error() {
    let completer = ScriptedCompleter::new().reply(SATISFACTION_KEY, "The user seems happy.");
    let err = assess_satisfaction(&completer, &conversation(), &UserContext::anonymous(1))
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::Parse { analyzer: "satisfaction", .. }));
    assert!((recover::<f64>("satisfaction", Err(err), || 0.7) - 0.7).abs() < f64::EPSILON);
}

#[tokio::test]
async fn satisfaction_is_clamped() {
    let completer = ScriptedCompleter::new().reply(SATISFACTION_KEY, " 3 ");
    let score = assess_satisfaction(&completer, &conversation(), &UserContext::anonymous(1))
        .await
        .unwrap();
    assert!((score - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn satisfaction_prompt_includes_user_context() {
    let completer = ScriptedCompleter::new().reply(SATISFACTION_KEY, "0.5");
    let context = UserContext {
        display_name: "Avery".to_owned(),
        ..UserContext::anonymous(9)
    };
    assess_satisfaction(&completer, &conversation(), &context)
        .await
        .unwrap();
    assert!(completer.prompts()[0].contains("Name: Avery"));
}

#[tokio::test]
async fn sentiment_fills_optional_fields_with_defaults() {
    let completer =
        ScriptedCompleter::new().reply(SENTIMENT_KEY, r#"{"score": 0.2, "engagement_level": 0.9}"#);
    let sentiment = analyze_sentiment(&completer, &conversation()).await.unwrap();
    assert!((sentiment.score - 0.2).abs() < f64::EPSILON);
    assert_eq!(sentiment.emotions, vec!["neutral"]);
    assert_eq!(sentiment.mood_narrative, "Unable to determine mood");
    assert!(sentiment.topics.is_empty());
}

#[tokio::test]
async fn sentiment_dedups_string_lists() {
    let completer = ScriptedCompleter::new().reply(
        SENTIMENT_KEY,
        r#"{"score": 0.6, "engagement_level": 0.5, "emotions": ["calm", "calm", " ", 4],
            "topics": ["running"], "mood_narrative": "Relaxed", "main_topics": ["running"]}"#,
    );
    let sentiment = analyze_sentiment(&completer, &conversation()).await.unwrap();
    assert_eq!(sentiment.emotions, vec!["calm"]);
    assert_eq!(sentiment.mood_narrative, "Relaxed");
}

#[tokio::test]
async fn sentiment_array_reply_is_parse_error() {
    let completer = ScriptedCompleter::new().reply(SENTIMENT_KEY, "[0.5]");
    let err = analyze_sentiment(&completer, &conversation()).await.unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn recommendations_strip_list_markers() {
    let completer = ScriptedCompleter::new().reply(
        RECOMMEND_KEY,
        "Here you go:\n- Ask about goals\n\n2) Summarize plans\n* Offer a schedule\n",
    );
    let recs = recommend(&completer, &QualityMetrics::default(), 0.7)
        .await
        .unwrap();
    assert_eq!(
        recs,
        vec!["Here you go:", "Ask about goals", "Summarize plans", "Offer a schedule"]
    );
}

#[tokio::test]
async fn blank_recommendations_are_parse_error() {
    let completer = ScriptedCompleter::new().reply(RECOMMEND_KEY, "  \n \n");
    let err = recommend(&completer, &QualityMetrics::default(), 0.7)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "parse");
}

#[tokio::test]
async fn service_failure_is_service_error() {
    let err = assess_quality(&DisabledCompleter, &conversation())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AnalyzerError::Service {
            analyzer: "quality",
            source: CompletionError::NotConfigured
        }
    ));
}

#[test]
fn code_fences_are_stripped() {
    assert_eq!(strip_code_fences("```\n0.4\n```"), "0.4");
    assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
    assert_eq!(strip_code_fences("  0.4 "), "0.4");
}
