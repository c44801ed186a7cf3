//! Rollups computed from rows read back through the `ConversationStore`
//! trait. No external services required.

use chrono::{NaiveDate, TimeZone, Utc};

use socialens_store::{
    group_into_sessions, summarize_days, window_start, ConversationStore, MemoryStore,
    SentimentFields,
};

fn seed_week(store: &MemoryStore) -> Vec<i64> {
    let mut ids = Vec::new();
    for hour in 9..14 {
        let ts = Utc.with_ymd_and_hms(2024, 3, 11, hour, 15, 0).unwrap();
        let long_reply = format!("detailed answer {hour} ").repeat(25);
        ids.push(
            store
                .insert_turn_at(42, "How do I structure my week?", &long_reply, 0.8, ts)
                .unwrap(),
        );
    }
    for hour in [8, 20] {
        let ts = Utc.with_ymd_and_hms(2024, 3, 12, hour, 0, 0).unwrap();
        ids.push(store.insert_turn_at(42, "quick one", "sure", 0.6, ts).unwrap());
    }
    ids
}

#[tokio::test]
async fn seven_turns_over_two_days_make_two_sessions() {
    let store = MemoryStore::new();
    seed_week(&store);

    let turns = store.turns_for_recent_days(42, 5).await.unwrap();
    assert_eq!(turns.len(), 7);

    let sessions = group_into_sessions(&turns);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
    assert_eq!(sessions[0].conversation_count, 2);
    assert!(!sessions[0].is_long);

    assert_eq!(sessions[1].conversation_count, 5);
    assert!(sessions[1].total_characters > 2000);
    assert!(sessions[1].is_long);
    assert_eq!(sessions[1].excerpt().omitted, 2);
}

#[tokio::test]
async fn day_limit_trims_older_dates() {
    let store = MemoryStore::new();
    seed_week(&store);

    let turns = store.turns_for_recent_days(42, 1).await.unwrap();
    let sessions = group_into_sessions(&turns);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].conversation_count, 2);
}

#[tokio::test]
async fn daily_sentiment_over_trailing_window() {
    let store = MemoryStore::new();
    let ids = seed_week(&store);

    for (i, id) in ids.iter().enumerate() {
        let fields = SentimentFields {
            score: if i < 5 { 0.8 } else { 0.4 },
            emotions: vec!["focused".to_owned()],
            engagement_level: 0.6,
            topics: vec!["planning".to_owned()],
            mood_narrative: "steady".to_owned(),
            main_topics: vec!["planning".to_owned()],
        };
        store.save_sentiment(42, *id, &fields).await.unwrap();
    }

    let today = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
    let records = store
        .sentiment_since(42, window_start(today, 7))
        .await
        .unwrap();
    let days = summarize_days(&records);

    assert_eq!(days.len(), 2);
    assert_eq!(days[0].record_count, 5);
    assert!((days[0].avg_sentiment - 0.8).abs() < 1e-9);
    assert!((days[1].avg_sentiment - 0.4).abs() < 1e-9);
    assert_eq!(days[1].top_emotions, vec!["focused"]);
}
