//! Per-day sentiment rollups over a trailing window.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::sessions::round2;
use crate::types::SentimentRecord;

/// Emotions reported per day, most frequent first.
pub const TOP_EMOTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    pub avg_engagement: f64,
    pub record_count: usize,
    pub top_emotions: Vec<String>,
}

/// First date of a `days`-long window ending on (and including) `today`.
/// A zero-day window is treated as today only.
#[must_use]
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN)
}

/// Average sentiment and engagement per date, oldest date first.
#[must_use]
pub fn summarize_days(records: &[SentimentRecord]) -> Vec<DaySummary> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&SentimentRecord>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date).or_default().push(record);
    }

    by_date
        .into_iter()
        .map(|(date, day)| {
            #[allow(clippy::cast_precision_loss)]
            let count = day.len() as f64;
            let sentiment: f64 = day.iter().map(|r| r.fields.score).sum();
            let engagement: f64 = day.iter().map(|r| r.fields.engagement_level).sum();

            let mut emotion_counts: HashMap<&str, usize> = HashMap::new();
            for emotion in day.iter().flat_map(|r| r.fields.emotions.iter()) {
                *emotion_counts.entry(emotion.as_str()).or_default() += 1;
            }
            let mut ranked: Vec<(&str, usize)> = emotion_counts.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

            DaySummary {
                date,
                avg_sentiment: round2(sentiment / count),
                avg_engagement: round2(engagement / count),
                record_count: day.len(),
                top_emotions: ranked
                    .into_iter()
                    .take(TOP_EMOTIONS)
                    .map(|(e, _)| e.to_owned())
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentFields;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn record(
        id: i64,
        day: u32,
        score: f64,
        engagement: f64,
        emotions: &[&str],
    ) -> SentimentRecord {
        SentimentRecord {
            id,
            user_id: 1,
            conversation_id: id,
            fields: SentimentFields {
                score,
                emotions: emotions.iter().map(|e| (*e).to_owned()).collect(),
                engagement_level: engagement,
                topics: vec![],
                mood_narrative: String::new(),
                main_topics: vec![],
            },
            date: date(day),
        }
    }

    #[test]
    fn window_includes_today() {
        assert_eq!(window_start(date(10), 7), date(4));
        assert_eq!(window_start(date(10), 1), date(10));
        assert_eq!(window_start(date(10), 0), date(10));
    }

    #[test]
    fn averages_per_date_in_date_order() {
        let records = vec![
            record(1, 3, 0.9, 0.8, &["happy", "curious"]),
            record(2, 2, 0.4, 0.2, &["frustrated"]),
            record(3, 3, 0.5, 0.4, &["happy"]),
        ];
        let days = summarize_days(&records);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date(2));
        assert_eq!(days[1].date, date(3));
        assert_eq!(days[1].record_count, 2);
        assert!((days[1].avg_sentiment - 0.7).abs() < 1e-9);
        assert!((days[1].avg_engagement - 0.6).abs() < 1e-9);
        assert_eq!(days[1].top_emotions, vec!["happy", "curious"]);
    }

    #[test]
    fn top_emotions_are_capped_and_tie_broken_by_name() {
        let records = vec![record(1, 5, 0.5, 0.5, &["d", "c", "b", "a"])];
        let days = summarize_days(&records);
        assert_eq!(days[0].top_emotions, vec!["a", "b", "c"]);
    }

    #[test]
    fn no_records_no_days() {
        assert!(summarize_days(&[]).is_empty());
    }
}
