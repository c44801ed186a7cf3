//! Day-grouped conversation sessions.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::types::{ConversationTurn, TurnId};

/// A session with more turns than this is long.
pub const LONG_SESSION_MAX_TURNS: usize = 5;

/// A session with more characters than this is long.
pub const LONG_SESSION_MAX_CHARS: usize = 2000;

/// Pairs shown from the start of a long session.
pub const EXCERPT_HEAD_PAIRS: usize = 2;

/// Pairs shown from the end of a long session.
pub const EXCERPT_TAIL_PAIRS: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationPair {
    pub turn_id: TurnId,
    pub message: String,
    pub response: String,
    pub satisfaction_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// All of one user's turns on one calendar date (UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub date: NaiveDate,
    pub conversation_count: usize,
    /// Mean satisfaction rounded to two decimals.
    pub avg_satisfaction: f64,
    /// Chronological.
    pub pairs: Vec<ConversationPair>,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub total_characters: usize,
    pub is_long: bool,
}

/// Display-facing view of a session: the opening pairs, the closing pairs,
/// and how many were left out between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionExcerpt<'a> {
    pub head: &'a [ConversationPair],
    pub tail: &'a [ConversationPair],
    pub omitted: usize,
}

impl Session {
    /// Short sessions are shown whole; long ones keep the first
    /// [`EXCERPT_HEAD_PAIRS`] and last [`EXCERPT_TAIL_PAIRS`].
    #[must_use]
    pub fn excerpt(&self) -> SessionExcerpt<'_> {
        let shown = EXCERPT_HEAD_PAIRS + EXCERPT_TAIL_PAIRS;
        if !self.is_long || self.pairs.len() <= shown {
            return SessionExcerpt {
                head: &self.pairs,
                tail: &[],
                omitted: 0,
            };
        }
        let tail_start = self.pairs.len() - EXCERPT_TAIL_PAIRS;
        SessionExcerpt {
            head: &self.pairs[..EXCERPT_HEAD_PAIRS],
            tail: &self.pairs[tail_start..],
            omitted: tail_start - EXCERPT_HEAD_PAIRS,
        }
    }
}

/// Group turns into one session per date, newest date first.
///
/// Pure: the same turns always yield the same sessions, whatever their
/// input order.
#[must_use]
pub fn group_into_sessions(turns: &[ConversationTurn]) -> Vec<Session> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ConversationTurn>> = BTreeMap::new();
    for turn in turns {
        by_date.entry(turn.date()).or_default().push(turn);
    }

    by_date
        .into_iter()
        .rev()
        .filter_map(|(date, mut day_turns)| {
            day_turns.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
            let first = day_turns.first()?;
            let last = day_turns.last()?;

            let count = day_turns.len();
            let total_characters: usize = day_turns.iter().map(|t| t.char_count()).sum();
            let satisfaction_sum: f64 = day_turns.iter().map(|t| t.satisfaction_score).sum();
            #[allow(clippy::cast_precision_loss)]
            let avg_satisfaction = round2(satisfaction_sum / count as f64);

            Some(Session {
                date,
                conversation_count: count,
                avg_satisfaction,
                session_start: first.timestamp,
                session_end: last.timestamp,
                total_characters,
                is_long: count > LONG_SESSION_MAX_TURNS
                    || total_characters > LONG_SESSION_MAX_CHARS,
                pairs: day_turns
                    .iter()
                    .map(|t| ConversationPair {
                        turn_id: t.id,
                        message: t.message.clone(),
                        response: t.response.clone(),
                        satisfaction_score: t.satisfaction_score,
                        timestamp: t.timestamp,
                    })
                    .collect(),
            })
        })
        .collect()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
