//! The four conversation analyzers.
//!
//! Each analyzer renders a prompt, calls the generative service once, and
//! parses the reply strictly. Failures come back as [`AnalyzerError`]; the
//! orchestrator applies [`recover`] to substitute the analyzer's default.

use serde_json::{Map, Value};
use socialens_core::{CompletionError, Completer};
use thiserror::Error;

use crate::types::{
    render_conversation, ConversationMessage, QualityMetrics, SentimentAnalysis, UserContext,
};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("could not parse {analyzer} output: {reason}")]
    Parse {
        analyzer: &'static str,
        reason: String,
    },

    #[error("generative service failed for {analyzer}: {source}")]
    Service {
        analyzer: &'static str,
        #[source]
        source: CompletionError,
    },
}

impl AnalyzerError {
    fn parse(analyzer: &'static str, reason: impl Into<String>) -> Self {
        AnalyzerError::Parse {
            analyzer,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzerError::Parse { .. } => "parse",
            AnalyzerError::Service { .. } => "service",
        }
    }
}

/// Unwrap an analyzer result, logging and substituting `fallback` on error.
pub fn recover<T>(
    analyzer: &'static str,
    result: Result<T, AnalyzerError>,
    fallback: impl FnOnce() -> T,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                analyzer,
                kind = e.kind(),
                error = %e,
                "analyzer failed; using default"
            );
            fallback()
        }
    }
}

async fn call(
    completer: &dyn Completer,
    analyzer: &'static str,
    prompt: &str,
) -> Result<String, AnalyzerError> {
    completer
        .complete(prompt)
        .await
        .map_err(|source| AnalyzerError::Service { analyzer, source })
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// Score relevance, clarity, flow and engagement.
///
/// # Errors
///
/// [`AnalyzerError::Parse`] unless the reply is a JSON object with all four
/// numeric fields.
pub async fn assess_quality(
    completer: &dyn Completer,
    conversation: &[ConversationMessage],
) -> Result<QualityMetrics, AnalyzerError> {
    const NAME: &str = "quality";
    let prompt = format!(
        "Analyze the following conversation and provide quality metrics (0-1) for:\n\
         1. Response relevance\n2. Response clarity\n3. Conversation flow\n4. User engagement\n\n\
         Conversation:\n{}\n\n\
         Respond with only a JSON object like this:\n\
         {{\"relevance\": 0.8, \"clarity\": 0.9, \"flow\": 0.85, \"engagement\": 0.75}}",
        render_conversation(conversation)
    );
    let reply = call(completer, NAME, &prompt).await?;
    let object = parse_json_object(NAME, &reply)?;

    Ok(QualityMetrics {
        relevance: required_score(NAME, &object, "relevance")?,
        clarity: required_score(NAME, &object, "clarity")?,
        flow: required_score(NAME, &object, "flow")?,
        engagement: required_score(NAME, &object, "engagement")?,
    })
}

// ---------------------------------------------------------------------------
// Satisfaction
// ---------------------------------------------------------------------------

/// Estimate user satisfaction as a single number in `[0, 1]`.
///
/// # Errors
///
/// [`AnalyzerError::Parse`] unless the whole reply is one finite number.
pub async fn assess_satisfaction(
    completer: &dyn Completer,
    conversation: &[ConversationMessage],
    context: &UserContext,
) -> Result<f64, AnalyzerError> {
    const NAME: &str = "satisfaction";
    let prompt = format!(
        "Based on the conversation and user context, assess the user's satisfaction level (0-1).\n\n\
         User context:\n{}\n\n\
         Conversation:\n{}\n\n\
         Consider the user's engagement level, response quality, problem resolution and \
         emotional tone.\n\
         Respond with a single number between 0 and 1 and nothing else.",
        context.render(),
        render_conversation(conversation)
    );
    let reply = call(completer, NAME, &prompt).await?;
    let text = strip_code_fences(&reply);
    let score: f64 = text
        .parse()
        .map_err(|_| AnalyzerError::parse(NAME, format!("not a number: {text:?}")))?;
    if !score.is_finite() {
        return Err(AnalyzerError::parse(NAME, format!("not finite: {score}")));
    }
    Ok(score.clamp(0.0, 1.0))
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Extract sentiment, emotions, engagement and topics.
///
/// # Errors
///
/// [`AnalyzerError::Parse`] unless the reply is a JSON object with numeric
/// `score` and `engagement_level`. List and narrative fields are optional.
pub async fn analyze_sentiment(
    completer: &dyn Completer,
    conversation: &[ConversationMessage],
) -> Result<SentimentAnalysis, AnalyzerError> {
    const NAME: &str = "sentiment";
    let prompt = format!(
        "Analyze the sentiment of the user in this conversation.\n\n\
         Conversation:\n{}\n\n\
         Respond with only a JSON object with these keys:\n\
         \"score\": overall sentiment from 0 (very negative) to 1 (very positive),\n\
         \"emotions\": list of emotions the user shows,\n\
         \"engagement_level\": 0 to 1,\n\
         \"topics\": list of topics discussed,\n\
         \"mood_narrative\": one sentence describing the user's mood,\n\
         \"main_topics\": the two or three most important topics",
        render_conversation(conversation)
    );
    let reply = call(completer, NAME, &prompt).await?;
    let object = parse_json_object(NAME, &reply)?;
    let defaults = SentimentAnalysis::default();

    let emotions = optional_strings(&object, "emotions");
    Ok(SentimentAnalysis {
        score: required_score(NAME, &object, "score")?,
        emotions: if emotions.is_empty() {
            defaults.emotions
        } else {
            emotions
        },
        engagement_level: required_score(NAME, &object, "engagement_level")?,
        topics: optional_strings(&object, "topics"),
        mood_narrative: object
            .get("mood_narrative")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or(defaults.mood_narrative, str::to_owned),
        main_topics: optional_strings(&object, "main_topics"),
    })
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Produce improvement recommendations from quality and satisfaction.
///
/// # Errors
///
/// [`AnalyzerError::Parse`] if the reply contains no non-empty lines.
pub async fn recommend(
    completer: &dyn Completer,
    quality: &QualityMetrics,
    satisfaction: f64,
) -> Result<Vec<String>, AnalyzerError> {
    const NAME: &str = "recommendation";
    let prompt = format!(
        "Based on the following quality metrics and satisfaction score, provide specific \
         recommendations for improvement.\n\n\
         Quality metrics: relevance {:.2}, clarity {:.2}, flow {:.2}, engagement {:.2}\n\
         Satisfaction score: {satisfaction:.2}\n\n\
         Provide 2-3 specific, actionable recommendations. Put each on its own line starting \
         with a dash (-).",
        quality.relevance, quality.clarity, quality.flow, quality.engagement
    );
    let reply = call(completer, NAME, &prompt).await?;
    let lines = parse_list_lines(&reply);
    if lines.is_empty() {
        return Err(AnalyzerError::parse(NAME, "no recommendation lines"));
    }
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Remove a surrounding markdown code fence (with optional language tag).
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_json_object(
    analyzer: &'static str,
    reply: &str,
) -> Result<Map<String, Value>, AnalyzerError> {
    match serde_json::from_str::<Value>(strip_code_fences(reply)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AnalyzerError::parse(analyzer, "expected a JSON object")),
        Err(e) => Err(AnalyzerError::parse(analyzer, e.to_string())),
    }
}

fn required_score(
    analyzer: &'static str,
    object: &Map<String, Value>,
    key: &str,
) -> Result<f64, AnalyzerError> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .ok_or_else(|| AnalyzerError::parse(analyzer, format!("missing numeric field {key:?}")))
}

fn optional_strings(object: &Map<String, Value>, key: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in object.get(key).and_then(Value::as_array).into_iter().flatten() {
        if let Some(s) = item.as_str().map(str::trim).filter(|s| !s.is_empty()) {
            if !out.iter().any(|existing| existing == s) {
                out.push(s.to_owned());
            }
        }
    }
    out
}

/// Non-empty lines with list markers (`-`, `*`, `•`, `1.`, `2)`) removed.
fn parse_list_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.trim_start_matches(['-', '*', '•']).trim_start();
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            let line = if digits > 0 {
                line[digits..]
                    .strip_prefix(['.', ')'])
                    .map_or(line, str::trim_start)
            } else {
                line
            };
            line.trim().to_owned()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "analyzers_test.rs"]
mod tests;
