//! Fan-out/join over the analyzers.

use std::sync::Arc;

use socialens_core::Completer;

use crate::analyzers::{analyze_sentiment, assess_quality, assess_satisfaction, recommend, recover};
use crate::history::AnalysisHistory;
use crate::types::{
    AnalysisBundle, ConversationMessage, QualityMetrics, SentimentAnalysis, UserContext,
    DEFAULT_SATISFACTION,
};

/// Runs quality, satisfaction and sentiment concurrently, then
/// recommendations from the joined results. Always produces a bundle.
pub struct ConversationAnalyzer {
    completer: Arc<dyn Completer>,
    history: Arc<AnalysisHistory>,
}

impl ConversationAnalyzer {
    #[must_use]
    pub fn new(completer: Arc<dyn Completer>, history: Arc<AnalysisHistory>) -> Self {
        Self { completer, history }
    }

    #[must_use]
    pub fn history(&self) -> &Arc<AnalysisHistory> {
        &self.history
    }

    /// Analyze a transcript and append the bundle to `conversation_key`'s
    /// history.
    pub async fn analyze(
        &self,
        conversation_key: &str,
        conversation: &[ConversationMessage],
        context: &UserContext,
    ) -> AnalysisBundle {
        let completer = self.completer.as_ref();

        let (quality, satisfaction, sentiment) = tokio::join!(
            assess_quality(completer, conversation),
            assess_satisfaction(completer, conversation, context),
            analyze_sentiment(completer, conversation),
        );
        let quality_metrics = recover("quality", quality, QualityMetrics::default);
        let satisfaction = recover("satisfaction", satisfaction, || DEFAULT_SATISFACTION);
        let sentiment = recover("sentiment", sentiment, SentimentAnalysis::default);

        let recommendations = recover(
            "recommendation",
            recommend(completer, &quality_metrics, satisfaction).await,
            Vec::new,
        );

        let bundle = AnalysisBundle {
            quality_metrics,
            satisfaction,
            sentiment,
            recommendations,
        };
        self.history.append(conversation_key, bundle.clone());
        bundle
    }
}

impl std::fmt::Debug for ConversationAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationAnalyzer")
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
