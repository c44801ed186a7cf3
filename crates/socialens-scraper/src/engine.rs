//! Content acquisition: classify, fetch with fallback, then synthesize one
//! narrative over everything that came back.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;
use socialens_core::{AppConfig, Completer};

use crate::chain::{ChainSettings, FetchChain, FetchResult, MethodUsed};
use crate::client::{HttpFetcher, PageFetcher};
use crate::error::FetchError;
use crate::narrative::{NOT_ACCESSIBLE_NOTE, SCRAPING_FAILED_NOTE};
use crate::orchestrator::{FetchOrchestrator, DEFAULT_MAX_URLS};
use crate::platform::{classify, Platform};
use crate::validate::truncate_chars;

/// Per-URL share of the synthesis prompt.
pub const SYNTHESIS_PER_URL_CHARS: usize = 2000;

/// Total content budget of the synthesis prompt.
pub const SYNTHESIS_TOTAL_CHARS: usize = 6000;

pub const NOTHING_TO_ANALYZE: &str = "Nothing to analyze: no URLs were provided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// Written by the generative service.
    Generated,
    /// Built from per-URL metadata after the generative call failed.
    Template,
    /// The request carried no usable URLs.
    NothingToAnalyze,
}

/// Whether a platform's content could be read in this batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessibilityNote {
    pub platform: Platform,
    pub accessible: bool,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionReport {
    pub results: Vec<FetchResult>,
    pub summary: String,
    pub summary_source: SummarySource,
    pub accessibility: Vec<AccessibilityNote>,
    pub skipped_urls: Vec<String>,
}

impl AcquisitionReport {
    #[must_use]
    pub fn nothing_to_analyze() -> Self {
        Self {
            results: Vec::new(),
            summary: NOTHING_TO_ANALYZE.to_owned(),
            summary_source: SummarySource::NothingToAnalyze,
            accessibility: Vec::new(),
            skipped_urls: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary_source == SummarySource::NothingToAnalyze
    }
}

/// Composes classification, the fetch orchestrator and one synthesis call.
pub struct AcquisitionEngine {
    orchestrator: FetchOrchestrator,
    completer: Arc<dyn Completer>,
}

impl AcquisitionEngine {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        completer: Arc<dyn Completer>,
        settings: &ChainSettings,
        max_urls: usize,
    ) -> Self {
        let chain = FetchChain::new(fetcher, settings);
        Self {
            orchestrator: FetchOrchestrator::new(chain, max_urls),
            completer,
        }
    }

    /// Build an engine backed by a real HTTP client using configured
    /// timeouts, user agent and URL cap.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        completer: Arc<dyn Completer>,
    ) -> Result<Self, FetchError> {
        let settings = ChainSettings {
            user_agent: config.scraper_user_agent.clone(),
            primary_timeout_secs: config.scraper_primary_timeout_secs,
            secondary_timeout_secs: config.scraper_secondary_timeout_secs,
        };
        Ok(Self::new(
            Arc::new(HttpFetcher::new()?),
            completer,
            &settings,
            config.scraper_max_urls,
        ))
    }

    /// Engine with default settings over any fetcher.
    #[must_use]
    pub fn with_defaults(fetcher: Arc<dyn PageFetcher>, completer: Arc<dyn Completer>) -> Self {
        Self::new(fetcher, completer, &ChainSettings::default(), DEFAULT_MAX_URLS)
    }

    /// Analyze a batch of URLs. Always returns a usable report; blank
    /// entries are ignored and an empty batch yields
    /// [`AcquisitionReport::nothing_to_analyze`].
    pub async fn analyze_urls<S: AsRef<str>>(&self, urls: &[S]) -> AcquisitionReport {
        let descriptors: Vec<_> = urls
            .iter()
            .map(|u| u.as_ref().trim())
            .filter(|u| !u.is_empty())
            .map(classify)
            .collect();
        if descriptors.is_empty() {
            return AcquisitionReport::nothing_to_analyze();
        }

        let batch = self.orchestrator.fetch_all(descriptors).await;
        let accessibility = accessibility_notes(&batch.results);

        let prompt = synthesis_prompt(&batch.results);
        let (summary, summary_source) = match self.completer.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => {
                (text.trim().to_owned(), SummarySource::Generated)
            }
            Ok(_) => {
                tracing::warn!("synthesis returned empty text; using template summary");
                (template_summary(&batch.results), SummarySource::Template)
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed; using template summary");
                (template_summary(&batch.results), SummarySource::Template)
            }
        };

        AcquisitionReport {
            results: batch.results,
            summary,
            summary_source,
            accessibility,
            skipped_urls: batch.skipped,
        }
    }
}

impl std::fmt::Debug for AcquisitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionEngine")
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

fn synthesis_prompt(results: &[FetchResult]) -> String {
    let mut content = String::new();
    for result in results {
        let remaining = SYNTHESIS_TOTAL_CHARS.saturating_sub(content.chars().count());
        if remaining == 0 {
            break;
        }
        let header = format!(
            "\n--- {} [{}] ({}) ---\n",
            result.descriptor.platform, result.content_type, result.method_used
        );
        let body = truncate_chars(&result.final_content, SYNTHESIS_PER_URL_CHARS);
        let block = format!("{header}{body}\n");
        content.push_str(&truncate_chars(&block, remaining));
    }

    format!(
        "Analyze the following social media content gathered for one person and describe \
         their online presence. Some entries are structural analyses of profiles that could \
         not be read directly; treat them as hints, not facts.\n\
         {content}\n\
         Respond with exactly these sections:\n\
         KEY ACTIVITIES:\n- ...\n\
         INTERESTS SHOWN:\n- ...\n\
         ENGAGEMENT STYLE:\n- ..."
    )
}

fn template_summary(results: &[FetchResult]) -> String {
    let mut platforms: BTreeMap<&str, usize> = BTreeMap::new();
    let mut content_types: BTreeMap<&str, usize> = BTreeMap::new();
    let mut methods: BTreeMap<String, usize> = BTreeMap::new();
    for result in results {
        *platforms
            .entry(result.descriptor.platform.display_name())
            .or_default() += 1;
        *content_types.entry(result.content_type.as_str()).or_default() += 1;
        *methods.entry(result.method_used.to_string()).or_default() += 1;
    }

    let join = |counts: Vec<(String, usize)>| {
        counts
            .into_iter()
            .map(|(k, n)| format!("{k} ({n})"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyzed {} URL(s). Automated summary unavailable; showing collected metadata.",
        results.len()
    );
    let _ = writeln!(
        out,
        "Platforms: {}",
        join(platforms.into_iter().map(|(k, n)| (k.to_owned(), n)).collect())
    );
    let _ = writeln!(
        out,
        "Content types: {}",
        join(content_types.into_iter().map(|(k, n)| (k.to_owned(), n)).collect())
    );
    let _ = write!(out, "Methods: {}", join(methods.into_iter().collect()));
    out
}

fn accessibility_notes(results: &[FetchResult]) -> Vec<AccessibilityNote> {
    let mut notes: Vec<AccessibilityNote> = Vec::new();
    for result in results {
        let platform = result.descriptor.platform;
        let accessible = result.method_used == MethodUsed::Scraped;
        if let Some(existing) = notes.iter_mut().find(|n| n.platform == platform) {
            if accessible && !existing.accessible {
                existing.accessible = true;
                existing.note = "accessible".to_owned();
            }
            continue;
        }
        let note = if accessible {
            "accessible".to_owned()
        } else if result.descriptor.known_blocked {
            NOT_ACCESSIBLE_NOTE.to_owned()
        } else if result.method_used == MethodUsed::Failed {
            "analysis failed".to_owned()
        } else {
            SCRAPING_FAILED_NOTE.to_owned()
        };
        notes.push(AccessibilityNote {
            platform,
            accessible,
            note,
        });
    }
    notes
}
