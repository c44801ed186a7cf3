//! Ordered per-URL fetch strategies.
//!
//! Strategies run strictly in order and the first one that yields content
//! passing validation wins. Every failure is recorded as a [`FetchAttempt`]
//! and advances the chain; the chain itself always produces a
//! [`FetchResult`].

use std::sync::Arc;

use serde::Serialize;

use crate::client::{extract_domain, PageFetcher, RequestProfile};
use crate::narrative::{render_structural, NOT_ACCESSIBLE_NOTE, SCRAPING_FAILED_NOTE};
use crate::platform::UrlDescriptor;
use crate::structural::{analyze_descriptor, ContentType};
use crate::validate::{validate_content, ContentVerdict, Validity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    Primary,
    Browser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodUsed {
    Scraped,
    StructuralFallback,
    Failed,
}

impl std::fmt::Display for MethodUsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodUsed::Scraped => f.write_str("scraped"),
            MethodUsed::StructuralFallback => f.write_str("structural_fallback"),
            MethodUsed::Failed => f.write_str("failed"),
        }
    }
}

/// One network strategy tried for a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchAttempt {
    pub strategy_id: StrategyId,
    pub raw_content: Option<String>,
    pub validity: Validity,
}

/// Final outcome for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResult {
    pub descriptor: UrlDescriptor,
    pub content_type: ContentType,
    pub final_content: String,
    pub method_used: MethodUsed,
    pub attempts: Vec<FetchAttempt>,
}

/// Timeouts and identity for the two network strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    pub user_agent: String,
    pub primary_timeout_secs: u64,
    pub secondary_timeout_secs: u64,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            user_agent: "socialens/0.1 (profile-analysis)".to_owned(),
            primary_timeout_secs: 10,
            secondary_timeout_secs: 15,
        }
    }
}

/// The per-URL strategy chain. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct FetchChain {
    fetcher: Arc<dyn PageFetcher>,
    primary: RequestProfile,
    secondary: RequestProfile,
}

impl FetchChain {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: &ChainSettings) -> Self {
        Self {
            fetcher,
            primary: RequestProfile::primary(&settings.user_agent, settings.primary_timeout_secs),
            secondary: RequestProfile::browser(settings.secondary_timeout_secs),
        }
    }

    /// Run the chain for one classified URL. Never fails and never yields
    /// [`MethodUsed::Failed`].
    pub async fn run(&self, descriptor: &UrlDescriptor) -> FetchResult {
        let structural = analyze_descriptor(descriptor);

        if descriptor.known_blocked {
            tracing::debug!(
                url = %descriptor.raw_url,
                platform = %descriptor.platform,
                "platform is known to block automated access; using structural analysis"
            );
            return FetchResult {
                descriptor: descriptor.clone(),
                content_type: structural.content_type,
                final_content: render_structural(&structural, NOT_ACCESSIBLE_NOTE, true),
                method_used: MethodUsed::StructuralFallback,
                attempts: Vec::new(),
            };
        }

        let strategies = [
            (StrategyId::Primary, &self.primary),
            (StrategyId::Browser, &self.secondary),
        ];
        let mut attempts = Vec::with_capacity(strategies.len());

        for (strategy_id, profile) in strategies {
            let attempt = self.attempt(descriptor, strategy_id, profile).await;
            if let (Validity::Valid, Some(text)) = (attempt.validity, attempt.raw_content.clone()) {
                attempts.push(attempt);
                return FetchResult {
                    descriptor: descriptor.clone(),
                    content_type: structural.content_type,
                    final_content: text,
                    method_used: MethodUsed::Scraped,
                    attempts,
                };
            }
            attempts.push(attempt);
        }

        tracing::info!(
            url = %descriptor.raw_url,
            platform = %descriptor.platform,
            attempts = attempts.len(),
            "all fetch strategies rejected; falling back to structural analysis"
        );
        FetchResult {
            descriptor: descriptor.clone(),
            content_type: structural.content_type,
            final_content: render_structural(&structural, SCRAPING_FAILED_NOTE, false),
            method_used: MethodUsed::StructuralFallback,
            attempts,
        }
    }

    async fn attempt(
        &self,
        descriptor: &UrlDescriptor,
        strategy_id: StrategyId,
        profile: &RequestProfile,
    ) -> FetchAttempt {
        let url = descriptor.raw_url.as_str();
        let page = match self.fetcher.get(url, profile).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    url,
                    domain = %extract_domain(url),
                    strategy = ?strategy_id,
                    error = %e,
                    "fetch strategy failed"
                );
                return FetchAttempt {
                    strategy_id,
                    raw_content: None,
                    validity: Validity::TransportError,
                };
            }
        };

        match validate_content(&page.body) {
            ContentVerdict::Valid(text) => FetchAttempt {
                strategy_id,
                raw_content: Some(text),
                validity: Validity::Valid,
            },
            rejected => {
                let validity = rejected.validity();
                tracing::warn!(
                    url,
                    strategy = ?strategy_id,
                    status = page.status,
                    validity = ?validity,
                    "fetched content rejected"
                );
                FetchAttempt {
                    strategy_id,
                    raw_content: None,
                    validity,
                }
            }
        }
    }
}

impl std::fmt::Debug for FetchChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchChain")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::client::FetchedPage;
    use crate::error::FetchError;
    use crate::platform::classify;

    const ARTICLE: &str = "<html><body><main>Mountain trail running rewards patience more than \
        raw speed. Over three seasons of racing in the Alps I learned to pace climbs, fuel \
        every forty minutes, and treat descents as a technical skill worth practising.</main></body></html>";

    /// Replays scripted responses in order and records each profile seen.
    struct ScriptedFetcher {
        responses: Mutex<Vec<Result<FetchedPage, FetchError>>>,
        seen: Mutex<Vec<RequestProfile>>,
    }

    impl ScriptedFetcher {
        fn new(mut responses: Vec<Result<FetchedPage, FetchError>>) -> Arc<Self> {
            responses.reverse();
            Arc::new(Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<RequestProfile> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn get(
            &self,
            url: &str,
            profile: &RequestProfile,
        ) -> Result<FetchedPage, FetchError> {
            self.seen.lock().unwrap().push(profile.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| {
                    Err(FetchError::UnexpectedStatus {
                        status: 599,
                        url: url.to_owned(),
                    })
                })
        }
    }

    fn page(body: &str) -> Result<FetchedPage, FetchError> {
        Ok(FetchedPage {
            status: 200,
            body: body.to_owned(),
        })
    }

    fn chain(fetcher: Arc<ScriptedFetcher>) -> FetchChain {
        FetchChain::new(fetcher, &ChainSettings::default())
    }

    #[tokio::test]
    async fn known_blocked_platform_makes_no_network_call() {
        let fetcher = ScriptedFetcher::new(vec![page(ARTICLE)]);
        let result = chain(fetcher.clone())
            .run(&classify("https://www.instagram.com/someuser/"))
            .await;

        assert_eq!(result.method_used, MethodUsed::StructuralFallback);
        assert_eq!(result.content_type, ContentType::Profile);
        assert!(result.final_content.contains(NOT_ACCESSIBLE_NOTE));
        assert!(result.attempts.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn primary_success_stops_the_chain() {
        let fetcher = ScriptedFetcher::new(vec![page(ARTICLE)]);
        let result = chain(fetcher.clone())
            .run(&classify("https://blog.example.com/trail-running"))
            .await;

        assert_eq!(result.method_used, MethodUsed::Scraped);
        assert!(result.final_content.starts_with("Mountain trail running"));
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(fetcher.calls().len(), 1);
        assert!(!fetcher.calls()[0].browser_headers);
    }

    #[tokio::test]
    async fn js_gated_primary_advances_to_browser_profile() {
        let fetcher = ScriptedFetcher::new(vec![
            page("<html><body>Please enable JavaScript to view this page.</body></html>"),
            page(ARTICLE),
        ]);
        let result = chain(fetcher.clone())
            .run(&classify("https://www.linkedin.com/in/jane-doe-dev"))
            .await;

        assert_eq!(result.method_used, MethodUsed::Scraped);
        assert_eq!(result.attempts[0].validity, Validity::JsRequired);
        assert_eq!(result.attempts[1].strategy_id, StrategyId::Browser);
        assert_eq!(result.attempts[1].validity, Validity::Valid);
        assert!(fetcher.calls()[1].browser_headers);
    }

    #[tokio::test]
    async fn exhausted_strategies_fall_back_to_structural_analysis() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::UnexpectedStatus {
                status: 503,
                url: "https://www.youtube.com/@TravelWithSam".to_owned(),
            }),
            page("<html><body>Access denied</body></html>"),
        ]);
        let result = chain(fetcher)
            .run(&classify("https://www.youtube.com/@TravelWithSam"))
            .await;

        assert_eq!(result.method_used, MethodUsed::StructuralFallback);
        assert_eq!(result.content_type, ContentType::Channel);
        assert!(result.final_content.contains(SCRAPING_FAILED_NOTE));
        assert!(result.final_content.contains("Username: TravelWithSam"));
        let validities: Vec<Validity> = result.attempts.iter().map(|a| a.validity).collect();
        assert_eq!(validities, vec![Validity::TransportError, Validity::Blocked]);
    }

    #[tokio::test]
    async fn unparseable_url_never_yields_failed() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::InvalidUrl {
                url: "::::".to_owned(),
                reason: "bad".to_owned(),
            }),
            Err(FetchError::InvalidUrl {
                url: "::::".to_owned(),
                reason: "bad".to_owned(),
            }),
        ]);
        let result = chain(fetcher).run(&classify("::::")).await;
        assert_ne!(result.method_used, MethodUsed::Failed);
        assert_eq!(result.method_used, MethodUsed::StructuralFallback);
    }
}
