//! Bounded concurrent execution of fetch chains.

use futures::stream::{self, StreamExt};

use crate::chain::{FetchChain, FetchResult, MethodUsed};
use crate::platform::UrlDescriptor;
use crate::structural::analyze_descriptor;

/// Upper bound on concurrently running chains.
pub const MAX_WORKERS: usize = 3;

/// Default and largest cap on URLs accepted per batch.
pub const DEFAULT_MAX_URLS: usize = 3;

/// Results of one batch, in completion order, plus the URLs dropped by the cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchBatch {
    pub results: Vec<FetchResult>,
    pub skipped: Vec<String>,
}

/// Runs one [`FetchChain`] per URL on a small worker pool.
#[derive(Debug, Clone)]
pub struct FetchOrchestrator {
    chain: FetchChain,
    max_urls: usize,
}

impl FetchOrchestrator {
    /// `max_urls` is clamped to `1..=DEFAULT_MAX_URLS`.
    #[must_use]
    pub fn new(chain: FetchChain, max_urls: usize) -> Self {
        Self {
            chain,
            max_urls: max_urls.clamp(1, DEFAULT_MAX_URLS),
        }
    }

    /// Pool size used for a batch: never more than [`MAX_WORKERS`].
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.max_urls.min(MAX_WORKERS)
    }

    /// Fetch every accepted URL exactly once.
    ///
    /// Each chain runs in its own task so a panicking chain cannot take the
    /// batch down; such a URL is reported with [`MethodUsed::Failed`].
    pub async fn fetch_all(&self, mut descriptors: Vec<UrlDescriptor>) -> FetchBatch {
        let skipped: Vec<String> = if descriptors.len() > self.max_urls {
            descriptors
                .split_off(self.max_urls)
                .into_iter()
                .map(|d| d.raw_url)
                .collect()
        } else {
            Vec::new()
        };
        if !skipped.is_empty() {
            tracing::info!(
                accepted = descriptors.len(),
                skipped = skipped.len(),
                "URL batch exceeds cap; extra URLs skipped"
            );
        }

        let results: Vec<FetchResult> = stream::iter(descriptors)
            .map(|descriptor| {
                let chain = self.chain.clone();
                async move {
                    let task_descriptor = descriptor.clone();
                    let handle = tokio::spawn(async move { chain.run(&task_descriptor).await });
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => {
                            tracing::error!(
                                url = %descriptor.raw_url,
                                error = %e,
                                "fetch task aborted"
                            );
                            failed_result(&descriptor)
                        }
                    }
                }
            })
            .buffer_unordered(self.pool_size())
            .collect()
            .await;

        FetchBatch { results, skipped }
    }
}

fn failed_result(descriptor: &UrlDescriptor) -> FetchResult {
    FetchResult {
        descriptor: descriptor.clone(),
        content_type: analyze_descriptor(descriptor).content_type,
        final_content: format!(
            "{} ({}): analysis could not be completed",
            descriptor.platform, descriptor.raw_url
        ),
        method_used: MethodUsed::Failed,
        attempts: Vec::new(),
    }
}
