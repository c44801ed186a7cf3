//! `analyze` command: run the acquisition engine over URLs and print the
//! report.

use std::fmt::Write as _;
use std::sync::Arc;

use socialens_core::{AppConfig, Completer};
use socialens_scraper::{AcquisitionEngine, AcquisitionReport};

/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the report cannot
/// be serialized. Per-URL failures are part of the report, not errors.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    completer: Arc<dyn Completer>,
    urls: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let engine = AcquisitionEngine::from_config(config, completer)?;
    let report = engine.analyze_urls(urls).await;
    tracing::info!(
        analyzed = report.results.len(),
        skipped = report.skipped_urls.len(),
        source = ?report.summary_source,
        "analysis finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

pub(crate) fn render_report(report: &AcquisitionReport) -> String {
    let mut out = String::new();
    if report.is_empty() {
        let _ = writeln!(out, "{}", report.summary);
        return out;
    }

    let _ = writeln!(out, "{:<12}{:<22}{:<16}URL", "PLATFORM", "METHOD", "CONTENT");
    for result in &report.results {
        let _ = writeln!(
            out,
            "{:<12}{:<22}{:<16}{}",
            result.descriptor.platform.display_name(),
            result.method_used.to_string(),
            result.content_type.as_str(),
            result.descriptor.raw_url
        );
    }

    let _ = writeln!(out, "\nAccess:");
    for note in &report.accessibility {
        let _ = writeln!(out, "  {}: {}", note.platform, note.note);
    }

    if !report.skipped_urls.is_empty() {
        let _ = writeln!(out, "\nSkipped (over the URL limit):");
        for url in &report.skipped_urls {
            let _ = writeln!(out, "  {url}");
        }
    }

    let _ = writeln!(out, "\nSummary:\n{}", report.summary);
    out
}
