//! Drive one audit run: sitemap → fetch/scan → report file.

use crate::acquisition::http_client::{FetchConfig, HttpClient};
use crate::audit::report::{FetchResult, Report};
use crate::cartography::crawler::AuditPipeline;
use crate::cartography::sitemap::parse_sitemap;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Default number of concurrent fetches.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Options for an audit run.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditOptions {
    pub concurrency: usize,
    pub fetch: FetchConfig,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            fetch: FetchConfig::default(),
        }
    }
}

/// Audit every URL in the sitemap and write the report to `output`.
pub async fn run_audit(sitemap: &Path, output: &Path, options: &AuditOptions) -> Result<Report> {
    run_audit_with_progress(sitemap, output, options, |_| {}, |_| {}).await
}

/// Like [`run_audit`], reporting the URL count once known and each result
/// as it completes.
pub async fn run_audit_with_progress<S, F>(
    sitemap: &Path,
    output: &Path,
    options: &AuditOptions,
    on_start: S,
    on_result: F,
) -> Result<Report>
where
    S: FnOnce(usize),
    F: FnMut(&FetchResult),
{
    let start = Instant::now();

    let urls = parse_sitemap(sitemap)?;
    info!("loaded {} urls from {}", urls.len(), sitemap.display());
    on_start(urls.len());

    let client = HttpClient::new(options.fetch.clone()).context("failed to set up HTTP client")?;
    let results = {
        let pipeline = AuditPipeline::new(client, options.concurrency);
        pipeline.run_with_progress(&urls, on_result).await
    };

    let report = Report::new(sitemap.display().to_string(), urls.len(), results);
    report.write_to(output)?;

    info!(
        "audit of {} finished in {:.1}s; report at {}",
        report.sitemap,
        start.elapsed().as_secs_f64(),
        output.display()
    );
    Ok(report)
}
