//! Sitemap crawler: fetch and scan every URL with bounded concurrency.

use crate::acquisition::http_client::HttpClient;
use crate::audit::report::FetchResult;
use crate::pool::manager::WorkerPool;
use crate::trust::markers;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs fetch+scan tasks for a list of URLs.
///
/// The pipeline owns the shared `HttpClient` for as long as it lives; the
/// client's connection pool is released when the pipeline is dropped.
pub struct AuditPipeline {
    client: Arc<HttpClient>,
    pool: Arc<WorkerPool>,
}

impl AuditPipeline {
    /// Create a pipeline allowing `concurrency` fetches in flight (at least one).
    pub fn new(client: HttpClient, concurrency: usize) -> Self {
        Self {
            client: Arc::new(client),
            pool: Arc::new(WorkerPool::new(concurrency)),
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Check every URL and return one result per URL, in completion order.
    pub async fn run(&self, urls: &[String]) -> Vec<FetchResult> {
        self.run_with_progress(urls, |_| {}).await
    }

    /// Like [`AuditPipeline::run`], calling `on_result` as each result arrives.
    pub async fn run_with_progress<F>(&self, urls: &[String], mut on_result: F) -> Vec<FetchResult>
    where
        F: FnMut(&FetchResult),
    {
        let mut pending = FuturesUnordered::new();

        for url in urls {
            let client = Arc::clone(&self.client);
            let pool = Arc::clone(&self.pool);
            let task_url = url.clone();
            let handle = tokio::spawn(async move { check_page(&client, &pool, &task_url).await });

            let url = url.clone();
            pending.push(async move { (url, handle.await) });
        }

        let mut results = Vec::with_capacity(urls.len());
        while let Some((url, joined)) = pending.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!("worker for {url} did not finish: {e}");
                    FetchResult::Failure {
                        url,
                        error: format!("worker task failed: {e}"),
                    }
                }
            };
            on_result(&result);
            results.push(result);
        }

        debug!(
            "checked {} urls (peak concurrency {})",
            results.len(),
            self.pool.peak()
        );
        results
    }
}

/// Fetch one page while holding a worker slot, then scan its body.
pub async fn check_page(client: &HttpClient, pool: &WorkerPool, url: &str) -> FetchResult {
    let fetched = {
        let _slot = match pool.acquire().await {
            Ok(slot) => slot,
            Err(e) => {
                return FetchResult::Failure {
                    url: url.to_string(),
                    error: e.to_string(),
                }
            }
        };
        client.get(url).await
    };

    match fetched {
        Ok(page) => {
            let scan = markers::scan(&page.body);
            if scan.has_marker {
                debug!(
                    "{url} matched {:?} (exact: {})",
                    markers::matched_keywords(&page.body),
                    scan.exact_marker
                );
            } else {
                debug!("{url} clean (status {})", page.status);
            }
            FetchResult::Success {
                url: page.url,
                status_code: page.status,
                has_marker: scan.has_marker,
                exact_marker: scan.exact_marker,
                length: page.body.chars().count(),
            }
        }
        Err(e) => {
            warn!("failed to fetch {url}: {e}");
            FetchResult::Failure {
                url: url.to_string(),
                error: e.to_string(),
            }
        }
    }
}
