#![allow(dead_code)]

use judol_check::{AuditOptions, FetchConfig, RetryPolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Write a namespaced sitemap listing `urls` into `dir`.
pub fn write_sitemap(dir: &Path, urls: &[String]) -> PathBuf {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for url in urls {
        xml.push_str(&format!("  <url><loc>{url}</loc></url>\n"));
    }
    xml.push_str("</urlset>\n");

    let path = dir.join("sitemap.xml");
    std::fs::write(&path, xml).unwrap();
    path
}

/// Options with no backoff sleeps so retry tests run quickly.
pub fn fast_options(concurrency: usize) -> AuditOptions {
    AuditOptions {
        concurrency,
        fetch: FetchConfig {
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                backoff_factor: 0.0,
                ..RetryPolicy::default()
            },
            ..FetchConfig::default()
        },
    }
}

/// A local URL nothing is listening on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/gone")
}
