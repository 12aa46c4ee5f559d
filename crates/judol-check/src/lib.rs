//! judol-check — audit the pages listed in a sitemap for gambling-spam
//! injection and defacement.
//!
//! The run is a single pipeline: [`cartography::sitemap`] extracts the URLs,
//! [`cartography::crawler`] fetches them through a shared
//! [`acquisition::http_client::HttpClient`] with bounded concurrency,
//! [`trust::markers`] scans each body, and [`audit::report`] writes the
//! JSON report.

pub mod acquisition;
pub mod audit;
pub mod cartography;
pub mod cli;
pub mod pool;
pub mod trust;

pub use acquisition::http_client::{FetchConfig, HttpClient, RetryPolicy};
pub use audit::report::{FetchResult, Report};
pub use audit::runner::{run_audit, AuditOptions};
