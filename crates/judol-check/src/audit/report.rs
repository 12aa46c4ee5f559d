//! JSON audit report.
//!
//! Each result serializes as either
//! `{url, ok: true, status_code, has_judol, exact_judol, length}` or
//! `{url, ok: false, error}`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of fetching and scanning one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResultRecord", try_from = "ResultRecord")]
pub enum FetchResult {
    Success {
        url: String,
        status_code: u16,
        has_marker: bool,
        exact_marker: bool,
        /// Body length in characters.
        length: usize,
    },
    Failure {
        url: String,
        error: String,
    },
}

impl FetchResult {
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success { status_code, .. } => Some(*status_code),
            Self::Failure { .. } => None,
        }
    }

    pub fn has_marker(&self) -> bool {
        matches!(self, Self::Success { has_marker: true, .. })
    }

    pub fn exact_marker(&self) -> bool {
        matches!(self, Self::Success { exact_marker: true, .. })
    }
}

/// Flat wire shape of a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResultRecord {
    url: String,
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    has_judol: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exact_judol: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<FetchResult> for ResultRecord {
    fn from(result: FetchResult) -> Self {
        match result {
            FetchResult::Success {
                url,
                status_code,
                has_marker,
                exact_marker,
                length,
            } => Self {
                url,
                ok: true,
                status_code: Some(status_code),
                has_judol: Some(has_marker),
                exact_judol: Some(exact_marker),
                length: Some(length),
                error: None,
            },
            FetchResult::Failure { url, error } => Self {
                url,
                ok: false,
                status_code: None,
                has_judol: None,
                exact_judol: None,
                length: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<ResultRecord> for FetchResult {
    type Error = String;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        if record.ok {
            match (
                record.status_code,
                record.has_judol,
                record.exact_judol,
                record.length,
            ) {
                (Some(status_code), Some(has_marker), Some(exact_marker), Some(length)) => {
                    Ok(Self::Success {
                        url: record.url,
                        status_code,
                        has_marker,
                        exact_marker,
                        length,
                    })
                }
                _ => Err(format!(
                    "result for {} is ok but lacks status_code/has_judol/exact_judol/length",
                    record.url
                )),
            }
        } else {
            let error = record
                .error
                .ok_or_else(|| format!("failed result for {} has no error", record.url))?;
            Ok(Self::Failure {
                url: record.url,
                error,
            })
        }
    }
}

/// Aggregate report of one audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Sitemap the URLs came from, as given by the caller.
    pub sitemap: String,
    /// Number of URLs in the sitemap.
    pub count: usize,
    /// Results in completion order.
    pub results: Vec<FetchResult>,
}

impl Report {
    pub fn new(sitemap: impl Into<String>, count: usize, results: Vec<FetchResult>) -> Self {
        Self {
            sitemap: sitemap.into(),
            count,
            results,
        }
    }

    /// Write the report as pretty JSON, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory: {}", parent.display())
                })?;
            }
        }

        let mut json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        json.push('\n');
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Load a report previously written with [`Report::write_to`].
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("invalid report: {}", path.display()))
    }

    /// Pages containing any marker keyword.
    pub fn matches(&self) -> impl Iterator<Item = &FetchResult> {
        self.results.iter().filter(|r| r.has_marker())
    }

    /// Pages whose whole body is the defacement signature.
    pub fn exact_matches(&self) -> impl Iterator<Item = &FetchResult> {
        self.results.iter().filter(|r| r.exact_marker())
    }

    /// URLs that could not be fetched.
    pub fn failures(&self) -> impl Iterator<Item = &FetchResult> {
        self.results.iter().filter(|r| !r.is_ok())
    }
}
