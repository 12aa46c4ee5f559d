//! Sitemap parsing.
//!
//! Extracts `<loc>` values from a sitemap document. The namespace of the
//! root element is applied to every `loc` lookup, so a sitemap declaring
//! the standard `xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"` and
//! one declaring nothing produce the same URL list.

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while reading a sitemap.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to read sitemap {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed sitemap: {0}")]
    Malformed(String),
}

/// Read and parse the sitemap at `path`.
pub fn parse_sitemap(path: &Path) -> Result<Vec<String>, SitemapError> {
    let xml = std::fs::read_to_string(path).map_err(|source| SitemapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let urls = parse_sitemap_str(&xml)?;
    debug!("parsed {} urls from {}", urls.len(), path.display());
    Ok(urls)
}

/// Parse sitemap XML into the ordered list of `loc` values.
///
/// Values are trimmed; empty `loc` elements are skipped. Duplicates are
/// kept.
pub fn parse_sitemap_str(xml: &str) -> Result<Vec<String>, SitemapError> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let mut reader = NsReader::from_str(xml);

    let mut urls = Vec::new();
    let mut depth: usize = 0;
    let mut root_seen = false;
    let mut root_ns: Option<Vec<u8>> = None;
    // Depth of the `loc` element being read, with its text so far.
    let mut current_loc: Option<(usize, String)> = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| SitemapError::Malformed(e.to_string()))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let ns = namespace_of(&resolved)?;

                if depth == 0 {
                    if root_seen {
                        return Err(SitemapError::Malformed(
                            "content after the root element".to_string(),
                        ));
                    }
                    root_seen = true;
                    if e.local_name().as_ref() == b"sitemapindex" {
                        warn!("sitemap index detected; nested sitemaps are not followed");
                    }
                    root_ns = ns;
                } else if current_loc.is_none()
                    && !is_empty
                    && e.local_name().as_ref() == b"loc"
                    && ns == root_ns
                {
                    current_loc = Some((depth + 1, String::new()));
                }

                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => {
                if let Some((loc_depth, text)) = current_loc.take() {
                    if loc_depth == depth {
                        let url = text.trim();
                        if !url.is_empty() {
                            urls.push(url.to_string());
                        }
                    } else {
                        current_loc = Some((loc_depth, text));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|err| SitemapError::Malformed(err.to_string()))?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err(SitemapError::Malformed(
                        "text outside the root element".to_string(),
                    ));
                }
                if let Some((loc_depth, buf)) = current_loc.as_mut() {
                    if *loc_depth == depth {
                        buf.push_str(&text);
                    }
                }
            }
            Event::CData(ref e) => {
                if let Some((loc_depth, buf)) = current_loc.as_mut() {
                    if *loc_depth == depth {
                        buf.push_str(&String::from_utf8_lossy(e));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(SitemapError::Malformed("no root element found".to_string()));
    }
    if depth != 0 {
        return Err(SitemapError::Malformed(format!(
            "unexpected end of document with {depth} unclosed element(s)"
        )));
    }

    Ok(urls)
}

fn namespace_of(resolved: &ResolveResult) -> Result<Option<Vec<u8>>, SitemapError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(ns.0.to_vec())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(SitemapError::Malformed(format!(
            "unknown namespace prefix `{}`",
            String::from_utf8_lossy(prefix)
        ))),
    }
}
