//! Marker detection — scan page bodies for gambling-spam injection keywords.
//!
//! Matching is plain case-insensitive substring containment over the raw
//! response text. No HTML is parsed, so keywords hidden in markup, scripts,
//! or comments count the same as visible text.

/// Keywords associated with illicit gambling advertising.
pub const MARKER_KEYWORDS: [&str; 4] = ["judol", "gacor", "togel", "maxwin"];

/// A body consisting of only this keyword means the page was replaced
/// wholesale rather than partially injected.
pub const DEFACEMENT_SIGNATURE: &str = "judol";

/// Outcome of scanning one page body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerScan {
    /// The body mentions at least one marker keyword.
    pub has_marker: bool,
    /// The whole body is the defacement signature.
    pub exact_marker: bool,
}

/// Scan a page body for marker keywords and the defacement signature.
pub fn scan(body: &str) -> MarkerScan {
    let lowered = body.to_lowercase();
    MarkerScan {
        has_marker: MARKER_KEYWORDS.iter().any(|kw| lowered.contains(kw)),
        exact_marker: is_exact_marker(body),
    }
}

/// Check if the body contains any marker keyword.
pub fn has_marker(body: &str) -> bool {
    scan(body).has_marker
}

/// Check if the trimmed, lowercased body equals the defacement signature.
pub fn is_exact_marker(body: &str) -> bool {
    body.trim().to_lowercase() == DEFACEMENT_SIGNATURE
}

/// List the marker keywords present in the body, in keyword order.
pub fn matched_keywords(body: &str) -> Vec<&'static str> {
    let lowered = body.to_lowercase();
    MARKER_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| lowered.contains(kw))
        .collect()
}
