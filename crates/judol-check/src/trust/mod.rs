//! Content trust checks: spam and defacement marker detection.

pub mod markers;
