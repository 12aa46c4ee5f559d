//! CLI command implementation for the judol-check binary.

pub mod check_cmd;
pub mod output;
pub mod progress;
