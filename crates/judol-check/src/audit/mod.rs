//! Audit runs: result records, the JSON report, and the run driver.

pub mod report;
pub mod runner;
