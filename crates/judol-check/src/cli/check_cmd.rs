//! `judol-check` — audit every page of a sitemap for spam markers.

use crate::audit::report::Report;
use crate::audit::runner::{run_audit_with_progress, AuditOptions};
use crate::cli::output::{self, Styled};
use crate::cli::progress::{self, Tally};
use crate::trust::markers::DEFACEMENT_SIGNATURE;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

/// Run the check and print the summary.
pub async fn run(sitemap: &Path, output_path: &Path, options: &AuditOptions) -> Result<Report> {
    let s = Styled::new();
    let start = Instant::now();
    let interactive = !output::is_quiet() && !output::is_json();

    if interactive {
        output::print_header(&s);
        if output::is_verbose() {
            eprintln!("  Configuration:");
            eprintln!("    concurrency: {}", options.concurrency);
            eprintln!("    timeout:     {}s", options.fetch.timeout.as_secs());
            eprintln!("    retries:     {}", options.fetch.retry.max_retries);
            eprintln!("    backoff:     {}s", options.fetch.retry.backoff_factor);
            eprintln!("    user agent:  {}", options.fetch.user_agent);
            eprintln!();
        }
    }

    let bar = progress::create_fetch_progress(0, interactive);
    let mut tally = Tally::default();
    let report = run_audit_with_progress(
        sitemap,
        output_path,
        options,
        |total| bar.set_length(total as u64),
        |result| progress::advance(&bar, &mut tally, result),
    )
    .await;
    bar.finish_and_clear();
    let report = report?;

    if output::is_json() {
        let mut summary = summary_json(&report, output_path);
        summary["duration_ms"] = serde_json::json!(start.elapsed().as_millis() as u64);
        output::print_json(&summary);
    } else if !output::is_quiet() {
        eprint!("{}", render_summary(&s, &report, output_path));
    }

    Ok(report)
}

/// Human-readable summary of a finished run.
pub fn render_summary(s: &Styled, report: &Report, output_path: &Path) -> String {
    let mut out = String::new();
    let found: Vec<_> = report.matches().collect();
    let exact: Vec<_> = report.exact_matches().collect();
    let failed = report.failures().count();

    let _ = writeln!(
        out,
        "  {} {}  URLs checked: {}",
        s.bold("Sitemap:"),
        report.sitemap,
        report.count
    );
    if failed > 0 {
        let _ = writeln!(out, "  {} Fetch failures: {failed}", s.warn_sym());
    }

    let label = format!("Pages containing marker keywords: {}", found.len());
    if found.is_empty() {
        let _ = writeln!(out, "  {} {label}", s.ok_sym());
    } else {
        let _ = writeln!(out, "  {} {}", s.fail_sym(), s.yellow(&label));
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", s.bold("Matches:"));
        for r in &found {
            let status = r
                .status_code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "    - {} {}", r.url(), s.dim(&format!("(status={status})")));
        }
    }

    if !exact.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {}",
            s.red(&format!(
                "Exact-body == \"{DEFACEMENT_SIGNATURE}\" (likely defacement):"
            ))
        );
        for r in &exact {
            let _ = writeln!(out, "    - {}", s.red(r.url()));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Full report written to: {}", output_path.display());
    out
}

/// Machine-readable summary for `--json`.
pub fn summary_json(report: &Report, output_path: &Path) -> serde_json::Value {
    let matches: Vec<_> = report
        .matches()
        .map(|r| {
            serde_json::json!({
                "url": r.url(),
                "status_code": r.status_code(),
                "exact_judol": r.exact_marker(),
            })
        })
        .collect();
    let exact: Vec<_> = report.exact_matches().map(|r| r.url()).collect();

    serde_json::json!({
        "sitemap": report.sitemap,
        "count": report.count,
        "failed": report.failures().count(),
        "matched": matches.len(),
        "matches": matches,
        "exact": exact,
        "report": output_path.display().to_string(),
    })
}
