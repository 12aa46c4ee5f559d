use anyhow::Result;
use clap::Parser;
use judol_check::acquisition::http_client::{FetchConfig, RetryPolicy, DEFAULT_USER_AGENT};
use judol_check::audit::runner::{AuditOptions, DEFAULT_CONCURRENCY};
use judol_check::cli::{check_cmd, output};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Check every page of a sitemap for gambling-spam markers ("judol", "gacor", "togel", "maxwin").
#[derive(Parser, Debug)]
#[command(name = "judol-check", version, about)]
struct Cli {
    /// Path to sitemap.xml
    #[arg(short, long, default_value = "sitemap.xml")]
    sitemap: PathBuf,

    /// Output JSON report file
    #[arg(short, long, default_value = "judol_report.json")]
    output: PathBuf,

    /// Number of concurrent requests
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY as u32,
          value_parser = clap::value_parser!(u32).range(1..))]
    concurrency: u32,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Retries for transport errors and 500/502/503/504 responses
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Backoff factor in seconds; retry n sleeps backoff * 2^(n-1)
    #[arg(long, default_value_t = 0.3)]
    backoff: f64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Exit with status 1 when any page contains a marker keyword
    #[arg(long)]
    fail_on_match: bool,

    /// Print a JSON summary to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress and summary output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Show configuration and debug logs
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

impl Cli {
    /// Expose the global output flags to `cli::output`.
    fn export_output_flags(&self) {
        let flags = [
            (self.json, output::ENV_JSON),
            (self.quiet, output::ENV_QUIET),
            (self.verbose, output::ENV_VERBOSE),
            (self.no_color, output::ENV_NO_COLOR),
        ];
        for (enabled, var) in flags {
            if enabled {
                std::env::set_var(var, "1");
            }
        }
    }

    fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            concurrency: self.concurrency as usize,
            fetch: FetchConfig {
                timeout: Duration::from_secs(self.timeout),
                user_agent: self.user_agent.clone(),
                retry: RetryPolicy {
                    max_retries: self.retries,
                    backoff_factor: self.backoff,
                    ..RetryPolicy::default()
                },
            },
        }
    }
}

fn init_tracing(verbose: bool, json: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::from_default_env().add_directive(format!("judol_check={level}").parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.export_output_flags();

    if let Err(e) = init_tracing(cli.verbose, cli.log_json) {
        eprintln!("Error: failed to initialize logging: {e:#}");
        return ExitCode::from(2);
    }

    match check_cmd::run(&cli.sitemap, &cli.output, &cli.audit_options()).await {
        Ok(report) => {
            if cli.fail_on_match && report.matches().next().is_some() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
