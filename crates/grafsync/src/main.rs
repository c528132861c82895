//! grafsync entry point.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use grafsync::export::{FailureRecord, StepReport};
use grafsync::{GrafanaClientFactory, PublishReport, SectionReport, SyncReport, SyncRunner};

use crate::cli::{Cli, LogFormat};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet, cli.log_format);

    let runner = SyncRunner::new(cli.settings(), Arc::new(GrafanaClientFactory))
        .with_overrides(cli.overrides());

    match runner.run().await {
        Ok(report) => {
            if cli.report_json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("Error: failed to serialize report: {e}"),
                }
            } else {
                print_summary(&report);
            }
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn print_summary(report: &SyncReport) {
    for section in &report.sections {
        println!("{}", section_line(section));
    }

    match &report.publish {
        PublishReport::Disabled => println!("publish: disabled"),
        PublishReport::Published(outcome) => println!("publish: {outcome:?}"),
        PublishReport::Failed(failure) => println!("publish: failed ({})", describe(failure)),
    }
}

fn section_line(section: &SectionReport) -> String {
    if let Some(reason) = &section.skip_reason {
        return format!("[{}] skipped ({})", section.section, describe(reason));
    }

    let step = |name: &str, step: &Option<StepReport>| match step {
        Some(step) => {
            let items = step.items.map(|n| format!(", {n} items")).unwrap_or_default();
            let failed = if step.failures.is_empty() {
                String::new()
            } else {
                format!(", {} failed", step.failures.len())
            };
            format!("{name} {:?}{items}{failed}", step.status).to_lowercase()
        }
        None => format!("{name} none"),
    };

    format!(
        "[{}] {}; {}; {}",
        section.section,
        step("datasources", &section.datasources),
        step("dashboards", &section.dashboards),
        step("alerts", &section.alerts)
    )
}

fn describe(failure: &FailureRecord) -> String {
    let hint = if failure.retryable { ", retryable" } else { "" };
    format!("{}: {}{}", failure.kind, failure.message, hint)
}
