//! ai-reporter CLI

use ai_reporter::config::{self, RawConfig, ReporterConfig};
use ai_reporter::report::SummaryInfo;
use ai_reporter::{FailEvent, Reporter};
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ai-reporter")]
#[command(version, about = "Turn test failure records into compact reports for automated diagnosis")]
struct Args {
    /// Run records to read (JSON); `-` reads stdin
    #[arg(default_value = "-")]
    inputs: Vec<String>,

    /// Project root used to compact paths
    #[arg(long)]
    root: Option<PathBuf>,

    /// Config file (defaults to the nearest ai-reporter.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ignore ai-reporter.toml configuration
    #[arg(long)]
    no_config: bool,

    /// Output format: text, json, both
    #[arg(long)]
    format: Option<String>,

    /// Output directory for the reports
    #[arg(long)]
    output: Option<String>,

    /// Maximum number of frames and steps per failure
    #[arg(long, allow_negative_numbers = true)]
    max_frames: Option<i64>,

    /// Include scenario steps (true/false)
    #[arg(long)]
    include_steps: Option<bool>,

    /// Include artifacts (true/false)
    #[arg(long)]
    include_artifacts: Option<bool>,

    /// Compact paths relative to the project root (true/false)
    #[arg(long)]
    compact_paths: Option<bool>,

    /// Print inline context for each failure
    #[arg(long)]
    report: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> RawConfig {
        RawConfig {
            format: self.format.clone().map(toml::Value::String),
            output: self.output.clone().map(toml::Value::String),
            max_frames: self.max_frames.map(toml::Value::Integer),
            include_steps: self.include_steps.map(toml::Value::Boolean),
            include_artifacts: self.include_artifacts.map(toml::Value::Boolean),
            compact_paths: self.compact_paths.map(toml::Value::Boolean),
        }
    }
}

/// A batch of failure events for one run or suite
#[derive(Debug, Deserialize)]
struct RunInput {
    #[serde(default)]
    suite: Option<String>,
    #[serde(default)]
    summary: Option<SummaryInfo>,
    #[serde(default)]
    events: Vec<FailEvent>,
}

fn read_input(source: &str) -> Result<RunInput> {
    let content = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read run record from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read run record {}", source))?
    };

    serde_json::from_str(&content).with_context(|| format!("Invalid run record in {}", source))
}

/// Add up runner totals; `None` if no input carried any
fn merge_summaries(summaries: Vec<SummaryInfo>) -> Option<SummaryInfo> {
    summaries.into_iter().reduce(|mut total, next| {
        total.tests += next.tests;
        total.successful += next.successful;
        total.failures += next.failures;
        total.errors += next.errors;
        total.warnings += next.warnings;
        total.skipped += next.skipped;
        total.incomplete += next.incomplete;
        total.useless += next.useless;
        total.assertions += next.assertions;
        total.successful_run = total.successful_run && next.successful_run;
        total
    })
}

fn load_config(args: &Args, project_root: &Path) -> Result<ReporterConfig> {
    let file_config = if args.no_config {
        None
    } else {
        config::discover_config(args.config.as_deref(), project_root)?
    };

    let raw = file_config.unwrap_or_default().merge(args.overrides());
    let root = project_root.to_string_lossy();
    let config = ReporterConfig::from_raw(&raw, &config::default_output_dir(&root), &root)?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if args.verbose {
        "debug"
    } else {
        "warn"
    }))
    .format_timestamp(None)
    .try_init()
    .ok();

    let project_root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    let config = load_config(&args, &project_root)?;
    let mut reporter = Reporter::new(config, &project_root.to_string_lossy());
    log::debug!("effective configuration: {:?}", reporter.config());
    let mut summaries = Vec::new();

    for source in &args.inputs {
        let input = read_input(source)?;
        log::debug!("{}: {} event(s)", source, input.events.len());

        if let Some(suite) = &input.suite {
            reporter.before_suite(suite);
        }
        summaries.extend(input.summary);

        for event in input.events {
            let failure = reporter.capture_failure(event).clone();
            if !args.report {
                continue;
            }

            let lines = reporter.inline_context(&failure);
            if lines.is_empty() {
                continue;
            }
            println!("  {}", "AI Context".yellow());
            for line in lines {
                println!("{}", line);
            }
        }
    }

    let report = reporter.build_report(merge_summaries(summaries));
    for outcome in reporter.write_reports(&report) {
        match outcome.result {
            Ok(()) => println!(
                "- {} report generated in {}",
                outcome.label.bold(),
                format!("file://{}", outcome.path.display()).yellow()
            ),
            Err(err) => eprintln!(
                "- {}: {}",
                format!("{} report generation failed", outcome.label).red(),
                ai_reporter::utils::escape_console(&ai_reporter::utils::truncate(
                    &err.to_string(),
                    ai_reporter::utils::CONSOLE_MAX_LEN
                ))
            ),
        }
    }

    if args.verbose {
        eprintln!("\nCaptured {} failure(s).", report.failures.len());
    }

    Ok(())
}
