// ==============================================================================
// main.rs - GeneGenie Report CLI
// ==============================================================================
// Description: Generate a tiered GeneGenie report from a raw genotype export
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genegenie_report::config;
use genegenie_report::llm::{OfflineGenerator, OpenAiResponsesGenerator, TextGenerator};
use genegenie_report::output::{self, OutputFormat};
use genegenie_report::parsers::ExtractedPayload;
use genegenie_report::secure_delete;
use genegenie_report::tiers::{TierConfiguration, DEFAULT_TIER_ID};
use genegenie_report::{GenotypeSource, ReportError, ReportProcessor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tier (package) id; unknown ids fall back to the free tier
    #[arg(short, long, env = "GENEGENIE_TIER")]
    tier: Option<String>,

    /// Raw genotype export (.txt, .csv or gzip)
    #[arg(short, long, conflicts_with = "extracted", required_unless_present_any = ["extracted", "list_tiers"])]
    input: Option<PathBuf>,

    /// Pre-extracted genotype payload (JSON)
    #[arg(long)]
    extracted: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (markdown, json or text)
    #[arg(short, long, default_value = "markdown")]
    format: OutputFormat,

    /// Use the deterministic offline generator instead of the OpenAI API
    #[arg(long, env = "GENEGENIE_OFFLINE")]
    offline: bool,

    /// Securely delete the input file after the report is produced
    #[arg(long)]
    shred_input: bool,

    /// Section generation calls in flight at once
    #[arg(long, env = "GENEGENIE_SECTION_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Accepted lines kept as narrative sample
    #[arg(long, env = "GENEGENIE_SAMPLE_LINES")]
    sample_lines: Option<usize>,

    /// Model used by the OpenAI generator
    #[arg(long, env = "GENEGENIE_MODEL")]
    model: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", env = "GENEGENIE_LOG_FORMAT")]
    log_format: LogFormat,

    /// List available tiers and exit
    #[arg(long)]
    list_tiers: bool,
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "genegenie_report=info,genegenie=info".into());

    // Logs go to stderr so stdout carries only the report
    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_tiers() {
    for plan in TierConfiguration::global().all() {
        let default_marker = if plan.tier_id == DEFAULT_TIER_ID { " (default)" } else { "" };
        println!(
            "{:<18} {:<13} {} call(s)  panels: {}{}",
            plan.tier_id,
            plan.mode.as_str(),
            plan.call_count(),
            if plan.panel_ids.is_empty() {
                "-".to_string()
            } else {
                plan.panel_ids.join(", ")
            },
            default_marker
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    if args.list_tiers {
        print_tiers();
        return Ok(());
    }

    info!("GeneGenie report generator starting...");

    let (mut report_config, mut generator_config) =
        config::load().context("Failed to load configuration")?;
    if let Some(concurrency) = args.concurrency {
        report_config.section_concurrency = concurrency.max(1);
    }
    if let Some(sample_lines) = args.sample_lines {
        report_config.sample_lines = sample_lines;
    }
    if let Some(model) = args.model.clone() {
        generator_config.model = model;
    }

    let generator: Arc<dyn TextGenerator> = if args.offline {
        info!("Using offline generator");
        Arc::new(OfflineGenerator::new())
    } else {
        info!("Using OpenAI generator: {:?}", generator_config);
        Arc::new(
            OpenAiResponsesGenerator::new(&generator_config)
                .context("Text generator unavailable (set OPENAI_API_KEY or pass --offline)")?,
        )
    };

    // Load genotype source
    let (source, payload_tier) = match (&args.input, &args.extracted) {
        (Some(path), _) => (GenotypeSource::File(path.clone()), None),
        (None, Some(path)) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read payload file {:?}", path))?;
            let payload = ExtractedPayload::from_json(&json).map_err(ReportError::from)?;
            let tier = Some(payload.tier.clone()).filter(|t| !t.is_empty());
            (GenotypeSource::Extracted(payload), tier)
        }
        (None, None) => anyhow::bail!("Either --input or --extracted must be provided"),
    };

    let tier = args
        .tier
        .clone()
        .or(payload_tier)
        .unwrap_or_else(|| DEFAULT_TIER_ID.to_string());

    let processor = ReportProcessor::new(report_config, generator);
    let report = processor.generate_report(&tier, source).await?;

    if report.meta.fallback_sections > 0 {
        warn!(
            "{} of {} section(s) used fallback text",
            report.meta.fallback_sections, report.meta.section_count
        );
    }

    match &args.output {
        Some(path) => {
            output::write_report(&report, args.format, path)?;
        }
        None => println!("{}", output::render(&report, args.format)?),
    }

    if args.shred_input {
        match &args.input {
            Some(path) => secure_delete::secure_delete_file(path)?,
            None => warn!("--shred-input only applies to --input files"),
        }
    }

    info!(
        "Report complete: tier {} ({} sections, request {})",
        report.meta.tier, report.meta.section_count, report.meta.request_id
    );
    Ok(())
}
