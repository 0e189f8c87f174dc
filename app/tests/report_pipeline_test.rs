// ==============================================================================
// report_pipeline_test.rs - End-to-End Report Pipeline Tests
// ==============================================================================
// Description: Raw export to assembled report with scripted generators
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use flate2::write::GzEncoder;
use flate2::Compression;
use genegenie_report::catalog::MarkerCatalog;
use genegenie_report::config::ReportConfig;
use genegenie_report::llm::{GenerationError, GenerationRequest, OfflineGenerator, TextGenerator};
use genegenie_report::models::{GenerationMode, SectionStatus};
use genegenie_report::output::{self, OutputFormat};
use genegenie_report::panels::PanelRegistry;
use genegenie_report::parsers::{ConsumerExportParser, ExtractedPayload};
use genegenie_report::render::{render_panel, NOT_FOUND};
use genegenie_report::tiers::{TierConfiguration, DEFAULT_TIER_ID};
use genegenie_report::{GenotypeSource, ReportError, ReportProcessor};
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted collaborator: fails for chosen labels, optionally delays by label
#[derive(Default)]
struct ScriptedGenerator {
    failing: HashSet<String>,
    jitter: bool,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn failing(labels: &[&str]) -> Self {
        Self {
            failing: labels.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(request.clone());

        if self.jitter {
            // Later sections finish first
            let delay = 40u64.saturating_sub(request.label.len() as u64 % 40);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.failing.contains(&request.label) {
            return Err(GenerationError::Timeout);
        }
        Ok(format!("## {}\n\nNarrative for {}.", request.label, request.label))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

const EXPORT_23ANDME: &str = "# This data file generated by 23andMe\r\n\
# rsid\tchromosome\tposition\tgenotype\r\n\
rs1801133\t1\t11856378\tAG\r\n\
rs1801131\t1\t11854476\tTT\r\n\
rs4680\t22\t19951271\tGG\r\n\
rs1801133\t1\t11856378\tCC\r\n";

fn processor(generator: Arc<dyn TextGenerator>) -> ReportProcessor {
    ReportProcessor::new(ReportConfig::default(), generator)
}

#[test]
fn test_parsing_is_deterministic() {
    let parser = ConsumerExportParser::new();
    let first = parser.parse(EXPORT_23ANDME).unwrap();
    let second = parser.parse(EXPORT_23ANDME).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_count, 4);
    // First occurrence wins
    assert_eq!(first.genotype("rs1801133"), Some("AG"));
}

#[test]
fn test_allele_pair_line_renders_in_panel() {
    let input = "rsid\tallele1\tallele2\nrs1801133\tA\tG\n";
    let parsed = ConsumerExportParser::new().parse(input).unwrap();
    assert_eq!(parsed.genotype("rs1801133"), Some("AG"));
    assert_eq!(parsed.total_count, 1);

    let plan = TierConfiguration::global().resolve("wellness-core");
    let methylation = PanelRegistry::global()
        .panel(plan.panel_ids[0])
        .unwrap();
    let block = render_panel(methylation, &parsed.genotypes, MarkerCatalog::global());

    assert!(block.lines().any(|l| l.starts_with("rs1801133 ") && l.ends_with(": AG")));
    assert!(block.contains(NOT_FOUND));
}

#[tokio::test]
async fn test_default_mid_tier_grounding_reaches_generator() {
    let generator = Arc::new(ScriptedGenerator::default());
    let report = processor(generator.clone())
        .generate_report("wellness-core", GenotypeSource::raw("rsid\tallele1\tallele2\nrs1801133\tA\tG\n"))
        .await
        .unwrap();

    assert_eq!(report.meta.mode, GenerationMode::SingleShot);
    assert_eq!(report.meta.markers_found, 1);

    let calls = generator.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system_context.contains("rs1801133 (MTHFR C677T): AG"));
}

#[tokio::test]
async fn test_unknown_tier_behaves_like_default() {
    let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::default());
    let processor = processor(generator);

    let unknown = processor
        .generate_report("unknown_tier_xyz", GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();
    let default = processor
        .generate_report(DEFAULT_TIER_ID, GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();

    assert_eq!(unknown.meta.tier, DEFAULT_TIER_ID);
    assert_eq!(unknown.meta.panels_used, default.meta.panels_used);
    assert!(unknown.meta.panels_used.is_empty());
    assert_eq!(unknown.meta.mode, GenerationMode::SingleShot);
    assert_eq!(unknown.meta.mode, default.meta.mode);
    assert_eq!(unknown.sections.len(), 1);
}

#[tokio::test]
async fn test_tier_ids_are_normalized() {
    let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::default());
    let report = processor(generator)
        .generate_report("  Biohacker_Pack ", GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();

    assert_eq!(report.meta.tier, "biohacker-pack");
    assert_eq!(report.meta.mode, GenerationMode::MultiSection);
    assert_eq!(report.sections.len(), 6);
}

#[tokio::test]
async fn test_section_two_of_nine_fails() {
    let plan = TierConfiguration::global().resolve("life-plan");
    let generator = Arc::new(ScriptedGenerator::failing(&[plan.section_specs[2].heading]));

    let report = processor(generator.clone())
        .generate_report("life-plan", GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();

    assert_eq!(report.sections.len(), 9);
    assert_eq!(report.sections[2].status, SectionStatus::Fallback);
    for i in [0, 1, 3, 4, 5, 6, 7, 8] {
        assert_eq!(report.sections[i].status, SectionStatus::Ok, "section {}", i);
    }
    assert_eq!(report.meta.fallback_sections, 1);
    assert!(report.sections[2].text.starts_with(plan.section_specs[2].heading));

    // Every section call shares one grounding context
    let calls = generator.calls.lock().unwrap();
    assert_eq!(calls.len(), 9);
    assert!(calls.iter().all(|c| c.system_context == calls[0].system_context));

    // The surviving sections match an all-success run byte for byte
    let baseline = processor(Arc::new(ScriptedGenerator::default()))
        .generate_report("life-plan", GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();
    assert_eq!(baseline.meta.fallback_sections, 0);
    assert_ne!(report.sections[2].text, baseline.sections[2].text);
    for i in [0, 1, 3, 4, 5, 6, 7, 8] {
        assert_eq!(
            report.sections[i].text.as_bytes(),
            baseline.sections[i].text.as_bytes(),
            "section {}",
            i
        );
        assert_eq!(report.sections[i].heading, baseline.sections[i].heading);
    }
}

#[tokio::test]
async fn test_concurrent_sections_keep_plan_order() {
    let plan = TierConfiguration::global().resolve("life-plan");
    let generator = Arc::new(ScriptedGenerator {
        failing: [plan.section_specs[5].heading.to_string()].into_iter().collect(),
        jitter: true,
        ..Default::default()
    });
    let config = ReportConfig {
        section_concurrency: 9,
        ..ReportConfig::default()
    };

    let report = ReportProcessor::new(config, generator)
        .generate_report("life-plan", GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();

    let headings: Vec<&str> = report.sections.iter().map(|s| s.heading.as_str()).collect();
    let planned: Vec<&str> = plan.section_specs.iter().map(|s| s.heading).collect();
    assert_eq!(headings, planned);
    assert_eq!(report.fallback_count(), 1);
    assert!(report.sections[5].is_fallback());
}

#[tokio::test]
async fn test_every_section_failing_still_returns_report() {
    let plan = TierConfiguration::global().resolve("biohacker-pack");
    let headings: Vec<&str> = plan.section_specs.iter().map(|s| s.heading).collect();
    let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::failing(&headings));

    let report = processor(generator)
        .generate_report("biohacker-pack", GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();

    assert_eq!(report.sections.len(), 6);
    assert_eq!(report.meta.fallback_sections, 6);
    assert!(report.document().starts_with(plan.report_title));
}

#[tokio::test]
async fn test_gzip_export_is_accepted() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(EXPORT_23ANDME.as_bytes()).unwrap();
    let gz = encoder.finish().unwrap();

    let generator: Arc<dyn TextGenerator> = Arc::new(ScriptedGenerator::default());
    let report = processor(generator)
        .generate_report("wellness-core", GenotypeSource::raw(gz))
        .await
        .unwrap();

    assert_eq!(report.meta.total_count, 4);
}

#[tokio::test]
async fn test_input_failures_are_fatal() {
    let generator = Arc::new(ScriptedGenerator::default());
    let processor = processor(generator.clone());

    let empty = processor
        .generate_report("life-plan", GenotypeSource::raw(Vec::new()))
        .await;
    assert!(matches!(empty, Err(ReportError::InvalidInput(_))));

    let no_data = processor
        .generate_report("life-plan", GenotypeSource::raw("# comment only\nname value\n"))
        .await;
    assert_eq!(no_data.unwrap_err(), ReportError::NoRecognizableData);

    let bad_payload = ExtractedPayload::from_json(
        r#"{ "tier": "life-plan", "totalCount": 1, "genotypeMap": { "rs4680": { "genotype": "banana" } } }"#,
    )
    .unwrap();
    let invalid = processor
        .generate_report("life-plan", GenotypeSource::Extracted(bad_payload))
        .await;
    assert!(matches!(invalid, Err(ReportError::InvalidInput(_))));

    // No generation call is attempted when the genotype map cannot be built
    assert!(generator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_offline_report_renders_as_json() {
    let report = processor(Arc::new(OfflineGenerator::new()))
        .generate_report("parent-decoder", GenotypeSource::raw(EXPORT_23ANDME))
        .await
        .unwrap();

    assert_eq!(report.meta.generator, "offline");
    assert_eq!(report.meta.panels_used, vec!["temperament", "kid-nutrition", "sleep"]);

    let json: serde_json::Value =
        serde_json::from_str(&output::render(&report, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["meta"]["tier"], "parent-decoder");
    assert_eq!(json["meta"]["mode"], "singleShot");
    assert_eq!(json["meta"]["sectionCount"], 1);
    assert_eq!(json["sections"][0]["status"], "ok");
}
