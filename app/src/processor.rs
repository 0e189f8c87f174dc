// ==============================================================================
// processor.rs - Report Generation Pipeline
// ==============================================================================
// Description: Validates input, builds panel grounding and drives generation
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Pipeline: input -> validate -> parse -> resolve tier -> render panels ->
// orchestrate sections -> assemble. Only input failures are fatal; generation
// failures degrade individual sections.
// ==============================================================================

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::audit::{self, AuditEventType};
use crate::catalog::MarkerCatalog;
use crate::config::ReportConfig;
use crate::llm::TextGenerator;
use crate::models::{Report, ReportMeta};
use crate::orchestrator::{GroundingContext, SectionOrchestrator};
use crate::panels::PanelRegistry;
use crate::parsers::{
    ConsumerExportParser, ExtractedPayload, GenotypeParseError, ParsedGenome, PayloadError,
};
use crate::render::render_grounding;
use crate::tiers::TierConfiguration;
use crate::validator::{InputValidator, ValidationError};

/// Fatal request failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No recognizable genotype data found in the input")]
    NoRecognizableData,
}

impl ReportError {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::InvalidInput(_) => "invalid_input",
            ReportError::NoRecognizableData => "no_recognizable_data",
        }
    }
}

impl From<ValidationError> for ReportError {
    fn from(err: ValidationError) -> Self {
        ReportError::InvalidInput(err.to_string())
    }
}

impl From<GenotypeParseError> for ReportError {
    fn from(_: GenotypeParseError) -> Self {
        ReportError::NoRecognizableData
    }
}

impl From<PayloadError> for ReportError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Empty => ReportError::NoRecognizableData,
            other => ReportError::InvalidInput(other.to_string()),
        }
    }
}

/// Where the genotypes for a request come from
pub enum GenotypeSource {
    /// Raw export bytes, plain or gzip
    Raw(Zeroizing<Vec<u8>>),
    /// Raw export on disk; size is checked before the file is read
    File(PathBuf),
    /// Genotypes already extracted upstream; parsing is skipped
    Extracted(ExtractedPayload),
}

impl GenotypeSource {
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        GenotypeSource::Raw(Zeroizing::new(bytes.into()))
    }

    fn kind(&self) -> &'static str {
        match self {
            GenotypeSource::Raw(_) => "raw",
            GenotypeSource::File(_) => "file",
            GenotypeSource::Extracted(_) => "extracted",
        }
    }
}

pub struct ReportProcessor {
    config: ReportConfig,
    generator: Arc<dyn TextGenerator>,
    validator: InputValidator,
    parser: ConsumerExportParser,
}

impl ReportProcessor {
    pub fn new(config: ReportConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let validator = InputValidator::new(config.max_input_bytes);
        let parser = ConsumerExportParser::new()
            .with_policy(config.genotype_policy)
            .with_sample_limit(config.sample_lines);

        Self {
            config,
            generator,
            validator,
            parser,
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Produce a report for any tier string
    ///
    /// Unknown tiers resolve to the default tier. Fails only when the input is
    /// missing, malformed or contains no recognizable genotype lines.
    pub async fn generate_report(
        &self,
        tier: &str,
        source: GenotypeSource,
    ) -> Result<Report, ReportError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("report", %request_id, requested_tier = %tier);

        self.run(request_id, tier, source).instrument(span).await
    }

    async fn run(
        &self,
        request_id: Uuid,
        tier: &str,
        source: GenotypeSource,
    ) -> Result<Report, ReportError> {
        audit::log_event(
            AuditEventType::ReportRequested,
            request_id,
            Some(tier),
            serde_json::json!({
                "source": source.kind(),
                "generator": self.generator.name(),
            }),
        );

        // 1. Genotype map (fatal on failure)
        let genome = match self.load_genome(request_id, tier, source) {
            Ok(genome) => genome,
            Err(err) => {
                let event_type = match err {
                    ReportError::NoRecognizableData => AuditEventType::NoRecognizableData,
                    ReportError::InvalidInput(_) => AuditEventType::InputRejected,
                };
                audit::log_event(
                    event_type,
                    request_id,
                    Some(tier),
                    serde_json::json!({ "error": err.to_string() }),
                );
                warn!("Report request rejected: {}", err);
                return Err(err);
            }
        };

        // 2. Tier plan
        let tiers = TierConfiguration::global();
        let plan = tiers.resolve(tier);
        if tiers.lookup(tier).is_none() {
            info!("Unrecognized tier '{}', using default tier {}", tier, plan.tier_id);
        }

        // 3. Grounding text, panels in tier order
        let grounding = render_grounding(
            plan.panel_ids,
            &genome.genotypes,
            PanelRegistry::global(),
            MarkerCatalog::global(),
        );
        info!(
            tier = plan.tier_id,
            mode = plan.mode.as_str(),
            panels = grounding.panels_used.len(),
            markers_found = grounding.markers_found,
            total_count = genome.total_count,
            "Grounding built"
        );

        let context = GroundingContext {
            grounding_text: grounding.text,
            sample_lines: genome.sample_lines,
            total_count: genome.total_count,
        };

        // 4. Sections
        let output = SectionOrchestrator::new(self.generator.as_ref())
            .with_concurrency(self.config.section_concurrency)
            .run(plan, &context)
            .await;

        for failure in &output.failures {
            audit::log_event(
                AuditEventType::SectionFallback,
                request_id,
                Some(plan.tier_id),
                serde_json::json!({
                    "index": failure.index,
                    "heading": failure.heading,
                    "kind": failure.error.kind(),
                }),
            );
        }

        let meta = ReportMeta {
            request_id,
            requested_tier: tier.to_string(),
            tier: plan.tier_id.to_string(),
            panels_used: grounding.panels_used,
            mode: plan.mode,
            section_count: output.sections.len(),
            fallback_sections: output.failures.len(),
            total_count: context.total_count,
            markers_found: grounding.markers_found,
            generated_at: Utc::now(),
            generator: self.generator.name().to_string(),
        };

        let report = Report {
            title: plan.report_title.to_string(),
            sections: output.sections,
            meta,
        };

        audit::log_event(
            AuditEventType::ReportCompleted,
            request_id,
            Some(plan.tier_id),
            serde_json::json!({
                "mode": plan.mode.as_str(),
                "sections": report.meta.section_count,
                "fallback_sections": report.meta.fallback_sections,
                "panels_used": report.meta.panels_used,
            }),
        );

        Ok(report)
    }

    fn load_genome(
        &self,
        request_id: Uuid,
        tier: &str,
        source: GenotypeSource,
    ) -> Result<ParsedGenome, ReportError> {
        match source {
            GenotypeSource::Raw(bytes) => {
                let input = self.validator.validate(&bytes)?;
                debug!(%request_id, sha256 = %input.hash_sha256, "Parsing raw export");
                Ok(self.parser.parse(&input.text)?)
            }
            GenotypeSource::File(path) => {
                let input = self.validator.validate_file(&path)?;
                debug!(%request_id, sha256 = %input.hash_sha256, "Parsing export file {:?}", path);
                Ok(self.parser.parse(&input.text)?)
            }
            GenotypeSource::Extracted(payload) => {
                if !payload.tier.is_empty() && payload.tier != tier {
                    warn!(
                        "Payload tier '{}' differs from requested tier '{}', using the requested tier",
                        payload.tier, tier
                    );
                }
                Ok(payload.into_parsed(self.config.sample_lines)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GenerationError, GenerationRequest};
    use crate::models::{GenerationMode, SectionStatus};
    use crate::orchestrator::fallback_text;
    use crate::render::NOT_FOUND;
    use std::sync::Mutex;

    /// Records every request; fails when the label matches
    #[derive(Default)]
    struct RecordingGenerator {
        fail_label: Option<String>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait::async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail_label.as_deref() == Some(request.label.as_str()) {
                return Err(GenerationError::Transport("connection reset".to_string()));
            }
            Ok(format!("## {}\n\nGenerated.", request.label))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn processor(generator: Arc<RecordingGenerator>) -> ReportProcessor {
        ReportProcessor::new(ReportConfig::default(), generator)
    }

    const EXPORT: &str = "# rsid\tchromosome\tposition\tgenotype\n\
rs1801133\t1\t11856378\tAG\r\n\
rs4680\t22\t19951271\tGG\n";

    #[test]
    fn test_error_mapping() {
        assert_eq!(ReportError::from(PayloadError::Empty), ReportError::NoRecognizableData);
        assert!(matches!(
            ReportError::from(PayloadError::EmptyMarkerId),
            ReportError::InvalidInput(_)
        ));
        assert!(matches!(
            ReportError::from(PayloadError::DuplicateMarkerId("rs1".to_string())),
            ReportError::InvalidInput(_)
        ));
        assert!(matches!(
            ReportError::from(ValidationError::Empty),
            ReportError::InvalidInput(_)
        ));
        assert_eq!(ReportError::NoRecognizableData.kind(), "no_recognizable_data");
    }

    #[tokio::test]
    async fn test_empty_input_is_invalid() {
        let generator = Arc::new(RecordingGenerator::default());
        let result = processor(generator.clone())
            .generate_report("wellness-core", GenotypeSource::raw(Vec::new()))
            .await;

        assert!(matches!(result, Err(ReportError::InvalidInput(_))));
        assert!(generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_data_lines_is_fatal() {
        let generator = Arc::new(RecordingGenerator::default());
        let result = processor(generator.clone())
            .generate_report("life-plan", GenotypeSource::raw("# only comments\nhello world\n"))
            .await;

        assert_eq!(result.unwrap_err(), ReportError::NoRecognizableData);
        assert!(generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wellness_core_single_shot() {
        let generator = Arc::new(RecordingGenerator::default());
        let report = processor(generator.clone())
            .generate_report("wellness-core", GenotypeSource::raw(EXPORT))
            .await
            .unwrap();

        assert_eq!(report.meta.tier, "wellness-core");
        assert_eq!(report.meta.mode, GenerationMode::SingleShot);
        assert_eq!(
            report.meta.panels_used,
            vec!["methylation", "nutrition", "fitness", "sleep"]
        );
        assert_eq!(report.meta.total_count, 2);
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].status, SectionStatus::Ok);

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let context = &requests[0].system_context;
        assert!(context.contains("rs1801133 (MTHFR C677T): AG"));
        assert!(context.contains(NOT_FOUND));
        assert!(context.contains("rs4680\t22\t19951271\tGG"));
    }

    #[tokio::test]
    async fn test_unknown_tier_matches_default() {
        let generator = Arc::new(RecordingGenerator::default());
        let processor = processor(generator.clone());

        let unknown = processor
            .generate_report("no_such_tier", GenotypeSource::raw(EXPORT))
            .await
            .unwrap();
        let default = processor
            .generate_report("tease", GenotypeSource::raw(EXPORT))
            .await
            .unwrap();

        assert_eq!(unknown.meta.tier, default.meta.tier);
        assert_eq!(unknown.meta.panels_used, default.meta.panels_used);
        assert_eq!(unknown.meta.mode, default.meta.mode);
        assert_eq!(unknown.meta.requested_tier, "no_such_tier");
        assert!(unknown.meta.panels_used.is_empty());
        assert_eq!(unknown.title, default.title);
    }

    #[tokio::test]
    async fn test_section_failure_degrades_only_that_section() {
        let plan = TierConfiguration::global().resolve("life-plan");
        let failing = plan.section_specs[2].heading;
        let generator = Arc::new(RecordingGenerator {
            fail_label: Some(failing.to_string()),
            ..Default::default()
        });

        let report = processor(generator)
            .generate_report("life-plan", GenotypeSource::raw(EXPORT))
            .await
            .unwrap();

        assert_eq!(report.sections.len(), 9);
        assert_eq!(report.meta.fallback_sections, 1);
        assert_eq!(report.fallback_count(), 1);
        assert_eq!(report.sections[2].text, fallback_text(failing));
        for (i, section) in report.sections.iter().enumerate() {
            let expected = if i == 2 { SectionStatus::Fallback } else { SectionStatus::Ok };
            assert_eq!(section.status, expected, "section {}", i);
        }
    }

    #[tokio::test]
    async fn test_file_source_is_validated_and_parsed() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, EXPORT.as_bytes()).unwrap();

        let generator = Arc::new(RecordingGenerator::default());
        let report = processor(generator.clone())
            .generate_report("wellness-core", GenotypeSource::File(temp_file.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(report.meta.total_count, 2);
        assert_eq!(generator.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_file_is_invalid_input() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut temp_file, EXPORT.as_bytes()).unwrap();

        let config = ReportConfig {
            max_input_bytes: 16,
            ..ReportConfig::default()
        };
        let generator = Arc::new(RecordingGenerator::default());
        let result = ReportProcessor::new(config, generator.clone())
            .generate_report("wellness-core", GenotypeSource::File(temp_file.path().to_path_buf()))
            .await;

        match result {
            Err(ReportError::InvalidInput(message)) => assert!(message.contains("too large")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert!(generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid_input() {
        let generator = Arc::new(RecordingGenerator::default());
        let result = processor(generator.clone())
            .generate_report("life-plan", GenotypeSource::File(PathBuf::from("/nonexistent/genome.txt")))
            .await;

        assert!(matches!(result, Err(ReportError::InvalidInput(_))));
        assert!(generator.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extracted_payload_skips_parsing() {
        let payload = ExtractedPayload::from_json(
            r#"{
                "tier": "personality-pack",
                "sampleLines": [],
                "totalCount": 3,
                "genotypeMap": {
                    "rs713598": { "genotype": "cg", "rawLine": null },
                    "rs72921001": { "genotype": "AC" }
                }
            }"#,
        )
        .unwrap();

        let generator = Arc::new(RecordingGenerator::default());
        let report = processor(generator.clone())
            .generate_report("personality-pack", GenotypeSource::Extracted(payload))
            .await
            .unwrap();

        assert_eq!(report.meta.total_count, 3);
        assert_eq!(report.meta.panels_used, vec!["quirks", "dopamine"]);
        let requests = generator.requests.lock().unwrap();
        assert!(requests[0].system_context.contains("): CG"));
    }
}
