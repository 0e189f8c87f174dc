// ==============================================================================
// models.rs - Report Data Models
// ==============================================================================
// Description: Genotype records, section results and report structures
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

/// A single genotype call extracted from a consumer export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenotypeRecord {
    /// Marker identifier, lower-cased (e.g., "rs1801133")
    pub marker_id: String,

    /// Normalized genotype, upper-case, 1-2 characters (e.g., "AG", "TT", "--")
    pub genotype: String,

    /// Original line, kept only for records in the sample prefix
    pub raw_line: Option<String>,
}

impl Drop for GenotypeRecord {
    fn drop(&mut self) {
        self.genotype.zeroize();
        self.raw_line.zeroize();
    }
}

/// How the narrative body of a tier is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationMode {
    /// One call produces the whole report body
    SingleShot,
    /// One call per configured section, assembled in table order
    MultiSection,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::SingleShot => "singleShot",
            GenerationMode::MultiSection => "multiSection",
        }
    }
}

/// Outcome of a single section's generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Ok,
    Fallback,
}

impl SectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionStatus::Ok => "ok",
            SectionStatus::Fallback => "fallback",
        }
    }
}

/// One generated (or substituted) section of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub heading: String,
    pub text: String,
    pub status: SectionStatus,
}

impl SectionResult {
    pub fn ok(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
            status: SectionStatus::Ok,
        }
    }

    pub fn fallback(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
            status: SectionStatus::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.status == SectionStatus::Fallback
    }
}

/// Request metadata exposed alongside the generated sections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub request_id: Uuid,

    /// Tier string exactly as received
    pub requested_tier: String,

    /// Tier whose plan was actually used
    pub tier: String,

    pub panels_used: Vec<String>,
    pub mode: GenerationMode,
    pub section_count: usize,

    /// Sections that degraded to fallback text
    pub fallback_sections: usize,

    /// Accepted data lines in the input
    pub total_count: usize,

    /// Panel markers present in the genotype map (counted once per panel)
    pub markers_found: usize,

    pub generated_at: DateTime<Utc>,
    pub generator: String,
}

/// Complete generated report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub sections: Vec<SectionResult>,
    pub meta: ReportMeta,
}

impl Report {
    /// Render the report as a single document
    pub fn document(&self) -> String {
        let texts: Vec<&str> = self.sections.iter().map(|s| s.text.as_str()).collect();
        crate::assembler::assemble(&self.title, &texts)
    }

    pub fn fallback_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_fallback()).count()
    }
}
