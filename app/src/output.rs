// ==============================================================================
// output.rs - Report Output Formats
// ==============================================================================
// Description: Render finished reports as Markdown, JSON or plain text
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::models::{Report, ReportMeta, SectionResult};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown document (the report as generated)
    #[default]
    Markdown,
    /// Full report structure plus the assembled document
    Json,
    /// Document with Markdown heading markers removed
    Text,
}

impl OutputFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }

    /// Get MIME type for HTTP downloads
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown; charset=utf-8",
            OutputFormat::Json => "application/json",
            OutputFormat::Text => "text/plain; charset=utf-8",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// JSON shape of a finished report
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportOutput {
    pub title: String,
    pub sections: Vec<SectionResult>,
    pub meta: ReportMeta,
    pub document: String,
}

impl From<&Report> for ReportOutput {
    fn from(report: &Report) -> Self {
        Self {
            title: report.title.clone(),
            sections: report.sections.clone(),
            meta: report.meta.clone(),
            document: report.document(),
        }
    }
}

/// Render a report in the requested format
pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(format!("# {}", report.document())),
        OutputFormat::Json => serde_json::to_string_pretty(&ReportOutput::from(report))
            .context("Failed to serialize report to JSON"),
        OutputFormat::Text => Ok(strip_heading_markers(&report.document())),
    }
}

/// Write a rendered report to `path`, returning the path written
pub fn write_report(report: &Report, format: OutputFormat, path: &Path) -> Result<PathBuf> {
    let rendered = render(report, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file {:?}", path))?;
    file.write_all(rendered.as_bytes())
        .context("Failed to write report")?;
    file.write_all(b"\n").context("Failed to write report")?;

    info!(
        "Report written: {:?} ({}, {} bytes)",
        path,
        format.mime_type(),
        rendered.len() + 1
    );
    Ok(path.to_path_buf())
}

fn strip_heading_markers(document: &str) -> String {
    document
        .lines()
        .map(|line| {
            let trimmed = line.trim_start_matches('#');
            if trimmed.len() != line.len() && (trimmed.is_empty() || trimmed.starts_with(' ')) {
                trimmed.trim_start()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
