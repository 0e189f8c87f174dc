// ==============================================================================
// consumer_export.rs - Consumer Genotyping Export Parser
// ==============================================================================
// Description: Parser for raw consumer DNA exports (23andMe, AncestryDNA, CSV)
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format: Tab- or comma-delimited text with optional '#' comment header
// Example:
//   # rsid    chromosome    position    genotype
//   rs1801133    1    11856378    AG
//   rs4680    22    19951271    GG
//   "rs9939609","16","53820527","AT"
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

use crate::models::GenotypeRecord;

/// Number of accepted lines retained as narrative sample by default
pub const DEFAULT_SAMPLE_LINES: usize = 40;

/// Characters a normalized genotype may contain (no-calls are "--" or "00")
const GENOTYPE_ALPHABET: &[char] = &['A', 'C', 'G', 'T', 'D', 'I', '-', '0'];

/// Which field(s) of a data line form the genotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenotypePolicy {
    /// Infer from the field count:
    /// - 5+ fields: fields 3 and 4 concatenated (AncestryDNA allele1/allele2)
    /// - 4 fields: field 3 (23andMe)
    /// - 3 fields: fields 1 and 2 when both are single alleles, else the last field
    /// - 2 fields: the last field
    #[default]
    Auto,
    /// A single fixed column
    Column(usize),
    /// Two fixed columns concatenated
    Pair(usize, usize),
    /// Always the last field
    LastField,
}

impl GenotypePolicy {
    /// Extract the unnormalized genotype text from split fields
    pub fn extract(&self, fields: &[&str]) -> Option<String> {
        match *self {
            GenotypePolicy::Auto => match fields.len() {
                0 | 1 => None,
                2 => fields.last().map(|f| f.to_string()),
                3 => {
                    let paired = is_single_allele(fields[1]) && is_single_allele(fields[2]);
                    if paired {
                        Some(format!("{}{}", fields[1], fields[2]))
                    } else {
                        Some(fields[2].to_string())
                    }
                }
                4 => Some(fields[3].to_string()),
                _ => Some(format!("{}{}", fields[3], fields[4])),
            },
            GenotypePolicy::Column(i) => fields.get(i).map(|f| f.to_string()),
            GenotypePolicy::Pair(i, j) => {
                let first = fields.get(i)?;
                let second = fields.get(j)?;
                Some(format!("{}{}", first, second))
            }
            GenotypePolicy::LastField => fields.last().map(|f| f.to_string()),
        }
    }
}

impl fmt::Display for GenotypePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenotypePolicy::Auto => write!(f, "auto"),
            GenotypePolicy::Column(i) => write!(f, "column:{}", i),
            GenotypePolicy::Pair(i, j) => write!(f, "pair:{},{}", i, j),
            GenotypePolicy::LastField => write!(f, "last"),
        }
    }
}

impl FromStr for GenotypePolicy {
    type Err = String;

    /// Accepts "auto", "last", "column:N" and "pair:N,M"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let parse_index = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| format!("Invalid column index '{}'", v))
        };

        match s.as_str() {
            "auto" => Ok(GenotypePolicy::Auto),
            "last" | "last_field" => Ok(GenotypePolicy::LastField),
            _ => {
                if let Some(rest) = s.strip_prefix("column:") {
                    Ok(GenotypePolicy::Column(parse_index(rest)?))
                } else if let Some(rest) = s.strip_prefix("pair:") {
                    let (a, b) = rest
                        .split_once(',')
                        .ok_or_else(|| format!("Invalid pair policy '{}'", s))?;
                    Ok(GenotypePolicy::Pair(parse_index(a)?, parse_index(b)?))
                } else {
                    Err(format!("Unknown genotype policy '{}'", s))
                }
            }
        }
    }
}

/// Normalize a genotype string: upper-case, strip separators, validate alphabet
///
/// Returns `None` unless the result is 1-2 characters from the genotype alphabet.
pub fn normalize_genotype(raw: &str) -> Option<String> {
    let normalized: String = raw
        .chars()
        .filter(|c| !matches!(c, '/' | '|' | ' ' | '"' | '\''))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let len = normalized.chars().count();
    if !(1..=2).contains(&len) {
        return None;
    }

    if normalized.chars().all(|c| GENOTYPE_ALPHABET.contains(&c)) {
        Some(normalized)
    } else {
        None
    }
}

fn is_single_allele(field: &str) -> bool {
    normalize_genotype(field).is_some_and(|g| g.len() == 1)
}

/// Normalize a marker id for lookup (trimmed, unquoted, lower-case)
pub fn normalize_marker_id(raw: &str) -> String {
    clean_field(raw).to_ascii_lowercase()
}

fn clean_field(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

/// Result of parsing one export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGenome {
    /// Number of accepted data lines (duplicates included)
    pub total_count: usize,

    /// First occurrence of each marker id
    pub genotypes: HashMap<String, GenotypeRecord>,

    /// Bounded prefix of accepted lines for narrative flavor, wiped on drop
    pub sample_lines: Zeroizing<Vec<String>>,
}

impl ParsedGenome {
    pub fn genotype(&self, marker_id: &str) -> Option<&str> {
        self.genotypes.get(marker_id).map(|r| r.genotype.as_str())
    }
}

/// Errors that can occur while parsing an export
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenotypeParseError {
    #[error("No recognizable genotype data found ({lines_seen} lines inspected)")]
    NoRecognizableData { lines_seen: usize },
}

/// Parser for raw consumer genotyping exports
#[derive(Debug, Clone)]
pub struct ConsumerExportParser {
    pub policy: GenotypePolicy,
    pub sample_limit: usize,
}

impl Default for ConsumerExportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsumerExportParser {
    pub fn new() -> Self {
        Self {
            policy: GenotypePolicy::Auto,
            sample_limit: DEFAULT_SAMPLE_LINES,
        }
    }

    pub fn with_policy(mut self, policy: GenotypePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    /// Parse raw export text of any line-ending convention
    ///
    /// Blank lines, '#' comments, lines without a tab or comma, lines with fewer
    /// than two fields and lines whose genotype does not normalize are skipped.
    /// The first occurrence of a marker id wins.
    pub fn parse(&self, text: &str) -> Result<ParsedGenome, GenotypeParseError> {
        let mut parsed = ParsedGenome::default();
        let mut lines_seen = 0;

        for line in text.split(['\n', '\r']) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            lines_seen += 1;

            let Some(mut record) = self.parse_line(line) else {
                continue;
            };

            parsed.total_count += 1;
            // Raw text is retained only for the sample prefix
            if parsed.sample_lines.len() < self.sample_limit {
                parsed.sample_lines.push(line.to_string());
                record.raw_line = Some(line.to_string());
            }

            parsed
                .genotypes
                .entry(record.marker_id.clone())
                .or_insert(record);
        }

        debug!(
            "Parsed export: {} lines inspected, {} accepted, {} distinct markers",
            lines_seen,
            parsed.total_count,
            parsed.genotypes.len()
        );

        if parsed.total_count == 0 {
            return Err(GenotypeParseError::NoRecognizableData { lines_seen });
        }

        Ok(parsed)
    }

    /// Parse a single trimmed, non-empty line
    fn parse_line(&self, line: &str) -> Option<GenotypeRecord> {
        if line.starts_with('#') {
            return None;
        }

        if !line.contains('\t') && !line.contains(',') {
            return None;
        }

        let fields: Vec<&str> = line.split(['\t', ',']).map(clean_field).collect();
        if fields.len() < 2 {
            return None;
        }

        let marker_id = normalize_marker_id(fields[0]);
        if marker_id.is_empty() {
            return None;
        }

        let genotype = normalize_genotype(&self.policy.extract(&fields)?)?;

        Some(GenotypeRecord {
            marker_id,
            genotype,
            raw_line: None,
        })
    }
}
