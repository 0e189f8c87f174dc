// ==============================================================================
// extracted.rs - Pre-Extracted Genotype Payload
// ==============================================================================
// Description: Front-end extracted payload that bypasses raw file parsing
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Format (JSON):
//   {
//     "tier": "wellness-core",
//     "sampleLines": ["rs1801133\t1\t11856378\tAG"],
//     "totalCount": 1,
//     "genotypeMap": { "rs1801133": { "genotype": "AG", "rawLine": "..." } }
//   }
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use super::consumer_export::{normalize_genotype, normalize_marker_id, ParsedGenome};
use crate::models::GenotypeRecord;

/// Genotype entry as sent by the extraction step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedGenotype {
    pub genotype: String,
    #[serde(default)]
    pub raw_line: Option<String>,
}

impl Drop for ExtractedGenotype {
    fn drop(&mut self) {
        self.genotype.zeroize();
        self.raw_line.zeroize();
    }
}

/// Pre-extracted payload shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPayload {
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub sample_lines: Vec<String>,
    pub total_count: usize,
    pub genotype_map: BTreeMap<String, ExtractedGenotype>,
}

/// Reasons an extracted payload is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Malformed payload JSON: {0}")]
    Malformed(String),

    #[error("Empty marker id in genotypeMap")]
    EmptyMarkerId,

    #[error("Marker {0} appears more than once in genotypeMap")]
    DuplicateMarkerId(String),

    #[error("Invalid genotype '{genotype}' for marker {marker_id}")]
    InvalidGenotype { marker_id: String, genotype: String },

    #[error("totalCount {total_count} is smaller than the {entries} genotypeMap entries")]
    CountMismatch { total_count: usize, entries: usize },

    #[error("Payload contains no genotype data")]
    Empty,
}

impl ExtractedPayload {
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        serde_json::from_str(json).map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// Validate and convert into the same shape the raw parser produces
    pub fn into_parsed(self, sample_limit: usize) -> Result<ParsedGenome, PayloadError> {
        if self.total_count == 0 || self.genotype_map.is_empty() {
            return Err(PayloadError::Empty);
        }

        if self.total_count < self.genotype_map.len() {
            return Err(PayloadError::CountMismatch {
                total_count: self.total_count,
                entries: self.genotype_map.len(),
            });
        }

        let mut sample_lines = Zeroizing::new(self.sample_lines);
        sample_lines.truncate(sample_limit);

        let mut genotypes = HashMap::with_capacity(self.genotype_map.len());
        for (raw_id, entry) in self.genotype_map {
            let marker_id = normalize_marker_id(&raw_id);
            if marker_id.is_empty() {
                return Err(PayloadError::EmptyMarkerId);
            }

            let genotype = normalize_genotype(&entry.genotype).ok_or_else(|| {
                PayloadError::InvalidGenotype {
                    marker_id: marker_id.clone(),
                    genotype: entry.genotype.clone(),
                }
            })?;

            // Raw text is retained only when it is part of the kept sample
            let raw_line = entry
                .raw_line
                .as_ref()
                .filter(|line| sample_lines.contains(*line))
                .cloned();

            // Marker ids must stay distinct after normalization
            match genotypes.entry(marker_id.clone()) {
                Entry::Occupied(_) => return Err(PayloadError::DuplicateMarkerId(marker_id)),
                Entry::Vacant(slot) => {
                    slot.insert(GenotypeRecord {
                        marker_id,
                        genotype,
                        raw_line,
                    });
                }
            }
        }

        Ok(ParsedGenome {
            total_count: self.total_count,
            genotypes,
            sample_lines,
        })
    }
}
