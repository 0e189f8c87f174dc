// ==============================================================================
// parsers/mod.rs - Genotype input parsers
// ==============================================================================
// Description: Raw export parser and pre-extracted payload handling
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod consumer_export;
pub mod extracted;

pub use consumer_export::{
    normalize_genotype, ConsumerExportParser, GenotypeParseError, GenotypePolicy, ParsedGenome,
    DEFAULT_SAMPLE_LINES,
};
pub use extracted::{ExtractedGenotype, ExtractedPayload, PayloadError};
