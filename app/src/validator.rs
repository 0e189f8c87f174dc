// ==============================================================================
// validator.rs - Raw Input Validation
// ==============================================================================
// Description: Size limits, gzip detection and fingerprinting of raw uploads
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// Security: Decoded genetic text lives only in zeroizing buffers
// ==============================================================================

use chrono::{DateTime, Utc};
use flate2::read::MultiGzDecoder;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::DEFAULT_MAX_INPUT_BYTES;

/// Leading bytes of every gzip member
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No genotype file was supplied")]
    Empty,

    #[error("Input too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to decompress gzip input: {0}")]
    Decompression(String),

    #[error("Failed to read input file: {0}")]
    Io(String),
}

/// Raw input that passed validation, decoded to text
pub struct ValidatedInput {
    pub text: Zeroizing<String>,
    /// Size of the bytes as received
    pub size: usize,
    pub compressed: bool,
    pub hash_sha256: String,
    pub validated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ValidatedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedInput")
            .field("text", &format_args!("<{} chars>", self.text.len()))
            .field("size", &self.size)
            .field("compressed", &self.compressed)
            .field("hash_sha256", &self.hash_sha256)
            .field("validated_at", &self.validated_at)
            .finish()
    }
}

pub struct InputValidator {
    max_input_bytes: usize,
}

impl InputValidator {
    pub fn new(max_input_bytes: usize) -> Self {
        Self { max_input_bytes }
    }

    pub fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
    }

    /// Validate raw upload bytes and decode them to text
    pub fn validate(&self, raw: &[u8]) -> Result<ValidatedInput, ValidationError> {
        // 1. Presence
        if raw.is_empty() {
            return Err(ValidationError::Empty);
        }

        // 2. Size check on the bytes as received
        self.check_size(raw.len())?;
        debug!("Size check passed: {} bytes", raw.len());

        // 3. Fingerprint before any decoding
        let hash = compute_sha256(raw);
        debug!("SHA-256: {}", hash);

        // 4. Transparent gzip
        let compressed = is_gzip(raw);
        let text = if compressed {
            let decoded = self.decompress(raw)?;
            debug!("Decompressed gzip input to {} bytes", decoded.len());
            Zeroizing::new(String::from_utf8_lossy(&decoded).into_owned())
        } else {
            Zeroizing::new(String::from_utf8_lossy(raw).into_owned())
        };

        if text.trim().is_empty() {
            return Err(ValidationError::Empty);
        }

        info!(
            size = raw.len(),
            compressed,
            sha256 = %hash,
            "Input validated"
        );

        Ok(ValidatedInput {
            text,
            size: raw.len(),
            compressed,
            hash_sha256: hash,
            validated_at: Utc::now(),
        })
    }

    /// Read and validate a file, checking its size before loading it
    pub fn validate_file(&self, path: &Path) -> Result<ValidatedInput, ValidationError> {
        let metadata = std::fs::metadata(path).map_err(|e| ValidationError::Io(e.to_string()))?;
        self.check_size(metadata.len() as usize)?;

        let raw = Zeroizing::new(std::fs::read(path).map_err(|e| ValidationError::Io(e.to_string()))?);
        self.validate(&raw)
    }

    fn check_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_input_bytes {
            return Err(ValidationError::TooLarge {
                size,
                max: self.max_input_bytes,
            });
        }
        Ok(())
    }

    fn decompress(&self, raw: &[u8]) -> Result<Zeroizing<Vec<u8>>, ValidationError> {
        let mut decoded = Zeroizing::new(Vec::new());
        // Read one byte past the limit so oversize output is detectable
        let limit = self.max_input_bytes as u64 + 1;

        MultiGzDecoder::new(raw)
            .take(limit)
            .read_to_end(&mut decoded)
            .map_err(|e| ValidationError::Decompression(e.to_string()))?;

        self.check_size(decoded.len())?;
        Ok(decoded)
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_BYTES)
    }
}

pub fn is_gzip(raw: &[u8]) -> bool {
    raw.starts_with(&GZIP_MAGIC)
}

pub fn compute_sha256(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
