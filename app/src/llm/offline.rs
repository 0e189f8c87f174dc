// ==============================================================================
// llm/offline.rs - Offline Text Generator
// ==============================================================================
// Description: Deterministic, network-free generator for dry runs and demos
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use sha2::{Digest, Sha256};

use super::{GenerationError, GenerationRequest, TextGenerator};

/// Produces a placeholder section derived only from the request
#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let digest = Sha256::digest(
            format!("{}\n{}", request.system_context, request.user_instructions).as_bytes(),
        );
        let fingerprint: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();

        // Panel marker lines look like "rsID (label): genotype"
        let marker_lines = request
            .system_context
            .lines()
            .filter(|l| l.starts_with("rs") && l.contains("): "))
            .count();

        Ok(format!(
            "## {}\n\nOffline preview ({}): this section would be written from {} panel marker lines \
within a {}-token budget. Connect a text generator to produce the full narrative.",
            request.label, fingerprint, marker_lines, request.output_budget
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
