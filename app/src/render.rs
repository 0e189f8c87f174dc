// ==============================================================================
// render.rs - Panel Renderer
// ==============================================================================
// Description: Deterministic text blocks for panels and tier grounding text
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Block layout:
//   ### Methylation & Detox
//   Focus: Folate processing, methyl donor needs and detox tendencies
//   rs1801133 (MTHFR C677T): AG
//   rs1801131 (MTHFR A1298C): not found in this file
// ==============================================================================

use std::collections::HashMap;
use tracing::debug;

use crate::catalog::MarkerCatalog;
use crate::models::GenotypeRecord;
use crate::panels::{PanelDefinition, PanelRegistry};

/// Sentinel rendered for markers absent from the genotype map
pub const NOT_FOUND: &str = "not found in this file";

/// Grounding text used when a tier selects no panels
pub const NO_PANELS: &str = "(No marker panels are included in this tier.)";

/// Render one panel against a genotype map
///
/// One line per cataloged marker in panel order. Markers outside the catalog
/// are never rendered.
pub fn render_panel(
    panel: &PanelDefinition,
    genotypes: &HashMap<String, GenotypeRecord>,
    catalog: &MarkerCatalog,
) -> String {
    let mut lines = Vec::with_capacity(panel.marker_ids.len() + 2);
    lines.push(format!("### {}", panel.title));
    lines.push(format!("Focus: {}", panel.focus_description));

    for marker_id in panel.marker_ids {
        if !catalog.contains(marker_id) {
            debug!("Skipping uncataloged marker {} in panel {}", marker_id, panel.id);
            continue;
        }

        let value = genotypes
            .get(*marker_id)
            .map(|r| r.genotype.as_str())
            .unwrap_or(NOT_FOUND);
        lines.push(format!("{} ({}): {}", marker_id, catalog.label(marker_id), value));
    }

    lines.join("\n")
}

/// Grounding text for an ordered list of panel ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grounding {
    pub text: String,
    /// Panel ids actually rendered, in tier order
    pub panels_used: Vec<String>,
    /// Panel marker lines that carried a genotype
    pub markers_found: usize,
}

/// Render every panel of a tier, separated by a blank line
///
/// Unknown panel ids are skipped. An empty panel list yields [`NO_PANELS`].
pub fn render_grounding(
    panel_ids: &[&str],
    genotypes: &HashMap<String, GenotypeRecord>,
    registry: &PanelRegistry,
    catalog: &MarkerCatalog,
) -> Grounding {
    let mut blocks = Vec::with_capacity(panel_ids.len());
    let mut panels_used = Vec::with_capacity(panel_ids.len());
    let mut markers_found = 0;

    for panel_id in panel_ids {
        let Some(panel) = registry.panel(panel_id) else {
            debug!("Skipping unknown panel {}", panel_id);
            continue;
        };

        markers_found += panel
            .marker_ids
            .iter()
            .filter(|id| catalog.contains(id) && genotypes.contains_key(**id))
            .count();
        blocks.push(render_panel(panel, genotypes, catalog));
        panels_used.push(panel.id.to_string());
    }

    let text = if blocks.is_empty() {
        NO_PANELS.to_string()
    } else {
        blocks.join("\n\n")
    };

    Grounding {
        text,
        panels_used,
        markers_found,
    }
}
