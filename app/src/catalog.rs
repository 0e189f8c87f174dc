// ==============================================================================
// catalog.rs - Marker Catalog
// ==============================================================================
// Description: Closed set of supported markers and their display labels
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

/// (rsID, display label) for every marker any panel may render
const MARKERS: &[(&str, &str)] = &[
    // Methylation & detox
    ("rs1801133", "MTHFR C677T"),
    ("rs1801131", "MTHFR A1298C"),
    ("rs4680", "COMT Val158Met"),
    ("rs602662", "FUT2 B12 absorption"),
    // Nutrition & weight
    ("rs9939609", "FTO appetite"),
    ("rs7903146", "TCF7L2 blood sugar"),
    ("rs4988235", "MCM6/LCT lactase persistence"),
    ("rs2282679", "GC vitamin D binding"),
    ("rs4994", "ADRB3 fat metabolism"),
    // Fitness & training
    ("rs1815739", "ACTN3 R577X"),
    ("rs1042713", "ADRB2 Arg16Gly"),
    ("rs8192678", "PPARGC1A Gly482Ser"),
    ("rs1544410", "VDR BsmI"),
    // Sleep & rhythm
    ("rs1801260", "CLOCK 3111T/C"),
    ("rs5751876", "ADORA2A caffeine sensitivity"),
    // Caffeine
    ("rs762551", "CYP1A2 caffeine metabolism"),
    // Dopamine & mood
    ("rs6323", "MAOA R297R"),
    ("rs1800497", "ANKK1/DRD2 Taq1A"),
    ("rs6265", "BDNF Val66Met"),
    ("rs53576", "OXTR social bonding"),
    ("rs1799971", "OPRM1 A118G"),
    // Recovery & inflammation
    ("rs1800795", "IL6 -174G/C"),
    ("rs16944", "IL1B -511C/T"),
    ("rs2243250", "IL4 -590C/T"),
    // Longevity
    ("rs2802292", "FOXO3 longevity"),
    // Quirky traits
    ("rs713598", "TAS2R38 bitter taste"),
    ("rs72921001", "OR6A2 cilantro aversion"),
    ("rs17822931", "ABCC11 earwax type"),
];

/// Static marker id to display label lookup
#[derive(Debug)]
pub struct MarkerCatalog {
    labels: HashMap<&'static str, &'static str>,
}

impl MarkerCatalog {
    fn build() -> Self {
        Self {
            labels: MARKERS.iter().copied().collect(),
        }
    }

    /// Process-wide catalog, built on first use and never mutated
    pub fn global() -> &'static MarkerCatalog {
        static CATALOG: OnceLock<MarkerCatalog> = OnceLock::new();
        CATALOG.get_or_init(MarkerCatalog::build)
    }

    /// Display label, or the raw id when the marker is not in the catalog
    pub fn label<'a>(&self, marker_id: &'a str) -> &'a str {
        self.labels.get(marker_id).copied().unwrap_or(marker_id)
    }

    pub fn contains(&self, marker_id: &str) -> bool {
        self.labels.contains_key(marker_id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
