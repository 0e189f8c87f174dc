// ==============================================================================
// panels.rs - Panel Registry
// ==============================================================================
// Description: Named, ordered marker panels grouped by wellness focus
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Markers may appear in more than one panel (e.g., COMT in methylation and
// dopamine). Each panel is rendered independently.
// ==============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

/// Immutable panel definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelDefinition {
    pub id: &'static str,
    pub title: &'static str,
    /// Marker ids in render order
    pub marker_ids: &'static [&'static str],
    pub focus_description: &'static str,
}

const PANELS: &[PanelDefinition] = &[
    PanelDefinition {
        id: "methylation",
        title: "Methylation & Detox",
        marker_ids: &["rs1801133", "rs1801131", "rs4680", "rs602662"],
        focus_description: "Folate processing, methyl donor needs and detox tendencies",
    },
    PanelDefinition {
        id: "nutrition",
        title: "Nutrition & Weight",
        marker_ids: &["rs9939609", "rs7903146", "rs4988235", "rs2282679", "rs4994"],
        focus_description: "Appetite, carbohydrate handling, lactose and vitamin D tendencies",
    },
    PanelDefinition {
        id: "fitness",
        title: "Fitness & Movement",
        marker_ids: &["rs1815739", "rs1042713", "rs8192678"],
        focus_description: "Power versus endurance leanings and everyday movement style",
    },
    PanelDefinition {
        id: "sleep",
        title: "Sleep & Rhythm",
        marker_ids: &["rs1801260", "rs5751876"],
        focus_description: "Chronotype hints and how easily sleep is disturbed",
    },
    PanelDefinition {
        id: "training",
        title: "Training Style & Muscle Response",
        marker_ids: &["rs1815739", "rs8192678", "rs1042713", "rs1544410"],
        focus_description: "Muscle fiber leanings, training adaptation and bone support",
    },
    PanelDefinition {
        id: "dopamine",
        title: "Dopamine, Focus & Drive",
        marker_ids: &["rs4680", "rs6323", "rs1800497", "rs6265"],
        focus_description: "Motivation, stress resilience and reward seeking",
    },
    PanelDefinition {
        id: "caffeine",
        title: "Caffeine Metabolism",
        marker_ids: &["rs762551", "rs5751876"],
        focus_description: "How fast caffeine clears and how it interacts with sleep",
    },
    PanelDefinition {
        id: "recovery",
        title: "Recovery & Inflammation",
        marker_ids: &["rs1800795", "rs16944", "rs2243250"],
        focus_description: "Inflammatory signaling and bounce-back after hard sessions",
    },
    PanelDefinition {
        id: "longevity",
        title: "Longevity & Healthy Aging",
        marker_ids: &["rs2802292", "rs1801133", "rs7903146"],
        focus_description: "Long-term habits that pair with aging-related markers",
    },
    PanelDefinition {
        id: "quirks",
        title: "Quirky Traits",
        marker_ids: &["rs713598", "rs72921001", "rs17822931", "rs53576", "rs1799971"],
        focus_description: "Taste, smell and social quirks made for sharing",
    },
    PanelDefinition {
        id: "temperament",
        title: "Temperament & Learning",
        marker_ids: &["rs4680", "rs53576", "rs6265", "rs1800497"],
        focus_description: "Emotional regulation, sensitivity and learning style hints",
    },
    PanelDefinition {
        id: "kid-nutrition",
        title: "Nutrition Needs for Kids",
        marker_ids: &["rs1801133", "rs4988235", "rs602662", "rs2282679"],
        focus_description: "Folate, lactose, B12 and vitamin D considerations for growing kids",
    },
];

/// Static panel id to definition lookup
#[derive(Debug)]
pub struct PanelRegistry {
    panels: HashMap<&'static str, &'static PanelDefinition>,
}

impl PanelRegistry {
    fn build() -> Self {
        Self {
            panels: PANELS.iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// Process-wide registry, built on first use and never mutated
    pub fn global() -> &'static PanelRegistry {
        static REGISTRY: OnceLock<PanelRegistry> = OnceLock::new();
        REGISTRY.get_or_init(PanelRegistry::build)
    }

    pub fn panel(&self, panel_id: &str) -> Option<&'static PanelDefinition> {
        self.panels.get(panel_id).copied()
    }

    /// All panels in declaration order
    pub fn all(&self) -> &'static [PanelDefinition] {
        PANELS
    }
}
