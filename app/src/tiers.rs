// ==============================================================================
// tiers.rs - Tier Configuration
// ==============================================================================
// Description: Purchased tier to panel list, generation mode and section plan
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Unknown tier strings resolve to the default (lowest) tier. Resolution never
// fails.
// ==============================================================================

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::GenerationMode;

/// Tier every unrecognized identifier resolves to
pub const DEFAULT_TIER_ID: &str = "tease";

/// One independently generated subdivision of a multi-section report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSpec {
    pub heading: &'static str,
    pub instructions: &'static str,
}

/// Immutable plan for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierPlan {
    pub tier_id: &'static str,
    pub display_name: &'static str,
    /// Fixed title of the assembled report
    pub report_title: &'static str,
    /// Shared with every generation call of this tier
    pub description: &'static str,
    pub panel_ids: &'static [&'static str],
    pub mode: GenerationMode,
    /// Tier-level instructions used in single-shot mode
    pub instructions: &'static str,
    /// Ordered sections, only populated in multi-section mode
    pub section_specs: &'static [SectionSpec],
    /// Output token budget for each generation call
    pub output_budget: u32,
}

impl TierPlan {
    /// Number of generation calls this plan issues
    pub fn call_count(&self) -> usize {
        match self.mode {
            GenerationMode::SingleShot => 1,
            GenerationMode::MultiSection => self.section_specs.len(),
        }
    }
}

const CORE_PANELS: &[&str] = &["methylation", "nutrition", "fitness", "sleep"];

const BIOHACKER_PANELS: &[&str] = &[
    "methylation",
    "nutrition",
    "fitness",
    "sleep",
    "training",
    "dopamine",
    "caffeine",
    "recovery",
];

const LIFE_PLAN_PANELS: &[&str] = &[
    "methylation",
    "nutrition",
    "fitness",
    "sleep",
    "training",
    "dopamine",
    "caffeine",
    "recovery",
    "longevity",
];

const BIOHACKER_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        heading: "Biohacker Snapshot",
        instructions: "Give a punchy overview of the strongest themes across all panels in 2-3 short paragraphs.",
    },
    SectionSpec {
        heading: "Training Style & Muscle Response",
        instructions: "Interpret the training and fitness panels: power versus endurance leanings, adaptation and practical session ideas.",
    },
    SectionSpec {
        heading: "Dopamine, Focus & Drive",
        instructions: "Interpret the dopamine panel: motivation style, stress response and focus habits worth experimenting with.",
    },
    SectionSpec {
        heading: "Caffeine & Sleep Interaction",
        instructions: "Interpret the caffeine and sleep panels together: caffeine timing, cut-off suggestions and wind-down ideas.",
    },
    SectionSpec {
        heading: "Recovery & Inflammation",
        instructions: "Interpret the recovery panel: recovery pacing, anti-inflammatory habits and deload suggestions.",
    },
    SectionSpec {
        heading: "90-Day Biohacker Game Plan",
        instructions: "Lay out a 90-day plan in three 30-day blocks with 3-4 concrete experiments each, tied back to the panels.",
    },
];

const LIFE_PLAN_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        heading: "Big Picture Snapshot",
        instructions: "Summarize the overall genetic wellness picture in 2-3 warm, plain-language paragraphs.",
    },
    SectionSpec {
        heading: "Trait Summary Table",
        instructions: "Produce a markdown table with columns Trait, Marker, Your Genotype, Tendency covering every panel marker that was found.",
    },
    SectionSpec {
        heading: "Methylation & Detox Deep Dive",
        instructions: "Interpret the methylation panel in depth: folate, B vitamins and everyday detox-supporting habits.",
    },
    SectionSpec {
        heading: "Nutrition & Weight Deep Dive",
        instructions: "Interpret the nutrition panel in depth: appetite, carbohydrates, dairy and vitamin D.",
    },
    SectionSpec {
        heading: "Training & Recovery Deep Dive",
        instructions: "Interpret the fitness, training and recovery panels together with a weekly movement template.",
    },
    SectionSpec {
        heading: "Sleep, Caffeine & Rhythm",
        instructions: "Interpret the sleep and caffeine panels: ideal wake and wind-down windows and caffeine timing.",
    },
    SectionSpec {
        heading: "Dopamine, Focus & Mood",
        instructions: "Interpret the dopamine panel: motivation, stress handling and mood-supporting routines.",
    },
    SectionSpec {
        heading: "Your 90-Day Life Plan",
        instructions: "Write a structured 90-day plan in three phases (Foundations, Build, Optimize) with daily and weekly habits.",
    },
    SectionSpec {
        heading: "Long-Term Check-ins & Gentle Cautions",
        instructions: "Suggest quarterly check-in questions, signs worth discussing with a professional, and gentle cautions.",
    },
];

const TIERS: &[TierPlan] = &[
    TierPlan {
        tier_id: DEFAULT_TIER_ID,
        display_name: "DNA Tease",
        report_title: "Your GeneGenie DNA Tease",
        description: "Free teaser: a fun, social-friendly mini report from a tiny slice of the file.",
        panel_ids: &[],
        mode: GenerationMode::SingleShot,
        instructions: "Give a short, fun Summary paragraph (1-2 sentences). Then list the genotypes you see in the sample lines. \
Then give a playful, non-clinical interpretation under \"What this might mean (playful)\". \
Make it clear this is not medical advice and is based on a tiny teaser sample.",
        section_specs: &[],
        output_budget: 600,
    },
    TierPlan {
        tier_id: "wellness-core",
        display_name: "Wellness Core",
        report_title: "Your GeneGenie Wellness Core Report",
        description: "A friendly, mid-depth wellness blueprint using the core methylation, nutrition, fitness and sleep panels.",
        panel_ids: CORE_PANELS,
        mode: GenerationMode::SingleShot,
        instructions: "Write one section per panel, in panel order, each with a short heading, what the genotypes suggest, \
and 2-3 practical lifestyle ideas. Finish with basic supplement-style suggestions framed as questions to ask a professional.",
        section_specs: &[],
        output_budget: 2500,
    },
    TierPlan {
        tier_id: "biohacker-pack",
        display_name: "Biohacker Pack",
        report_title: "Your GeneGenie Biohacker Report",
        description: "Deeper performance, dopamine, caffeine and recovery insights for people who love tweaking routines.",
        panel_ids: BIOHACKER_PANELS,
        mode: GenerationMode::MultiSection,
        instructions: "",
        section_specs: BIOHACKER_SECTIONS,
        output_budget: 1200,
    },
    TierPlan {
        tier_id: "life-plan",
        display_name: "GeneGenie Life Plan",
        report_title: "Your GeneGenie Life Plan",
        description: "Full life blueprint: every core and biohacker panel plus longevity, with a structured 90-day plan.",
        panel_ids: LIFE_PLAN_PANELS,
        mode: GenerationMode::MultiSection,
        instructions: "",
        section_specs: LIFE_PLAN_SECTIONS,
        output_budget: 1400,
    },
    TierPlan {
        tier_id: "personality-pack",
        display_name: "Personality Pack",
        report_title: "Your GeneGenie Personality Pack",
        description: "Share-ready quirky trait profile built from taste, smell, social and drive markers.",
        panel_ids: &["quirks", "dopamine"],
        mode: GenerationMode::SingleShot,
        instructions: "Write a playful personality profile: one short card per marker with a catchy trait name, \
the genotype, and a one-line share-ready caption. Keep it light and non-clinical.",
        section_specs: &[],
        output_budget: 1800,
    },
    TierPlan {
        tier_id: "parent-decoder",
        display_name: "Parent Decoder",
        report_title: "Your GeneGenie Parent Decoder",
        description: "Gentle, non-diagnostic insights into a child's temperament, nutrition needs and sleep.",
        panel_ids: &["temperament", "kid-nutrition", "sleep"],
        mode: GenerationMode::SingleShot,
        instructions: "Write for a parent about their child. Cover temperament and learning style, nutrition needs and sleep, \
each with gene-informed parenting strategies. Never diagnose; avoid labels and remind the reader to consult a pediatrician.",
        section_specs: &[],
        output_budget: 2200,
    },
];

/// Static tier id to plan lookup
#[derive(Debug)]
pub struct TierConfiguration {
    plans: HashMap<&'static str, &'static TierPlan>,
    default_plan: &'static TierPlan,
}

impl TierConfiguration {
    fn build() -> Self {
        let plans: HashMap<&'static str, &'static TierPlan> =
            TIERS.iter().map(|t| (t.tier_id, t)).collect();
        let default_plan = TIERS
            .iter()
            .find(|t| t.tier_id == DEFAULT_TIER_ID)
            .unwrap_or(&TIERS[0]);

        Self { plans, default_plan }
    }

    /// Process-wide tier table, built on first use and never mutated
    pub fn global() -> &'static TierConfiguration {
        static TIER_TABLE: OnceLock<TierConfiguration> = OnceLock::new();
        TIER_TABLE.get_or_init(TierConfiguration::build)
    }

    /// Exact lookup after normalization, `None` when unrecognized
    pub fn lookup(&self, tier_id: &str) -> Option<&'static TierPlan> {
        self.plans.get(normalize_tier_id(tier_id).as_str()).copied()
    }

    /// Resolve any tier string to a plan, falling back to the default tier
    pub fn resolve(&self, tier_id: &str) -> &'static TierPlan {
        self.lookup(tier_id).unwrap_or(self.default_plan)
    }

    pub fn default_plan(&self) -> &'static TierPlan {
        self.default_plan
    }

    /// All plans in declaration order
    pub fn all(&self) -> &'static [TierPlan] {
        TIERS
    }
}

/// Trim, lower-case and accept '_' for '-'
fn normalize_tier_id(tier_id: &str) -> String {
    tier_id.trim().to_lowercase().replace('_', "-")
}
