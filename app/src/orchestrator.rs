// ==============================================================================
// orchestrator.rs - Section Orchestrator
// ==============================================================================
// Description: Drives one or many generation calls with per-section isolation
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// State machine over the ordered sections of a plan:
//   PENDING -> IN_PROGRESS(0)
//   IN_PROGRESS(i) -> SECTION_DONE(i, ok|fallback)      (always)
//   SECTION_DONE(i, _) -> IN_PROGRESS(i+1) | ALL_DONE
//
// A failed call is replaced by deterministic fallback text. The number and
// order of sections is fixed by the plan, never by generation outcomes.
// ==============================================================================

use futures::stream::{self, StreamExt};
use tracing::{debug, info, trace, warn};
use zeroize::Zeroizing;

use crate::llm::{GenerationError, GenerationRequest, TextGenerator};
use crate::models::{GenerationMode, SectionResult, SectionStatus};
use crate::tiers::TierPlan;

/// Persona shared by every generation call
pub const PERSONA: &str = "You are \"GeneGenie\", a playful but smart DNA wellness interpreter. \
Everything you write is for entertainment and education only and is not medical advice, \
diagnosis or treatment.";

/// Deterministic stand-in for a section whose generation call failed
pub fn fallback_text(heading: &str) -> String {
    format!(
        "{}: this section could not be generated right now. The rest of your report is unaffected, \
and you can request a fresh copy later.",
        heading
    )
}

/// Orchestration progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Pending,
    InProgress(usize),
    SectionDone(usize, SectionStatus),
    AllDone,
}

impl OrchestratorState {
    /// Move to the next section, or finish after the last one
    ///
    /// `InProgress` only leaves through [`OrchestratorState::resolve`].
    pub fn advance(self, total: usize) -> Self {
        match self {
            OrchestratorState::Pending if total == 0 => OrchestratorState::AllDone,
            OrchestratorState::Pending => OrchestratorState::InProgress(0),
            OrchestratorState::SectionDone(i, _) if i + 1 < total => {
                OrchestratorState::InProgress(i + 1)
            }
            OrchestratorState::SectionDone(..) => OrchestratorState::AllDone,
            other => other,
        }
    }

    /// Record the outcome of the section in progress
    pub fn resolve(self, status: SectionStatus) -> Self {
        match self {
            OrchestratorState::InProgress(i) => OrchestratorState::SectionDone(i, status),
            other => other,
        }
    }
}

/// Read-only per-request context shared by every section call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingContext {
    /// Rendered panel blocks for the tier
    pub grounding_text: String,
    /// Bounded prefix of accepted data lines, wiped on drop
    pub sample_lines: Zeroizing<Vec<String>>,
    /// Accepted data lines in the whole input
    pub total_count: usize,
}

/// One planned generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionJob {
    pub index: usize,
    pub heading: String,
    pub request: GenerationRequest,
}

/// A section that degraded to fallback text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    pub index: usize,
    pub heading: String,
    pub error: GenerationError,
}

/// Ordered section results plus the causes of any fallbacks
#[derive(Debug, Clone, Default)]
pub struct OrchestrationOutput {
    pub sections: Vec<SectionResult>,
    pub failures: Vec<SectionFailure>,
}

/// Build the ordered list of generation calls for a plan
pub fn plan_jobs(plan: &TierPlan, context: &GroundingContext) -> Vec<SectionJob> {
    match plan.mode {
        GenerationMode::SingleShot => vec![SectionJob {
            index: 0,
            heading: plan.display_name.to_string(),
            request: GenerationRequest {
                system_context: system_context(plan, context, true),
                user_instructions: plan.instructions.to_string(),
                output_budget: plan.output_budget,
                label: plan.display_name.to_string(),
            },
        }],
        GenerationMode::MultiSection => {
            let shared = system_context(plan, context, false);
            plan.section_specs
                .iter()
                .enumerate()
                .map(|(index, spec)| SectionJob {
                    index,
                    heading: spec.heading.to_string(),
                    request: GenerationRequest {
                        system_context: shared.clone(),
                        user_instructions: section_instructions(plan, index),
                        output_budget: plan.output_budget,
                        label: spec.heading.to_string(),
                    },
                })
                .collect()
        }
    }
}

fn system_context(plan: &TierPlan, context: &GroundingContext, include_sample: bool) -> String {
    let mut text = format!(
        "{}\n\nPackage: {}\nAbout this package: {}\n\n\
Genotype panels (use only these values; never invent a genotype for a marker marked not found):\n{}",
        PERSONA, plan.display_name, plan.description, context.grounding_text
    );

    if include_sample {
        text.push_str(&format!(
            "\n\nSample raw lines from the file ({} of {} data lines):\n-------------------\n{}\n-------------------",
            context.sample_lines.len(),
            context.total_count,
            context.sample_lines.join("\n")
        ));
    }

    text
}

/// Instructions scoping one call to exactly one section
pub fn section_instructions(plan: &TierPlan, index: usize) -> String {
    let spec = &plan.section_specs[index];
    let others: Vec<&str> = plan
        .section_specs
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, s)| s.heading)
        .collect();

    format!(
        "Write only the \"{heading}\" section of the {name} report.\n\
Open with the heading line \"## {heading}\" exactly as written.\n\
Do not repeat content that belongs to the other sections ({others}).\n\
Section instructions: {instructions}",
        heading = spec.heading,
        name = plan.display_name,
        others = others.join("; "),
        instructions = spec.instructions,
    )
}

/// Runs generation calls for a plan, absorbing per-call failures
pub struct SectionOrchestrator<'a> {
    generator: &'a dyn TextGenerator,
    concurrency: usize,
}

impl<'a> SectionOrchestrator<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self {
            generator,
            concurrency: 1,
        }
    }

    /// Calls in flight at once; values above 1 issue calls concurrently
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Generate every section of the plan
    ///
    /// Always returns exactly `plan.call_count()` sections in plan order.
    /// Dropping the returned future abandons the whole report.
    pub async fn run(&self, plan: &TierPlan, context: &GroundingContext) -> OrchestrationOutput {
        let jobs = plan_jobs(plan, context);
        info!(
            "Orchestrating {} generation call(s) for tier {} ({}, concurrency {})",
            jobs.len(),
            plan.tier_id,
            plan.mode.as_str(),
            self.concurrency
        );

        let outcomes = if self.concurrency > 1 && jobs.len() > 1 {
            self.run_concurrent(&jobs).await
        } else {
            self.run_sequential(&jobs).await
        };

        let mut output = OrchestrationOutput::default();
        for (job, (result, failure)) in jobs.iter().zip(outcomes) {
            if let Some(error) = failure {
                output.failures.push(SectionFailure {
                    index: job.index,
                    heading: job.heading.clone(),
                    error,
                });
            }
            output.sections.push(result);
        }

        output
    }

    async fn run_sequential(
        &self,
        jobs: &[SectionJob],
    ) -> Vec<(SectionResult, Option<GenerationError>)> {
        let total = jobs.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut state = OrchestratorState::Pending.advance(total);

        while let OrchestratorState::InProgress(i) = state {
            let outcome = self.run_section(&jobs[i]).await;
            state = state.resolve(outcome.0.status);
            trace!(?state, "Section resolved");
            outcomes.push(outcome);
            state = state.advance(total);
        }

        debug_assert_eq!(state, OrchestratorState::AllDone);
        outcomes
    }

    async fn run_concurrent(
        &self,
        jobs: &[SectionJob],
    ) -> Vec<(SectionResult, Option<GenerationError>)> {
        let mut slots: Vec<Option<(SectionResult, Option<GenerationError>)>> =
            vec![None; jobs.len()];

        let mut completions = stream::iter(jobs.iter().enumerate())
            .map(|(i, job)| async move { (i, self.run_section(job).await) })
            .buffer_unordered(self.concurrency);

        // Slot by index; completion order is irrelevant
        while let Some((i, outcome)) = completions.next().await {
            trace!(index = i, status = outcome.0.status.as_str(), "Section resolved");
            slots[i] = Some(outcome);
        }

        slots
            .into_iter()
            .zip(jobs)
            .map(|(slot, job)| {
                slot.unwrap_or_else(|| {
                    let error = GenerationError::Transport("section call never resolved".to_string());
                    (SectionResult::fallback(&job.heading, fallback_text(&job.heading)), Some(error))
                })
            })
            .collect()
    }

    async fn run_section(&self, job: &SectionJob) -> (SectionResult, Option<GenerationError>) {
        debug!(index = job.index, heading = %job.heading, "Generating section");

        let error = match self.generator.generate(&job.request).await {
            Ok(text) if !text.trim().is_empty() => {
                return (SectionResult::ok(&job.heading, text.trim()), None);
            }
            Ok(_) => GenerationError::EmptyOutput,
            Err(err) => err,
        };

        warn!(
            index = job.index,
            heading = %job.heading,
            kind = error.kind(),
            error = %error,
            generator = self.generator.name(),
            "Section generation failed, using fallback text"
        );

        (
            SectionResult::fallback(&job.heading, fallback_text(&job.heading)),
            Some(error),
        )
    }
}
