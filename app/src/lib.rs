// ==============================================================================
// lib.rs - GeneGenie Report Library
// ==============================================================================
// Description: Genotype parsing, panel grounding and sectioned report generation
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod parsers;
pub mod catalog;
pub mod panels;
pub mod tiers;
pub mod render;
pub mod llm;
pub mod orchestrator;
pub mod assembler;
pub mod processor;
pub mod models;
pub mod validator;
pub mod audit;
pub mod secure_delete;
pub mod output;
pub mod config;

pub use processor::{GenotypeSource, ReportError, ReportProcessor};
