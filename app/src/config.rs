// ==============================================================================
// config.rs - Pipeline Configuration
// ==============================================================================
// Description: Report pipeline and text generator settings with env overrides
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Environment:
//   OPENAI_API_KEY / OPENAI_API_KEY_FILE    API key (file variant for secrets)
//   OPENAI_BASE_URL                         default https://api.openai.com/v1
//   GENEGENIE_MODEL                         default gpt-5-mini
//   GENEGENIE_REQUEST_TIMEOUT_SECS          default 60
//   GENEGENIE_MAX_RETRIES                   default 2
//   GENEGENIE_SECTION_CONCURRENCY           default 1 (sequential)
//   GENEGENIE_SAMPLE_LINES                  default 40
//   GENEGENIE_MAX_INPUT_BYTES               default 52428800 (50 MiB)
//   GENEGENIE_GENOTYPE_POLICY               default auto
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::parsers::{GenotypePolicy, DEFAULT_SAMPLE_LINES};

pub const DEFAULT_MAX_INPUT_BYTES: usize = 50 * 1024 * 1024;
pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to read {key} file {path}: {source}")]
    SecretFile {
        key: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Settings for the report pipeline itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Accepted lines kept as narrative sample
    pub sample_lines: usize,
    /// Upper bound for raw and decompressed input size
    pub max_input_bytes: usize,
    pub genotype_policy: GenotypePolicy,
    /// Section calls in flight at once; 1 issues them sequentially
    pub section_concurrency: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sample_lines: DEFAULT_SAMPLE_LINES,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            genotype_policy: GenotypePolicy::Auto,
            section_concurrency: 1,
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            sample_lines: env_parse("GENEGENIE_SAMPLE_LINES")?.unwrap_or(defaults.sample_lines),
            max_input_bytes: env_parse("GENEGENIE_MAX_INPUT_BYTES")?
                .unwrap_or(defaults.max_input_bytes),
            genotype_policy: env_parse("GENEGENIE_GENOTYPE_POLICY")?
                .unwrap_or(defaults.genotype_policy),
            section_concurrency: env_parse::<usize>("GENEGENIE_SECTION_CONCURRENCY")?
                .unwrap_or(defaults.section_concurrency)
                .max(1),
        })
    }
}

/// Settings for the text generation collaborator
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

// Keep the API key out of debug logs
impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_key = match env_string("OPENAI_API_KEY") {
            Some(key) => Some(key),
            None => match env_string("OPENAI_API_KEY_FILE") {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .map_err(|source| ConfigError::SecretFile {
                            key: "OPENAI_API_KEY_FILE",
                            path: path.clone(),
                            source,
                        })?
                        .trim()
                        .to_string(),
                ),
                None => None,
            },
        };

        Ok(Self {
            api_key,
            base_url: env_string("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: env_string("GENEGENIE_MODEL").unwrap_or(defaults.model),
            request_timeout_secs: env_parse("GENEGENIE_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            max_retries: env_parse("GENEGENIE_MAX_RETRIES")?.unwrap_or(defaults.max_retries),
        })
    }
}

/// Load `.env` (if present) and read both configuration blocks
pub fn load() -> Result<(ReportConfig, GeneratorConfig), ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    Ok((ReportConfig::from_env()?, GeneratorConfig::from_env()?))
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env_string(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(None),
    }
}
