// ==============================================================================
// audit.rs - Audit Trail for Report Requests
// ==============================================================================
// Description: Structured audit events for every report request
// Author: Matt Barham
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================
// Events are emitted through tracing under the `genegenie_report::audit`
// target. Details carry counts, tier ids and fingerprints, never genotypes.
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const AUDIT_TARGET: &str = "genegenie_report::audit";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    ReportRequested,
    InputRejected,
    NoRecognizableData,
    SectionFallback,
    ReportCompleted,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::ReportRequested => "report_requested",
            AuditEventType::InputRejected => "input_rejected",
            AuditEventType::NoRecognizableData => "no_recognizable_data",
            AuditEventType::SectionFallback => "section_fallback",
            AuditEventType::ReportCompleted => "report_completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditEvent {
    pub id: Uuid,
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    pub tier: Option<String>,
    pub result: String,
    pub details: serde_json::Value,
    pub severity: LogSeverity,
}

impl AuditEvent {
    pub fn new(
        event_type: AuditEventType,
        request_id: Uuid,
        tier: Option<String>,
        details: serde_json::Value,
    ) -> Self {
        let (severity, result) = match event_type {
            AuditEventType::SectionFallback => (LogSeverity::Warning, "degraded"),
            AuditEventType::InputRejected | AuditEventType::NoRecognizableData => {
                (LogSeverity::Error, "rejected")
            }
            _ => (LogSeverity::Info, "success"),
        };

        Self {
            id: Uuid::new_v4(),
            request_id,
            timestamp: Utc::now(),
            event_type,
            tier,
            result: result.to_string(),
            details,
            severity,
        }
    }

    /// Emit the event at a level matching its severity
    pub fn log(&self) {
        let event = serde_json::to_string(self).unwrap_or_else(|_| self.event_type.as_str().to_string());

        match self.severity {
            LogSeverity::Info => info!(
                target: AUDIT_TARGET,
                event_type = self.event_type.as_str(),
                request_id = %self.request_id,
                "{}",
                event
            ),
            LogSeverity::Warning => warn!(
                target: AUDIT_TARGET,
                event_type = self.event_type.as_str(),
                request_id = %self.request_id,
                "{}",
                event
            ),
            LogSeverity::Error => error!(
                target: AUDIT_TARGET,
                event_type = self.event_type.as_str(),
                request_id = %self.request_id,
                "{}",
                event
            ),
        }
    }
}

/// Convenience function to build and emit an audit event
pub fn log_event(
    event_type: AuditEventType,
    request_id: Uuid,
    tier: Option<&str>,
    details: serde_json::Value,
) -> AuditEvent {
    let event = AuditEvent::new(event_type, request_id, tier.map(str::to_string), details);
    event.log();
    event
}
