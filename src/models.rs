// src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// A lead's fields exactly as stored in the lead table. Field names are
/// capitalized on the wire; anything beyond the three known columns is kept
/// verbatim in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lead {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Company", default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Lead {
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            company: Some(company.into()),
            email: Some(email.into()),
            extra: HashMap::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// A lead record as returned by the store: opaque id plus the field map.
/// The id is passed through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: String,
    pub fields: Lead,
    #[serde(
        rename = "createdTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_time: Option<String>,
}

/// Who we are writing on behalf of. Constant for the whole campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProfile {
    pub name: String,
    pub offer: String,
}

/// Per-lead stage results. Stages are strictly ordered, so an unreached
/// stage stays false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageOutcome {
    pub validation: bool,
    pub message_generation: bool,
    pub email_sent: bool,
    pub task_created: bool,
}

impl StageOutcome {
    pub fn any_succeeded(&self) -> bool {
        self.validation || self.message_generation || self.email_sent || self.task_created
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CampaignStats {
    pub total_leads: usize,
    pub validated_leads: usize,
    pub messages_generated: usize,
    pub emails_sent: usize,
    pub tasks_created: usize,
    pub failed_leads: usize,
}

impl CampaignStats {
    /// A lead counts as failed only when not a single stage succeeded.
    pub fn record(&mut self, outcome: &StageOutcome) {
        if outcome.validation {
            self.validated_leads += 1;
        }
        if outcome.message_generation {
            self.messages_generated += 1;
        }
        if outcome.email_sent {
            self.emails_sent += 1;
        }
        if outcome.task_created {
            self.tasks_created += 1;
        }
        if !outcome.any_succeeded() {
            self.failed_leads += 1;
        }
    }
}

/// Wall-clock time accumulated per stage across the whole run. Validation is
/// not timed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceMetrics {
    pub total_processing: Duration,
    pub message_generation: Duration,
    pub email_sending: Duration,
    pub task_creation: Duration,
}

impl PerformanceMetrics {
    /// Derive per-unit averages once the run has ended. A zero count divides
    /// by one instead.
    pub fn report(&self, stats: &CampaignStats) -> PerformanceReport {
        PerformanceReport {
            total_processing: self.total_processing,
            message_generation: self.message_generation,
            email_sending: self.email_sending,
            task_creation: self.task_creation,
            average_message_time: self.message_generation / stats.messages_generated.max(1) as u32,
            average_email_time: self.email_sending / stats.emails_sent.max(1) as u32,
            average_task_time: self.task_creation / stats.tasks_created.max(1) as u32,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PerformanceReport {
    pub total_processing: Duration,
    pub message_generation: Duration,
    pub email_sending: Duration,
    pub task_creation: Duration,
    pub average_message_time: Duration,
    pub average_email_time: Duration,
    pub average_task_time: Duration,
}

/// Outcome of a bulk email send. Error descriptions keep the iteration order
/// of the recipient list.
#[derive(Debug, Default)]
pub struct BulkSendReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}
