//! Final result of one analysis run.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::classifier::ComplexityTier;
use crate::conflict::{Conflict, Resolution};

use super::output::RoleOutputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Complete,
    NeedsReview,
}

/// Everything a caller gets back from `analyze()`. Built once by the
/// aggregator and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub run_id: String,
    pub tier: ComplexityTier,
    pub role_outputs: RoleOutputs,
    pub conflicts: Vec<Conflict>,
    pub resolutions: Vec<Resolution>,
    /// Mean specialist confidence; the named floor when no role succeeded.
    pub overall_confidence: f64,
    pub elapsed_ms: u64,
    pub status: AnalysisStatus,
    pub completed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn succeeded_roles(&self) -> usize {
        self.role_outputs.values().filter(|o| o.is_success()).count()
    }

    pub fn failed_roles(&self) -> usize {
        self.role_outputs.len() - self.succeeded_roles()
    }

    pub fn needs_review(&self) -> bool {
        self.status == AnalysisStatus::NeedsReview
    }
}
