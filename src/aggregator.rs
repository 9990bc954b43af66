//! Final assembly of an analysis run.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::classifier::ComplexityTier;
use crate::conflict::{Conflict, Resolution, Severity};
use crate::domain::{AnalysisResult, AnalysisStatus, RoleOutputs};

/// Reported overall confidence when no specialist produced a successful
/// output. Single definition site; never inline this.
pub const NO_SUCCESS_CONFIDENCE_FLOOR: f64 = 0.70;

pub struct ResultAggregator;

impl ResultAggregator {
    /// Merge the run's outputs, conflicts, and resolutions into one result.
    ///
    /// Overall confidence is the arithmetic mean over successful outputs,
    /// the named floor when there are none. The run needs review exactly
    /// when a high-severity conflict was detected.
    pub fn aggregate(
        tier: ComplexityTier,
        role_outputs: RoleOutputs,
        conflicts: Vec<Conflict>,
        resolutions: Vec<Resolution>,
        elapsed: Duration,
    ) -> AnalysisResult {
        let confidences: Vec<f64> = role_outputs
            .values()
            .filter_map(|o| o.confidence())
            .collect();
        let overall_confidence = if confidences.is_empty() {
            NO_SUCCESS_CONFIDENCE_FLOOR
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };

        let status = if conflicts.iter().any(|c| c.severity == Severity::High) {
            AnalysisStatus::NeedsReview
        } else {
            AnalysisStatus::Complete
        };

        AnalysisResult {
            run_id: Uuid::new_v4().to_string(),
            tier,
            role_outputs,
            conflicts,
            resolutions,
            overall_confidence,
            elapsed_ms: elapsed.as_millis() as u64,
            status,
            completed_at: Utc::now(),
        }
    }
}
