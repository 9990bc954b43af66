//! Conflicts between specialist findings and their arbitrated resolutions.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Role;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    ConcreteClassMismatch,
    ExposureClassMismatch,
    StandardsDeviation,
    StandardsViolation,
    CostBudgetConflict,
    MissingMandatoryWorks,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConcreteClassMismatch => "concrete_class_mismatch",
            Self::ExposureClassMismatch => "exposure_class_mismatch",
            Self::StandardsDeviation => "standards_deviation",
            Self::StandardsViolation => "standards_violation",
            Self::CostBudgetConflict => "cost_budget_conflict",
            Self::MissingMandatoryWorks => "missing_mandatory_works",
        };
        f.write_str(name)
    }
}

/// A detected disagreement (or single-role flagged issue) among successful
/// outputs. Failed roles never contribute.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub involved_roles: Vec<Role>,
    /// Claimed value per involved role, lifted from the payloads.
    pub evidence: BTreeMap<Role, Value>,
    pub severity: Severity,
    pub description: String,
}

impl Conflict {
    pub fn claim(&self, role: Role) -> Option<&Value> {
        self.evidence.get(&role)
    }

    pub fn str_claim(&self, role: Role) -> Option<&str> {
        self.claim(role).and_then(Value::as_str)
    }
}

/// Fixed authority hierarchy for arbitration; a lower level always prevails.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    Safety,
    CodeCompliance,
    Durability,
    Practicality,
    Cost,
}

impl HierarchyLevel {
    pub fn rank(&self) -> u8 {
        match self {
            Self::Safety => 1,
            Self::CodeCompliance => 2,
            Self::Durability => 3,
            Self::Practicality => 4,
            Self::Cost => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::CodeCompliance => "code compliance",
            Self::Durability => "durability",
            Self::Practicality => "practicality",
            Self::Cost => "cost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Resolved,
    Unresolved,
}

/// Arbitrated outcome for one conflict. Always carries both the
/// machine-usable decision and the reasoning naming the applied level.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Resolution {
    pub conflict_kind: ConflictKind,
    pub status: ResolutionStatus,
    pub decision: Value,
    pub reasoning: String,
    /// Roles whose claims carried the decision, most authoritative first.
    pub authority_applied: Vec<Role>,
    pub hierarchy_level: HierarchyLevel,
    pub confidence: f64,
    pub requires_human_review: bool,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.status == ResolutionStatus::Resolved
    }

    /// Unresolved outcome; always escalated to a human.
    pub fn unresolved(
        kind: ConflictKind,
        level: HierarchyLevel,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            conflict_kind: kind,
            status: ResolutionStatus::Unresolved,
            decision: Value::Null,
            reasoning: reasoning.into(),
            authority_applied: Vec::new(),
            hierarchy_level: level,
            confidence: 0.0,
            requires_human_review: true,
        }
    }
}
