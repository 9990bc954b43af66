//! Rule-based conflict arbitration.
//!
//! Resolution rules are keyed by conflict kind in a registry map and
//! dispatched by lookup; adding a kind never edits an existing rule. Every
//! rule applies the fixed authority hierarchy (1 safety .. 5 cost) and says
//! so in its reasoning. A rule that cannot rank a claim hands the conflict
//! to a human instead of guessing.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::{Role, RoleOutputs};

use super::scales::{stricter, CONCRETE_CLASS_SCALE, EXPOSURE_CLASS_SCALE};
use super::types::{
    Conflict, ConflictKind, HierarchyLevel, Resolution, ResolutionStatus,
};

/// Confidence attached to scale-based arbitration outcomes.
const SCALE_RULE_CONFIDENCE: f64 = 0.9;
/// Confidence attached to fixed-decision rules (remediate, add items).
const FIXED_RULE_CONFIDENCE: f64 = 0.95;

pub trait ResolutionRule: Send + Sync {
    fn kind(&self) -> ConflictKind;
    fn resolve(&self, conflict: &Conflict, outputs: &RoleOutputs) -> Resolution;
}

pub struct ConflictResolver {
    rules: BTreeMap<ConflictKind, Box<dyn ResolutionRule>>,
}

impl ConflictResolver {
    /// Resolver with the built-in rule set registered.
    pub fn new() -> Self {
        let mut resolver = Self {
            rules: BTreeMap::new(),
        };
        resolver.register(Box::new(ConcreteClassRule));
        resolver.register(Box::new(ExposureClassRule));
        resolver.register(Box::new(StandardsRemediationRule {
            kind: ConflictKind::StandardsDeviation,
        }));
        resolver.register(Box::new(StandardsRemediationRule {
            kind: ConflictKind::StandardsViolation,
        }));
        resolver.register(Box::new(CostBudgetRule));
        resolver.register(Box::new(MissingWorksRule));
        resolver
    }

    pub fn register(&mut self, rule: Box<dyn ResolutionRule>) {
        self.rules.insert(rule.kind(), rule);
    }

    pub fn resolve(&self, conflict: &Conflict, outputs: &RoleOutputs) -> Resolution {
        match self.rules.get(&conflict.kind) {
            Some(rule) => {
                let resolution = rule.resolve(conflict, outputs);
                debug!(
                    kind = %conflict.kind,
                    status = ?resolution.status,
                    level = resolution.hierarchy_level.rank(),
                    "Conflict resolved"
                );
                resolution
            }
            // Unarbitrated disagreements are filed at the highest authority
            // so they always force review.
            None => {
                warn!(kind = %conflict.kind, "No resolution rule registered");
                Resolution::unresolved(
                    conflict.kind,
                    HierarchyLevel::Safety,
                    format!(
                        "no resolution rule registered for {}; human arbitration required",
                        conflict.kind
                    ),
                )
            }
        }
    }

    pub fn resolve_all(&self, conflicts: &[Conflict], outputs: &RoleOutputs) -> Vec<Resolution> {
        conflicts
            .iter()
            .map(|c| self.resolve(c, outputs))
            .collect()
    }
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Arbitrate two claims on an ordered scale: the stricter one wins.
fn resolve_on_scale(
    conflict: &Conflict,
    scale: &[&str],
    decision_field: &str,
    level: HierarchyLevel,
) -> Resolution {
    let claim_a = conflict.str_claim(Role::Structural);
    let claim_b = conflict.str_claim(Role::Materials);
    let (Some(a), Some(b)) = (claim_a, claim_b) else {
        return Resolution::unresolved(
            conflict.kind,
            level,
            "claimed values missing from conflict evidence",
        );
    };

    let Some(winner) = stricter(scale, a, b) else {
        return Resolution::unresolved(
            conflict.kind,
            level,
            format!("claim outside the known scale ({a} vs {b}); human review required"),
        );
    };

    // Authority order: the role whose claim prevailed first.
    let authority = if winner == a {
        vec![Role::Structural, Role::Materials]
    } else {
        vec![Role::Materials, Role::Structural]
    };

    Resolution {
        conflict_kind: conflict.kind,
        status: ResolutionStatus::Resolved,
        decision: json!({ decision_field: winner }),
        reasoning: format!(
            "{} (level {}) applied: the stricter claim {winner} satisfies both {a} and {b}",
            level.label(),
            level.rank(),
        ),
        authority_applied: authority,
        hierarchy_level: level,
        confidence: SCALE_RULE_CONFIDENCE,
        requires_human_review: false,
    }
}

struct ConcreteClassRule;

impl ResolutionRule for ConcreteClassRule {
    fn kind(&self) -> ConflictKind {
        ConflictKind::ConcreteClassMismatch
    }

    fn resolve(&self, conflict: &Conflict, _outputs: &RoleOutputs) -> Resolution {
        resolve_on_scale(
            conflict,
            CONCRETE_CLASS_SCALE,
            "required_class",
            HierarchyLevel::Safety,
        )
    }
}

struct ExposureClassRule;

impl ResolutionRule for ExposureClassRule {
    fn kind(&self) -> ConflictKind {
        ConflictKind::ExposureClassMismatch
    }

    fn resolve(&self, conflict: &Conflict, _outputs: &RoleOutputs) -> Resolution {
        resolve_on_scale(
            conflict,
            EXPOSURE_CLASS_SCALE,
            "exposure_class",
            HierarchyLevel::Durability,
        )
    }
}

/// Deviations and violations always resolve to remediation; the decision is
/// automatic but a human applies the fix.
struct StandardsRemediationRule {
    kind: ConflictKind,
}

impl ResolutionRule for StandardsRemediationRule {
    fn kind(&self) -> ConflictKind {
        self.kind
    }

    fn resolve(&self, conflict: &Conflict, _outputs: &RoleOutputs) -> Resolution {
        let findings = conflict
            .claim(Role::Standards)
            .and_then(|v| v.get("findings"))
            .cloned()
            .unwrap_or(Value::Null);

        Resolution {
            conflict_kind: self.kind,
            status: ResolutionStatus::Resolved,
            decision: json!({ "action": "remediate", "findings": findings }),
            reasoning: format!(
                "code compliance (level {}) applied: reported {} must be remediated",
                HierarchyLevel::CodeCompliance.rank(),
                conflict.kind,
            ),
            authority_applied: vec![Role::Standards],
            hierarchy_level: HierarchyLevel::CodeCompliance,
            confidence: FIXED_RULE_CONFIDENCE,
            requires_human_review: true,
        }
    }
}

/// Cost sits at level 5 and can never override levels 1-4: the structural
/// claim stands verbatim, optimization stays advisory.
struct CostBudgetRule;

impl ResolutionRule for CostBudgetRule {
    fn kind(&self) -> ConflictKind {
        ConflictKind::CostBudgetConflict
    }

    fn resolve(&self, conflict: &Conflict, outputs: &RoleOutputs) -> Resolution {
        let Some(required) = conflict.str_claim(Role::Structural) else {
            return Resolution::unresolved(
                conflict.kind,
                HierarchyLevel::Safety,
                "structural claim missing from conflict evidence",
            );
        };

        let recommendations = outputs
            .get(&Role::Cost)
            .and_then(|o| o.field("optimization_recommendations"))
            .cloned()
            .unwrap_or_else(|| json!([]));

        Resolution {
            conflict_kind: conflict.kind,
            status: ResolutionStatus::Resolved,
            decision: json!({
                "action": "keep_requirement",
                "required_class": required,
                "optimization_recommendations": recommendations,
            }),
            reasoning: format!(
                "safety (level {}) outranks cost (level {}): requirement {required} stands; \
                 optimizations remain advisory",
                HierarchyLevel::Safety.rank(),
                HierarchyLevel::Cost.rank(),
            ),
            authority_applied: vec![Role::Structural],
            hierarchy_level: HierarchyLevel::Safety,
            confidence: SCALE_RULE_CONFIDENCE,
            requires_human_review: false,
        }
    }
}

struct MissingWorksRule;

impl ResolutionRule for MissingWorksRule {
    fn kind(&self) -> ConflictKind {
        ConflictKind::MissingMandatoryWorks
    }

    fn resolve(&self, conflict: &Conflict, _outputs: &RoleOutputs) -> Resolution {
        let items = conflict
            .claim(Role::MandatoryRules)
            .cloned()
            .unwrap_or_else(|| json!([]));

        Resolution {
            conflict_kind: conflict.kind,
            status: ResolutionStatus::Resolved,
            decision: json!({ "action": "add_missing_works", "items": items }),
            reasoning: format!(
                "code compliance (level {}) applied: mandatory works must be added to the bill",
                HierarchyLevel::CodeCompliance.rank(),
            ),
            authority_applied: vec![Role::MandatoryRules],
            hierarchy_level: HierarchyLevel::CodeCompliance,
            confidence: FIXED_RULE_CONFIDENCE,
            requires_human_review: true,
        }
    }
}
