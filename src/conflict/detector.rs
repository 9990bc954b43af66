//! Cross-output conflict detection.
//!
//! Detection rules are a registered list; adding a rule never touches an
//! existing one. Rules inspect successful payloads only - a role recorded
//! as `Failure` can never contribute to a conflict.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::debug;

use crate::domain::{Role, RoleOutput, RoleOutputs};

use super::types::{Conflict, ConflictKind, Severity};

pub trait DetectionRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn detect(&self, outputs: &RoleOutputs) -> Vec<Conflict>;
}

pub struct ConflictDetector {
    rules: Vec<Box<dyn DetectionRule>>,
}

impl ConflictDetector {
    /// Detector with the built-in rule set registered.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(ConcreteClassRule),
                Box::new(ExposureClassRule),
                Box::new(StandardsComplianceRule),
                Box::new(CostBudgetRule),
                Box::new(MandatoryWorksRule),
            ],
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn DetectionRule>>) -> Self {
        Self { rules }
    }

    pub fn register(&mut self, rule: Box<dyn DetectionRule>) {
        self.rules.push(rule);
    }

    pub fn detect(&self, outputs: &RoleOutputs) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for rule in &self.rules {
            let found = rule.detect(outputs);
            if !found.is_empty() {
                debug!(rule = rule.name(), count = found.len(), "Conflicts detected");
            }
            conflicts.extend(found);
        }
        conflicts
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Successful output of a role, if present.
fn success_of(outputs: &RoleOutputs, role: Role) -> Option<&RoleOutput> {
    outputs.get(&role).filter(|o| o.is_success())
}

/// Named string field from a role's successful payload.
fn claim(outputs: &RoleOutputs, role: Role, field: &str) -> Option<String> {
    success_of(outputs, role)?
        .str_field(field)
        .map(str::to_owned)
}

/// Two roles disagree on the concrete strength class.
struct ConcreteClassRule;

impl DetectionRule for ConcreteClassRule {
    fn name(&self) -> &'static str {
        "concrete_class"
    }

    fn detect(&self, outputs: &RoleOutputs) -> Vec<Conflict> {
        let Some(required) = claim(outputs, Role::Structural, "required_class") else {
            return Vec::new();
        };
        let Some(specified) = claim(outputs, Role::Materials, "concrete_class") else {
            return Vec::new();
        };
        if required == specified {
            return Vec::new();
        }

        vec![Conflict {
            kind: ConflictKind::ConcreteClassMismatch,
            involved_roles: vec![Role::Structural, Role::Materials],
            evidence: BTreeMap::from([
                (Role::Structural, json!(required)),
                (Role::Materials, json!(specified)),
            ]),
            severity: Severity::High,
            description: format!(
                "structural requires {required}, materials specifies {specified}"
            ),
        }]
    }
}

/// Two roles disagree on the exposure class.
struct ExposureClassRule;

impl DetectionRule for ExposureClassRule {
    fn name(&self) -> &'static str {
        "exposure_class"
    }

    fn detect(&self, outputs: &RoleOutputs) -> Vec<Conflict> {
        let Some(required) = claim(outputs, Role::Structural, "exposure_class") else {
            return Vec::new();
        };
        let Some(specified) = claim(outputs, Role::Materials, "exposure_class") else {
            return Vec::new();
        };
        if required == specified {
            return Vec::new();
        }

        vec![Conflict {
            kind: ConflictKind::ExposureClassMismatch,
            involved_roles: vec![Role::Structural, Role::Materials],
            evidence: BTreeMap::from([
                (Role::Structural, json!(required)),
                (Role::Materials, json!(specified)),
            ]),
            severity: Severity::Medium,
            description: format!(
                "structural assumes exposure {required}, materials assumes {specified}"
            ),
        }]
    }
}

/// Single-role flagged issue: the standards specialist reports deviations
/// or violations. "Conflict" here means flagged issue, not disagreement.
struct StandardsComplianceRule;

impl DetectionRule for StandardsComplianceRule {
    fn name(&self) -> &'static str {
        "standards_compliance"
    }

    fn detect(&self, outputs: &RoleOutputs) -> Vec<Conflict> {
        let Some(status) = claim(outputs, Role::Standards, "compliance_status") else {
            return Vec::new();
        };

        let (kind, severity) = match status.as_str() {
            "deviations" => (ConflictKind::StandardsDeviation, Severity::Medium),
            "violations" => (ConflictKind::StandardsViolation, Severity::High),
            _ => return Vec::new(),
        };

        let findings = success_of(outputs, Role::Standards)
            .and_then(|o| o.field("findings").cloned())
            .unwrap_or(Value::Null);

        vec![Conflict {
            kind,
            involved_roles: vec![Role::Standards],
            evidence: BTreeMap::from([(Role::Standards, json!({
                "compliance_status": status,
                "findings": findings,
            }))]),
            severity,
            description: format!("standards review reported {status}"),
        }]
    }
}

/// The cost estimate exceeds the budget while structural holds a safety
/// requirement; both roles must have succeeded for this to be a conflict.
struct CostBudgetRule;

impl DetectionRule for CostBudgetRule {
    fn name(&self) -> &'static str {
        "cost_budget"
    }

    fn detect(&self, outputs: &RoleOutputs) -> Vec<Conflict> {
        let Some(cost) = success_of(outputs, Role::Cost) else {
            return Vec::new();
        };
        if cost.field("within_budget").and_then(Value::as_bool) != Some(false) {
            return Vec::new();
        }
        let Some(required) = claim(outputs, Role::Structural, "required_class") else {
            return Vec::new();
        };

        let estimated = cost
            .field("estimated_total")
            .cloned()
            .unwrap_or(Value::Null);

        vec![Conflict {
            kind: ConflictKind::CostBudgetConflict,
            involved_roles: vec![Role::Structural, Role::Cost],
            evidence: BTreeMap::from([
                (Role::Structural, json!(required)),
                (Role::Cost, json!({ "estimated_total": estimated, "within_budget": false })),
            ]),
            severity: Severity::Medium,
            description: format!(
                "cost estimate exceeds budget while structural requires {required}"
            ),
        }]
    }
}

/// The mandatory-rules specialist found required works missing from the bill.
struct MandatoryWorksRule;

impl DetectionRule for MandatoryWorksRule {
    fn name(&self) -> &'static str {
        "mandatory_works"
    }

    fn detect(&self, outputs: &RoleOutputs) -> Vec<Conflict> {
        let missing = success_of(outputs, Role::MandatoryRules)
            .and_then(|o| o.field("missing_works"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if missing.is_empty() {
            return Vec::new();
        }

        vec![Conflict {
            kind: ConflictKind::MissingMandatoryWorks,
            involved_roles: vec![Role::MandatoryRules],
            evidence: BTreeMap::from([(Role::MandatoryRules, Value::Array(missing.clone()))]),
            severity: Severity::High,
            description: format!("{} mandatory work item(s) missing from the bill", missing.len()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs(entries: Vec<(Role, RoleOutput)>) -> RoleOutputs {
        entries.into_iter().collect()
    }

    #[test]
    fn test_concrete_class_mismatch_detected() {
        let outputs = outputs(vec![
            (
                Role::Structural,
                RoleOutput::success(json!({"required_class": "C25/30"}), 0.9),
            ),
            (
                Role::Materials,
                RoleOutput::success(json!({"concrete_class": "C30/37"}), 0.85),
            ),
        ]);

        let conflicts = ConflictDetector::new().detect(&outputs);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ConcreteClassMismatch);
        assert_eq!(conflicts[0].severity, Severity::High);
        assert_eq!(conflicts[0].str_claim(Role::Structural), Some("C25/30"));
    }

    #[test]
    fn test_agreeing_claims_do_not_conflict() {
        let outputs = outputs(vec![
            (
                Role::Structural,
                RoleOutput::success(json!({"required_class": "C25/30"}), 0.9),
            ),
            (
                Role::Materials,
                RoleOutput::success(json!({"concrete_class": "C25/30"}), 0.85),
            ),
        ]);

        assert!(ConflictDetector::new().detect(&outputs).is_empty());
    }

    #[test]
    fn test_failed_role_cannot_conflict() {
        let outputs = outputs(vec![
            (
                Role::Structural,
                RoleOutput::success(json!({"required_class": "C25/30"}), 0.9),
            ),
            (Role::Materials, RoleOutput::failure("timed out")),
        ]);

        assert!(ConflictDetector::new().detect(&outputs).is_empty());
    }

    #[test]
    fn test_standards_deviation_is_single_role() {
        let outputs = outputs(vec![(
            Role::Standards,
            RoleOutput::success(
                json!({"compliance_status": "deviations", "findings": ["EN 1992 cover"]}),
                0.8,
            ),
        )]);

        let conflicts = ConflictDetector::new().detect(&outputs);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::StandardsDeviation);
        assert_eq!(conflicts[0].severity, Severity::Medium);
        assert_eq!(conflicts[0].involved_roles, vec![Role::Standards]);
    }

    #[test]
    fn test_standards_violations_are_high_severity() {
        let outputs = outputs(vec![(
            Role::Standards,
            RoleOutput::success(json!({"compliance_status": "violations"}), 0.8),
        )]);

        let conflicts = ConflictDetector::new().detect(&outputs);
        assert_eq!(conflicts[0].kind, ConflictKind::StandardsViolation);
        assert_eq!(conflicts[0].severity, Severity::High);
    }

    #[test]
    fn test_cost_conflict_requires_structural_success() {
        let over_budget = RoleOutput::success(
            json!({"within_budget": false, "estimated_total": 320_000.0}),
            0.75,
        );

        let alone = outputs(vec![(Role::Cost, over_budget.clone())]);
        assert!(ConflictDetector::new().detect(&alone).is_empty());

        let with_structural = outputs(vec![
            (
                Role::Structural,
                RoleOutput::success(json!({"required_class": "C30/37"}), 0.9),
            ),
            (Role::Cost, over_budget),
        ]);
        let conflicts = ConflictDetector::new().detect(&with_structural);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::CostBudgetConflict);
    }

    #[test]
    fn test_missing_mandatory_works_detected() {
        let outputs = outputs(vec![(
            Role::MandatoryRules,
            RoleOutput::success(
                json!({"missing_works": ["waterproofing membrane", "joint sealing"]}),
                0.9,
            ),
        )]);

        let conflicts = ConflictDetector::new().detect(&outputs);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::MissingMandatoryWorks);
        assert_eq!(conflicts[0].severity, Severity::High);
    }

    #[test]
    fn test_custom_rule_registration() {
        struct AlwaysFlag;
        impl DetectionRule for AlwaysFlag {
            fn name(&self) -> &'static str {
                "always_flag"
            }
            fn detect(&self, _outputs: &RoleOutputs) -> Vec<Conflict> {
                vec![Conflict {
                    kind: ConflictKind::StandardsDeviation,
                    involved_roles: vec![Role::Standards],
                    evidence: BTreeMap::new(),
                    severity: Severity::Low,
                    description: "flag".into(),
                }]
            }
        }

        let mut detector = ConflictDetector::with_rules(Vec::new());
        detector.register(Box::new(AlwaysFlag));
        assert_eq!(detector.detect(&RoleOutputs::new()).len(), 1);
    }
}
