//! Specialist roles and their static scheduling metadata.
//!
//! Roles are data, not code: dependency edges and scheduling class are
//! looked up through methods on the enum, so adding a role is an addition
//! here, never an edit to a call site.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A specialist capability, invoked at most once per analysis run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    DocumentValidator,
    Structural,
    Materials,
    Standards,
    MandatoryRules,
    Cost,
}

/// How a role may be placed inside an execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduling {
    /// Runs alone in its own sequential phase.
    Exclusive,
    /// May share a parallel phase with other shareable roles.
    Shareable,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::DocumentValidator,
        Role::Structural,
        Role::Materials,
        Role::Standards,
        Role::MandatoryRules,
        Role::Cost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::DocumentValidator => "document_validator",
            Role::Structural => "structural",
            Role::Materials => "materials",
            Role::Standards => "standards",
            Role::MandatoryRules => "mandatory_rules",
            Role::Cost => "cost",
        }
    }

    /// Key under which this role's settled output appears in the context chain.
    pub fn context_key(&self) -> String {
        format!("{}_output", self.as_str())
    }

    /// Roles that must settle before this one may start.
    ///
    /// Edges to roles outside the selected set are ignored by the planner.
    pub fn dependencies(&self) -> &'static [Role] {
        match self {
            Role::DocumentValidator => &[],
            Role::Structural => &[Role::DocumentValidator],
            Role::Materials => &[Role::Structural],
            Role::Standards => &[],
            Role::MandatoryRules => &[],
            Role::Cost => &[Role::Structural, Role::Materials],
        }
    }

    pub fn scheduling(&self) -> Scheduling {
        match self {
            Role::DocumentValidator | Role::Materials | Role::Cost => Scheduling::Exclusive,
            Role::Structural | Role::Standards | Role::MandatoryRules => Scheduling::Shareable,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::DocumentValidator.to_string(), "document_validator");
        assert_eq!(Role::MandatoryRules.to_string(), "mandatory_rules");
    }

    #[test]
    fn test_context_key() {
        assert_eq!(Role::Structural.context_key(), "structural_output");
        assert_eq!(Role::Cost.context_key(), "cost_output");
    }

    #[test]
    fn test_dependencies_reference_known_roles() {
        for role in Role::ALL {
            for dep in role.dependencies() {
                assert!(Role::ALL.contains(dep), "{} depends on unknown {}", role, dep);
            }
        }
    }

    #[test]
    fn test_scheduling_classes() {
        assert_eq!(Role::DocumentValidator.scheduling(), Scheduling::Exclusive);
        assert_eq!(Role::Materials.scheduling(), Scheduling::Exclusive);
        assert_eq!(Role::Cost.scheduling(), Scheduling::Exclusive);
        assert_eq!(Role::Structural.scheduling(), Scheduling::Shareable);
        assert_eq!(Role::Standards.scheduling(), Scheduling::Shareable);
        assert_eq!(Role::MandatoryRules.scheduling(), Scheduling::Shareable);
    }
}
