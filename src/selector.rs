//! Tier-driven selection of the specialist set for one run.

use std::collections::BTreeSet;

use tracing::debug;

use crate::classifier::ComplexityTier;
use crate::domain::{ProjectContext, Role};

use crate::classifier::ComplexityTier::{Complex, Creative, Simple, Standard};

/// Declarative invocation policy for one role. Selection is a table lookup;
/// adding a role means adding a row here, not another branch somewhere.
struct InvocationPolicy {
    role: Role,
    /// Tiers in which the role runs at all.
    tiers: &'static [ComplexityTier],
    /// Only invoke when the project carries a budget constraint.
    requires_budget: bool,
}

const POLICIES: [InvocationPolicy; 6] = [
    InvocationPolicy {
        role: Role::DocumentValidator,
        tiers: &[Complex, Creative],
        requires_budget: false,
    },
    InvocationPolicy {
        role: Role::Structural,
        tiers: &[Standard, Complex, Creative],
        requires_budget: false,
    },
    InvocationPolicy {
        role: Role::Materials,
        tiers: &[Standard, Complex, Creative],
        requires_budget: false,
    },
    InvocationPolicy {
        role: Role::Standards,
        tiers: &[Complex, Creative],
        requires_budget: false,
    },
    InvocationPolicy {
        // Never omitted, for any tier.
        role: Role::MandatoryRules,
        tiers: &[Simple, Standard, Complex, Creative],
        requires_budget: false,
    },
    InvocationPolicy {
        role: Role::Cost,
        tiers: &[Simple, Standard, Complex, Creative],
        requires_budget: true,
    },
];

pub struct RoleSelector;

impl RoleSelector {
    /// Roles required for the given tier and project context. Pure and
    /// deterministic; the result is a set, order carries no meaning.
    pub fn select(tier: ComplexityTier, context: &ProjectContext) -> BTreeSet<Role> {
        let roles: BTreeSet<Role> = POLICIES
            .iter()
            .filter(|p| p.tiers.contains(&tier))
            .filter(|p| !p.requires_budget || context.has_budget_constraint())
            .map(|p| p.role)
            .collect();

        debug!(tier = ?tier, count = roles.len(), "Selected specialist roles");
        roles
    }
}
