//! Dependency-driven phase construction.
//!
//! The planner turns a selected role set into an ordered list of phases by
//! repeatedly scheduling the dependency-free frontier: exclusive roles get
//! their own sequential phase, the remaining shareable frontier runs as one
//! parallel phase. The dependency table is static configuration; a cycle in
//! it fails the whole run before any specialist is invoked.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::{Role, Scheduling};
use crate::error::{AnalysisError, Result};

use super::graph::detect_cycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Sequential,
    Parallel,
}

/// One scheduling unit of the plan: a single sequential role or a set of
/// roles fanned out concurrently.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Phase {
    pub kind: PhaseKind,
    pub roles: Vec<Role>,
}

impl Phase {
    fn sequential(role: Role) -> Self {
        Self {
            kind: PhaseKind::Sequential,
            roles: vec![role],
        }
    }

    fn of_frontier(roles: Vec<Role>) -> Self {
        let kind = if roles.len() > 1 {
            PhaseKind::Parallel
        } else {
            PhaseKind::Sequential
        };
        Self { kind, roles }
    }
}

/// Ordered phases for one run. Invariant: a role's phase index strictly
/// exceeds the phase index of every dependency present in the plan.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionPlan {
    pub phases: Vec<Phase>,
}

impl ExecutionPlan {
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.phases.iter().flat_map(|p| p.roles.iter().copied())
    }

    pub fn role_count(&self) -> usize {
        self.phases.iter().map(|p| p.roles.len()).sum()
    }

    pub fn phase_index_of(&self, role: Role) -> Option<usize> {
        self.phases.iter().position(|p| p.roles.contains(&role))
    }
}

/// Static must-complete-before table. Configuration, not per-run data.
#[derive(Debug, Clone)]
pub struct DependencyTable {
    edges: BTreeMap<Role, Vec<Role>>,
}

impl DependencyTable {
    /// The production table, assembled from the per-role metadata.
    pub fn standard() -> Self {
        let edges = Role::ALL
            .iter()
            .map(|role| (*role, role.dependencies().to_vec()))
            .collect();
        Self { edges }
    }

    /// Custom table, used to exercise configuration-defect handling.
    pub fn from_edges(edges: BTreeMap<Role, Vec<Role>>) -> Self {
        Self { edges }
    }

    fn deps_of(&self, role: Role) -> Result<&[Role]> {
        self.edges
            .get(&role)
            .map(Vec::as_slice)
            .ok_or(AnalysisError::UnknownRole(role))
    }

    fn check_acyclic(&self) -> Result<()> {
        if let Some(cycle) = detect_cycle(&self.edges) {
            let path = cycle
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(AnalysisError::DependencyCycle { path });
        }
        Ok(())
    }
}

impl Default for DependencyTable {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct ExecutionPlanner {
    table: DependencyTable,
}

impl ExecutionPlanner {
    pub fn new() -> Self {
        Self {
            table: DependencyTable::standard(),
        }
    }

    pub fn with_table(table: DependencyTable) -> Self {
        Self { table }
    }

    /// Build the phase sequence for a selected role set.
    ///
    /// Fails fast on a cyclic or incomplete dependency table; this is a
    /// configuration defect, not a runtime condition.
    pub fn plan(&self, roles: &BTreeSet<Role>) -> Result<ExecutionPlan> {
        self.table.check_acyclic()?;

        let mut remaining = roles.clone();
        let mut completed: BTreeSet<Role> = BTreeSet::new();
        let mut phases = Vec::new();

        while !remaining.is_empty() {
            let frontier = self.frontier(&remaining, &completed, roles)?;

            // check_acyclic above makes an empty frontier unreachable; keep
            // the guard so a broken custom table cannot loop forever.
            if frontier.is_empty() {
                let path = remaining
                    .iter()
                    .map(Role::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(AnalysisError::DependencyCycle { path });
            }

            let phase = match frontier
                .iter()
                .copied()
                .find(|r| r.scheduling() == Scheduling::Exclusive)
            {
                Some(exclusive) => Phase::sequential(exclusive),
                None => Phase::of_frontier(frontier),
            };

            trace!(kind = ?phase.kind, roles = ?phase.roles, "Planned phase");
            for role in &phase.roles {
                remaining.remove(role);
                completed.insert(*role);
            }
            phases.push(phase);
        }

        debug!(
            phases = phases.len(),
            roles = roles.len(),
            "Execution plan ready"
        );
        Ok(ExecutionPlan { phases })
    }

    /// Roles whose selected-set dependencies have all completed, in
    /// canonical role order.
    fn frontier(
        &self,
        remaining: &BTreeSet<Role>,
        completed: &BTreeSet<Role>,
        selected: &BTreeSet<Role>,
    ) -> Result<Vec<Role>> {
        let mut ready = Vec::new();
        for role in remaining {
            let deps = self.table.deps_of(*role)?;
            let unmet = deps
                .iter()
                .filter(|d| selected.contains(d))
                .any(|d| !completed.contains(d));
            if !unmet {
                ready.push(*role);
            }
        }
        Ok(ready)
    }
}

impl Default for ExecutionPlanner {
    fn default() -> Self {
        Self::new()
    }
}
