use std::collections::{BTreeMap, BTreeSet};

use crate::domain::Role;

/// Detects a cycle in the role dependency table using DFS.
///
/// Returns the offending path when one exists. A cycle is a configuration
/// defect and must fail planning before any specialist runs.
pub(crate) fn detect_cycle(dependencies: &BTreeMap<Role, Vec<Role>>) -> Option<Vec<Role>> {
    let mut visited = BTreeSet::new();
    let mut rec_stack = BTreeSet::new();
    let mut path = Vec::new();

    for role in dependencies.keys() {
        if dfs_cycle(*role, dependencies, &mut visited, &mut rec_stack, &mut path) {
            return Some(path);
        }
    }

    None
}

fn dfs_cycle(
    role: Role,
    graph: &BTreeMap<Role, Vec<Role>>,
    visited: &mut BTreeSet<Role>,
    rec_stack: &mut BTreeSet<Role>,
    path: &mut Vec<Role>,
) -> bool {
    if rec_stack.contains(&role) {
        path.push(role);
        return true;
    }

    if visited.contains(&role) {
        return false;
    }

    visited.insert(role);
    rec_stack.insert(role);
    path.push(role);

    if let Some(deps) = graph.get(&role) {
        for dep in deps {
            if dfs_cycle(*dep, graph, visited, rec_stack, path) {
                return true;
            }
        }
    }

    rec_stack.remove(&role);
    path.pop();
    false
}
