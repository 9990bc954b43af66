//! Settled specialist outputs and the append-only context chain.

use std::collections::BTreeMap;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Role;

/// Terminal outcome of a single specialist invocation. Exactly one of the
/// two variants per role per run; a role never settles twice.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoleOutput {
    Success {
        /// Role-specific findings, opaque to the orchestrator except for the
        /// fields named by detection rules.
        payload: Value,
        /// Specialist self-confidence in [0, 1].
        confidence: f64,
    },
    Failure {
        reason: String,
    },
}

impl RoleOutput {
    pub fn success(payload: Value, confidence: f64) -> Self {
        Self::Success {
            payload,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Success { confidence, .. } => Some(*confidence),
            Self::Failure { .. } => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success { payload, .. } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Named payload field of a successful output.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload().and_then(|p| p.get(name))
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

/// Map of every settled role in a run, keyed in canonical role order.
pub type RoleOutputs = BTreeMap<Role, RoleOutput>;

/// Append-only record of settled outputs, owned by the executor.
///
/// Specialists never see the live chain: each invocation receives a
/// [`ContextSnapshot`] frozen at phase start, so roles inside the same
/// parallel phase cannot observe each other.
#[derive(Debug, Clone, Default)]
pub struct ContextChain {
    entries: BTreeMap<Role, RoleOutput>,
}

impl ContextChain {
    pub fn append(&mut self, role: Role, output: RoleOutput) {
        debug_assert!(
            !self.entries.contains_key(&role),
            "role {role} settled twice"
        );
        self.entries.insert(role, output);
    }

    /// Freeze the current chain state. Cheap to clone and hand to tasks.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            entries: Arc::new(self.entries.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable view of the chain as of an earlier phase boundary.
#[derive(Debug, Clone, Default)]
pub struct ContextSnapshot {
    entries: Arc<BTreeMap<Role, RoleOutput>>,
}

impl ContextSnapshot {
    pub fn get(&self, role: Role) -> Option<&RoleOutput> {
        self.entries.get(&role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.entries.contains_key(&role)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.entries.keys().copied()
    }

    /// Render entries under their `<role>_output` keys for prompt assembly
    /// by invoker implementations.
    pub fn to_keyed_map(&self) -> BTreeMap<String, RoleOutput> {
        self.entries
            .iter()
            .map(|(role, output)| (role.context_key(), output.clone()))
            .collect()
    }
}
