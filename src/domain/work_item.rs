//! Input model for one analysis run.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One position row of a bill-of-quantities block.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RowEntry {
    /// Position number, e.g. "01.02.0030".
    pub position: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: Option<f64>,
}

impl RowEntry {
    pub fn new(
        position: impl Into<String>,
        description: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            position: position.into(),
            description: description.into(),
            quantity,
            unit: unit.into(),
            unit_price: None,
        }
    }

    pub fn with_unit_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }
}

/// A bill-of-quantities block handed to one analysis run. Immutable input;
/// nothing here is mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkItem {
    pub title: String,
    /// Trade the block belongs to, e.g. "concrete works".
    pub trade: Option<String>,
    pub description: Option<String>,
    pub rows: Vec<RowEntry>,
    /// Free-form context attached by upstream ingestion.
    pub context_fields: BTreeMap<String, Value>,
}

impl WorkItem {
    pub fn new(title: impl Into<String>, rows: Vec<RowEntry>) -> Self {
        Self {
            title: title.into(),
            trade: None,
            description: None,
            rows,
            context_fields: BTreeMap::new(),
        }
    }

    pub fn with_trade(mut self, trade: impl Into<String>) -> Self {
        self.trade = Some(trade.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_context_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context_fields.insert(key.into(), value);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Project-level context shared by every block of the same job.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProjectContext {
    pub project_name: Option<String>,
    /// Budget ceiling for the analyzed scope; presence activates the cost role.
    pub budget_constraint: Option<f64>,
    pub fields: BTreeMap<String, Value>,
}

impl ProjectContext {
    pub fn with_budget_constraint(mut self, budget: f64) -> Self {
        self.budget_constraint = Some(budget);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn has_budget_constraint(&self) -> bool {
        self.budget_constraint.is_some()
    }
}
