//! Rule-based complexity classification for work items.
//!
//! Scores a block 0-9 from four independent, strictly additive factors and
//! maps the score to a tier through a single const table. Pure and total:
//! classification never fails and never consults a specialist.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::domain::WorkItem;

/// Complexity tier, ordered by required analysis rigor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    /// Routine single-position blocks; mandatory-rules check only.
    Simple,
    /// Everyday blocks; structural and materials review.
    Standard,
    /// Large or under-specified blocks; full specialist set.
    Complex,
    /// Unusual or experimental work; full set with document validation.
    Creative,
}

/// Score-to-tier mapping; upper bounds are inclusive. Single edit point
/// for every threshold.
const TIER_TABLE: [(u8, ComplexityTier); 4] = [
    (1, ComplexityTier::Simple),
    (3, ComplexityTier::Standard),
    (6, ComplexityTier::Complex),
    (u8::MAX, ComplexityTier::Creative),
];

/// Number of context fields at which the completeness factor saturates.
const CONTEXT_SATURATION: usize = 5;
/// Context fields needed to count the item as context-rich.
const RICH_CONTEXT_THRESHOLD: usize = 3;
/// Top-level fields counted towards data completeness.
const REQUIRED_FIELD_COUNT: f64 = 4.0;

pub struct ComplexityClassifier {
    creative_keywords: Vec<String>,
}

impl ComplexityClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            creative_keywords: config
                .creative_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    pub fn classify(&self, item: &WorkItem) -> ComplexityTier {
        let score = self.score(item);
        let tier = Self::tier_for(score);
        debug!(score, tier = ?tier, title = %item.title, "Classified work item");
        tier
    }

    /// Additive complexity score in [0, 9].
    pub fn score(&self, item: &WorkItem) -> u8 {
        Self::row_count_factor(item.row_count())
            + Self::completeness_factor(item)
            + self.keyword_factor(&item.title)
            + Self::context_richness_factor(item)
    }

    fn tier_for(score: u8) -> ComplexityTier {
        TIER_TABLE
            .iter()
            .find(|(bound, _)| score <= *bound)
            .map(|(_, tier)| *tier)
            .expect("tier table covers the full score range")
    }

    fn row_count_factor(rows: usize) -> u8 {
        match rows {
            0..=1 => 0,
            2..=5 => 1,
            6..=15 => 2,
            16..=30 => 3,
            _ => 4,
        }
    }

    /// Data completeness: mean of top-level field presence and context
    /// field saturation. Sparse blocks score higher (more complex).
    fn completeness_factor(item: &WorkItem) -> u8 {
        let mut present = 0usize;
        if !item.title.trim().is_empty() {
            present += 1;
        }
        if item.trade.as_deref().is_some_and(|t| !t.trim().is_empty()) {
            present += 1;
        }
        if item
            .description
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
        {
            present += 1;
        }
        if !item.rows.is_empty() {
            present += 1;
        }

        let field_ratio = present as f64 / REQUIRED_FIELD_COUNT;
        let context_ratio =
            (item.context_fields.len() as f64 / CONTEXT_SATURATION as f64).min(1.0);
        let completeness = (field_ratio + context_ratio) / 2.0;

        if completeness >= 0.8 {
            0
        } else if completeness >= 0.6 {
            1
        } else {
            2
        }
    }

    fn keyword_factor(&self, title: &str) -> u8 {
        let title = title.to_lowercase();
        if self.creative_keywords.iter().any(|k| title.contains(k)) {
            2
        } else {
            0
        }
    }

    fn context_richness_factor(item: &WorkItem) -> u8 {
        if item.context_fields.len() >= RICH_CONTEXT_THRESHOLD {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowEntry;
    use serde_json::json;

    fn classifier() -> ComplexityClassifier {
        ComplexityClassifier::new(&ClassifierConfig::default())
    }

    fn rows(n: usize) -> Vec<RowEntry> {
        (0..n)
            .map(|i| RowEntry::new(format!("01.{i:04}"), "position", 1.0, "m2"))
            .collect()
    }

    /// Fully specified item: every factor except row count contributes 0.
    fn complete_item(row_count: usize) -> WorkItem {
        WorkItem::new("Reinforced slab", rows(row_count))
            .with_trade("concrete works")
            .with_description("Ground floor slab, C25/30")
            .with_context_field("floor", json!("ground"))
            .with_context_field("exposure", json!("XC2"))
            .with_context_field("load_case", json!("standard"))
            .with_context_field("phase", json!("shell"))
            .with_context_field("zone", json!("A"))
    }

    #[test]
    fn test_row_count_factor_boundaries() {
        assert_eq!(ComplexityClassifier::row_count_factor(1), 0);
        assert_eq!(ComplexityClassifier::row_count_factor(5), 1);
        assert_eq!(ComplexityClassifier::row_count_factor(6), 2);
        assert_eq!(ComplexityClassifier::row_count_factor(15), 2);
        assert_eq!(ComplexityClassifier::row_count_factor(16), 3);
        assert_eq!(ComplexityClassifier::row_count_factor(30), 3);
        assert_eq!(ComplexityClassifier::row_count_factor(31), 4);
    }

    #[test]
    fn test_complete_single_row_item_is_simple() {
        assert_eq!(classifier().classify(&complete_item(1)), ComplexityTier::Simple);
    }

    #[test]
    fn test_score_is_additive_over_row_count() {
        let c = classifier();
        assert_eq!(c.score(&complete_item(30)) - c.score(&complete_item(1)), 3);
        assert_eq!(c.score(&complete_item(31)) - c.score(&complete_item(1)), 4);
    }

    #[test]
    fn test_creative_keyword_adds_two() {
        let c = classifier();
        let plain = complete_item(1);
        let experimental = {
            let mut item = complete_item(1);
            item.title = "Experimental facade anchor".to_string();
            item
        };
        assert_eq!(c.score(&experimental) - c.score(&plain), 2);
    }

    #[test]
    fn test_sparse_item_scores_completeness_and_context() {
        // Bare title and rows: field ratio 0.5, no context fields.
        let item = WorkItem::new("Slab", rows(1));
        let c = classifier();
        // completeness (0.25 mean -> 2) + context poverty (1)
        assert_eq!(c.score(&item), 3);
        assert_eq!(c.classify(&item), ComplexityTier::Standard);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let c = classifier();
        let item = complete_item(12);
        let first = c.classify(&item);
        for _ in 0..10 {
            assert_eq!(c.classify(&item), first);
        }
    }

    #[test]
    fn test_tier_table_ordering() {
        assert_eq!(ComplexityClassifier::tier_for(0), ComplexityTier::Simple);
        assert_eq!(ComplexityClassifier::tier_for(1), ComplexityTier::Simple);
        assert_eq!(ComplexityClassifier::tier_for(2), ComplexityTier::Standard);
        assert_eq!(ComplexityClassifier::tier_for(3), ComplexityTier::Standard);
        assert_eq!(ComplexityClassifier::tier_for(4), ComplexityTier::Complex);
        assert_eq!(ComplexityClassifier::tier_for(6), ComplexityTier::Complex);
        assert_eq!(ComplexityClassifier::tier_for(7), ComplexityTier::Creative);
        assert_eq!(ComplexityClassifier::tier_for(9), ComplexityTier::Creative);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(ComplexityTier::Simple < ComplexityTier::Standard);
        assert!(ComplexityTier::Standard < ComplexityTier::Complex);
        assert!(ComplexityTier::Complex < ComplexityTier::Creative);
    }
}
