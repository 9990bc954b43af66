//! Conflict detection and rule-based arbitration.
//!
//! Key components:
//! - `ConflictDetector`: registered pairwise/flag rules over successful outputs
//! - `ConflictResolver`: per-kind resolution rules under the fixed
//!   authority hierarchy (1 safety .. 5 cost)

mod detector;
mod resolver;
mod scales;
mod types;

pub use detector::{ConflictDetector, DetectionRule};
pub use resolver::{ConflictResolver, ResolutionRule};
pub use types::{
    Conflict, ConflictKind, HierarchyLevel, Resolution, ResolutionStatus, Severity,
};
