//! Multi-specialist analysis orchestrator for bill-of-quantities review.
//!
//! One `analyze()` call classifies a work item's complexity, selects the
//! specialist roles it needs, sequences them under dependency constraints,
//! runs them with per-role failure isolation, detects disagreements between
//! their findings, and arbitrates those disagreements under a fixed
//! authority hierarchy. Specialist implementations sit behind the
//! [`SpecialistInvoker`] trait; this crate owns only the orchestration.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod conflict;
pub mod domain;
pub mod error;
pub mod orchestrator;
pub mod planning;
pub mod selector;

pub use aggregator::{ResultAggregator, NO_SUCCESS_CONFIDENCE_FLOOR};
pub use classifier::{ComplexityClassifier, ComplexityTier};
pub use config::{AnalysisConfig, ClassifierConfig, ExecutorConfig};
pub use conflict::{
    Conflict, ConflictDetector, ConflictKind, ConflictResolver, DetectionRule, HierarchyLevel,
    Resolution, ResolutionRule, ResolutionStatus, Severity,
};
pub use domain::{
    AnalysisResult, AnalysisStatus, ContextChain, ContextSnapshot, ProjectContext, Role,
    RoleOutput, RoleOutputs, RowEntry, Scheduling, WorkItem,
};
pub use error::{AnalysisError, Result};
pub use orchestrator::{Orchestrator, SpecialistInvoker, WorkflowExecutor};
pub use planning::{DependencyTable, ExecutionPlan, ExecutionPlanner, Phase, PhaseKind};
pub use selector::RoleSelector;
