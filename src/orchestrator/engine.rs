//! The analysis pipeline: classify, select, plan, execute, detect, resolve,
//! aggregate. Data flows strictly forward; no stage re-invokes an earlier
//! one.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::aggregator::ResultAggregator;
use crate::classifier::ComplexityClassifier;
use crate::config::AnalysisConfig;
use crate::conflict::{ConflictDetector, ConflictResolver};
use crate::domain::{AnalysisResult, ProjectContext, WorkItem};
use crate::error::Result;
use crate::planning::ExecutionPlanner;
use crate::selector::RoleSelector;

use super::executor::WorkflowExecutor;
use super::invoker::SpecialistInvoker;

pub struct Orchestrator {
    classifier: ComplexityClassifier,
    planner: ExecutionPlanner,
    executor: WorkflowExecutor,
    detector: ConflictDetector,
    resolver: ConflictResolver,
}

impl Orchestrator {
    pub fn new(config: AnalysisConfig, invoker: Arc<dyn SpecialistInvoker>) -> Self {
        Self {
            classifier: ComplexityClassifier::new(&config.classifier),
            planner: ExecutionPlanner::new(),
            executor: WorkflowExecutor::new(invoker, &config.executor),
            detector: ConflictDetector::new(),
            resolver: ConflictResolver::new(),
        }
    }

    /// Analyze one work item.
    ///
    /// Only a planning defect (cyclic or incomplete dependency table) is a
    /// true error; specialist failures degrade confidence and coverage but
    /// the caller always receives a complete result.
    pub async fn analyze(
        &self,
        item: &WorkItem,
        context: &ProjectContext,
    ) -> Result<AnalysisResult> {
        let started = Instant::now();

        let tier = self.classifier.classify(item);
        let roles = RoleSelector::select(tier, context);
        info!(
            title = %item.title,
            tier = ?tier,
            roles = roles.len(),
            "Starting analysis"
        );

        let plan = self.planner.plan(&roles)?;
        let outputs = self.executor.execute(&plan, item, context).await;

        let conflicts = self.detector.detect(&outputs);
        let resolutions = self.resolver.resolve_all(&conflicts, &outputs);
        debug!(
            conflicts = conflicts.len(),
            resolutions = resolutions.len(),
            "Arbitration complete"
        );

        let result = ResultAggregator::aggregate(
            tier,
            outputs,
            conflicts,
            resolutions,
            started.elapsed(),
        );
        info!(
            run_id = %result.run_id,
            status = ?result.status,
            confidence = result.overall_confidence,
            elapsed_ms = result.elapsed_ms,
            "Analysis completed"
        );
        Ok(result)
    }
}
