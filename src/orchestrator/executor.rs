//! Phase-by-phase plan execution with per-role failure isolation.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::ExecutorConfig;
use crate::domain::{
    ContextChain, ContextSnapshot, ProjectContext, Role, RoleOutput, RoleOutputs, WorkItem,
};
use crate::orchestrator::SpecialistInvoker;
use crate::planning::{ExecutionPlan, Phase, PhaseKind};

/// Runs an execution plan against the invoker collaborator.
///
/// Sequential phases settle one role and append it to the chain before the
/// next phase starts. Parallel phases fan out against one frozen snapshot,
/// so siblings cannot observe each other, and join before merging. Every
/// role in the plan settles exactly once; a role that errors, times out, or
/// panics becomes a `Failure` and never aborts siblings or later phases.
pub struct WorkflowExecutor {
    invoker: Arc<dyn SpecialistInvoker>,
    role_timeout: Duration,
    max_parallel_roles: usize,
}

impl WorkflowExecutor {
    pub fn new(invoker: Arc<dyn SpecialistInvoker>, config: &ExecutorConfig) -> Self {
        Self {
            invoker,
            role_timeout: Duration::from_secs(config.role_timeout_secs),
            max_parallel_roles: config.max_parallel_roles,
        }
    }

    pub async fn execute(
        &self,
        plan: &ExecutionPlan,
        item: &WorkItem,
        context: &ProjectContext,
    ) -> RoleOutputs {
        let item = Arc::new(item.clone());
        let context = Arc::new(context.clone());

        let mut chain = ContextChain::default();
        let mut outputs = RoleOutputs::new();

        for (index, phase) in plan.phases.iter().enumerate() {
            debug!(phase = index, kind = ?phase.kind, roles = ?phase.roles, "Starting phase");
            match phase.kind {
                PhaseKind::Sequential => {
                    let role = phase.roles[0];
                    let output = self
                        .invoke_role(role, &item, &context, chain.snapshot())
                        .await;
                    chain.append(role, output.clone());
                    outputs.insert(role, output);
                }
                PhaseKind::Parallel => {
                    let settled = self.run_parallel(phase, &item, &context, chain.snapshot()).await;
                    for (role, output) in settled {
                        chain.append(role, output.clone());
                        outputs.insert(role, output);
                    }
                }
            }
        }

        outputs
    }

    /// Fan a parallel phase out under the semaphore and join every member.
    /// All members receive the same snapshot; partial completion never
    /// advances the plan.
    async fn run_parallel(
        &self,
        phase: &Phase,
        item: &Arc<WorkItem>,
        context: &Arc<ProjectContext>,
        snapshot: ContextSnapshot,
    ) -> Vec<(Role, RoleOutput)> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_roles));

        let handles: Vec<_> = phase
            .roles
            .iter()
            .copied()
            .map(|role| {
                let sem = Arc::clone(&semaphore);
                let invoker = Arc::clone(&self.invoker);
                let item = Arc::clone(item);
                let context = Arc::clone(context);
                let snapshot = snapshot.clone();
                let timeout = self.role_timeout;

                tokio::spawn(async move {
                    let _permit = match sem.acquire().await {
                        Ok(p) => p,
                        Err(_) => {
                            return (role, RoleOutput::failure("semaphore closed"));
                        }
                    };
                    let output =
                        invoke_with_timeout(&*invoker, role, &item, &context, snapshot, timeout)
                            .await;
                    (role, output)
                })
            })
            .collect();

        let results = join_all(handles).await;

        results
            .into_iter()
            .zip(phase.roles.iter().copied())
            .map(|(joined, role)| match joined {
                Ok(settled) => settled,
                Err(e) => {
                    warn!(role = %role, error = %e, "Specialist task panicked");
                    (role, RoleOutput::failure(format!("specialist panicked: {e}")))
                }
            })
            .collect()
    }

    async fn invoke_role(
        &self,
        role: Role,
        item: &Arc<WorkItem>,
        context: &Arc<ProjectContext>,
        snapshot: ContextSnapshot,
    ) -> RoleOutput {
        invoke_with_timeout(
            &*self.invoker,
            role,
            item,
            context,
            snapshot,
            self.role_timeout,
        )
        .await
    }
}

/// Settle one role: an invoker error or a blown deadline is captured as a
/// `Failure`, identical to a returned one.
async fn invoke_with_timeout(
    invoker: &dyn SpecialistInvoker,
    role: Role,
    item: &WorkItem,
    context: &ProjectContext,
    snapshot: ContextSnapshot,
    timeout: Duration,
) -> RoleOutput {
    match tokio::time::timeout(timeout, invoker.invoke(role, item, context, snapshot)).await {
        Ok(Ok(output)) => {
            debug!(role = %role, success = output.is_success(), "Specialist settled");
            output
        }
        Ok(Err(e)) => {
            warn!(role = %role, error = %e, "Specialist invocation failed");
            RoleOutput::failure(format!("invocation failed: {e}"))
        }
        Err(_) => {
            warn!(role = %role, timeout_secs = timeout.as_secs(), "Specialist timed out");
            RoleOutput::failure(format!("timed out after {}s", timeout.as_secs()))
        }
    }
}
