//! Boundary to the specialist analyzer implementations.

use async_trait::async_trait;

use crate::domain::{ContextSnapshot, ProjectContext, Role, RoleOutput, WorkItem};
use crate::error::Result;

/// Collaborator that runs one specialist against a work item.
///
/// Implementations may call a remote model API, a local rules engine, or a
/// test double - the orchestrator does not care. Returning `Err`, timing
/// out, or panicking are all equivalent to a returned `Failure`: the
/// executor captures them per role and never aborts the run.
#[async_trait]
pub trait SpecialistInvoker: Send + Sync {
    async fn invoke(
        &self,
        role: Role,
        item: &WorkItem,
        context: &ProjectContext,
        chain: ContextSnapshot,
    ) -> Result<RoleOutput>;
}
