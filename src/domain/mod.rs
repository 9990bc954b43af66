//! Data model shared across the orchestration pipeline.
//!
//! Every entity here is created fresh per `analyze()` call and owned by
//! that run; nothing is mutated by a second run.

mod output;
mod result;
mod role;
mod work_item;

pub use output::{ContextChain, ContextSnapshot, RoleOutput, RoleOutputs};
pub use result::{AnalysisResult, AnalysisStatus};
pub use role::{Role, Scheduling};
pub use work_item::{ProjectContext, RowEntry, WorkItem};
