//! Workflow executor behavior: exactly-once settlement, failure isolation,
//! and snapshot visibility across phases.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use boq_pilot::{
    AnalysisError, ContextSnapshot, ExecutionPlanner, ExecutorConfig, ProjectContext, Role,
    RoleOutput, SpecialistInvoker, WorkItem, WorkflowExecutor,
};

/// What a scripted specialist should do when invoked.
#[derive(Clone)]
enum Script {
    Succeed(f64),
    Fail(String),
    Panic,
    Hang(Duration),
}

/// Test double that records every invocation and the chain each role saw.
struct ScriptedInvoker {
    scripts: HashMap<Role, Script>,
    calls: Mutex<Vec<Role>>,
    visible_chains: Mutex<HashMap<Role, BTreeSet<Role>>>,
}

impl ScriptedInvoker {
    fn new(scripts: impl IntoIterator<Item = (Role, Script)>) -> Arc<Self> {
        Arc::new(Self {
            scripts: scripts.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
            visible_chains: Mutex::new(HashMap::new()),
        })
    }

    fn calls(&self) -> Vec<Role> {
        self.calls.lock().unwrap().clone()
    }

    fn visible_to(&self, role: Role) -> BTreeSet<Role> {
        self.visible_chains.lock().unwrap()[&role].clone()
    }
}

#[async_trait]
impl SpecialistInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        role: Role,
        _item: &WorkItem,
        _context: &ProjectContext,
        chain: ContextSnapshot,
    ) -> boq_pilot::Result<RoleOutput> {
        self.calls.lock().unwrap().push(role);
        self.visible_chains
            .lock()
            .unwrap()
            .insert(role, chain.roles().collect());

        match &self.scripts[&role] {
            Script::Succeed(confidence) => {
                Ok(RoleOutput::success(json!({"role": role.as_str()}), *confidence))
            }
            Script::Fail(reason) => Err(AnalysisError::Invocation(reason.clone())),
            Script::Panic => panic!("scripted panic in {role}"),
            Script::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(RoleOutput::success(json!({}), 1.0))
            }
        }
    }
}

fn all_succeed() -> Vec<(Role, Script)> {
    Role::ALL.map(|role| (role, Script::Succeed(0.9))).to_vec()
}

fn work_item() -> WorkItem {
    WorkItem::new(
        "Foundation works",
        vec![boq_pilot::RowEntry::new("01.01", "C25/30 slab", 80.0, "m3")],
    )
}

fn executor(invoker: Arc<ScriptedInvoker>) -> WorkflowExecutor {
    WorkflowExecutor::new(invoker, &ExecutorConfig::default())
}

fn full_plan() -> boq_pilot::ExecutionPlan {
    ExecutionPlanner::new()
        .plan(&Role::ALL.into_iter().collect())
        .unwrap()
}

#[tokio::test]
async fn test_every_role_invoked_exactly_once() {
    let invoker = ScriptedInvoker::new(all_succeed());
    let outputs = executor(Arc::clone(&invoker))
        .execute(&full_plan(), &work_item(), &ProjectContext::default())
        .await;

    assert_eq!(outputs.len(), Role::ALL.len());
    let calls = invoker.calls();
    assert_eq!(calls.len(), Role::ALL.len());
    for role in Role::ALL {
        assert_eq!(calls.iter().filter(|r| **r == role).count(), 1, "{role}");
    }
}

#[tokio::test]
async fn test_exactly_once_despite_failures() {
    let mut scripts = all_succeed();
    scripts[1] = (Role::Structural, Script::Fail("model unavailable".into()));

    let invoker = ScriptedInvoker::new(scripts);
    let outputs = executor(Arc::clone(&invoker))
        .execute(&full_plan(), &work_item(), &ProjectContext::default())
        .await;

    assert_eq!(invoker.calls().len(), Role::ALL.len());
    assert!(!outputs[&Role::Structural].is_success());
    // Later phases still ran.
    assert!(outputs[&Role::Materials].is_success());
    assert!(outputs[&Role::Cost].is_success());
}

#[tokio::test]
async fn test_parallel_sibling_panic_is_isolated() {
    let mut scripts = all_succeed();
    scripts[3] = (Role::Standards, Script::Panic);

    let invoker = ScriptedInvoker::new(scripts);
    let outputs = executor(Arc::clone(&invoker))
        .execute(&full_plan(), &work_item(), &ProjectContext::default())
        .await;

    let standards = &outputs[&Role::Standards];
    assert!(!standards.is_success());

    // Siblings of the panicking role settled successfully.
    assert!(outputs[&Role::Structural].is_success());
    assert!(outputs[&Role::MandatoryRules].is_success());
    // And the plan kept advancing past the parallel phase.
    assert!(outputs[&Role::Materials].is_success());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_becomes_failure() {
    let mut scripts = all_succeed();
    scripts[4] = (
        Role::MandatoryRules,
        Script::Hang(Duration::from_secs(600)),
    );

    let config = ExecutorConfig {
        role_timeout_secs: 5,
        ..ExecutorConfig::default()
    };
    let invoker = ScriptedInvoker::new(scripts);
    let outputs = WorkflowExecutor::new(invoker.clone() as Arc<dyn SpecialistInvoker>, &config)
        .execute(&full_plan(), &work_item(), &ProjectContext::default())
        .await;

    match &outputs[&Role::MandatoryRules] {
        RoleOutput::Failure { reason } => assert!(reason.contains("timed out")),
        RoleOutput::Success { .. } => panic!("expected timeout failure"),
    }
    assert_eq!(invoker.calls().len(), Role::ALL.len());
}

#[tokio::test]
async fn test_parallel_roles_share_one_frozen_snapshot() {
    let invoker = ScriptedInvoker::new(all_succeed());
    executor(Arc::clone(&invoker))
        .execute(&full_plan(), &work_item(), &ProjectContext::default())
        .await;

    // The parallel phase runs after document validation: each member sees
    // the validator's output and nothing from its siblings.
    let expected = BTreeSet::from([Role::DocumentValidator]);
    for role in [Role::Structural, Role::Standards, Role::MandatoryRules] {
        assert_eq!(invoker.visible_to(role), expected, "{role}");
    }
}

#[tokio::test]
async fn test_sequential_roles_see_all_prior_outputs() {
    let invoker = ScriptedInvoker::new(all_succeed());
    executor(Arc::clone(&invoker))
        .execute(&full_plan(), &work_item(), &ProjectContext::default())
        .await;

    assert_eq!(invoker.visible_to(Role::DocumentValidator), BTreeSet::new());
    assert_eq!(
        invoker.visible_to(Role::Materials),
        BTreeSet::from([
            Role::DocumentValidator,
            Role::Structural,
            Role::Standards,
            Role::MandatoryRules,
        ])
    );
    assert_eq!(
        invoker.visible_to(Role::Cost),
        BTreeSet::from([
            Role::DocumentValidator,
            Role::Structural,
            Role::Materials,
            Role::Standards,
            Role::MandatoryRules,
        ])
    );
}

#[tokio::test]
async fn test_failed_role_output_still_enters_chain() {
    let mut scripts = all_succeed();
    scripts[0] = (Role::DocumentValidator, Script::Fail("parse error".into()));

    let invoker = ScriptedInvoker::new(scripts);
    executor(Arc::clone(&invoker))
        .execute(&full_plan(), &work_item(), &ProjectContext::default())
        .await;

    // The failure is appended to the chain and visible downstream.
    assert!(invoker
        .visible_to(Role::Structural)
        .contains(&Role::DocumentValidator));
}
