//! End-to-end scenarios over the runtime: load → plan → run, with recording
//! fakes standing in for the planner and the remote executors.

use std::sync::Arc;

use crate::config::{EndpointConfig, RuntimeConfig};
use crate::error::{RuntimeError, RuntimeResponse};
use crate::runtime::ActionRuntime;
use crate::test_support::{CallLog, FakeEndpoints, RecordingExecutor, RecordingObserver, RecordingPlanner};
use crate::types::{ActionDescriptor, ActionResult, ConditionDescriptor, PlanState};

fn move_pick_plan() -> Vec<ActionDescriptor> {
    vec![
        ActionDescriptor::new("move", ["a", "b"]),
        ActionDescriptor::new("pick", ["x"]),
    ]
}

fn runtime_with(planner: Arc<RecordingPlanner>, endpoints: FakeEndpoints) -> ActionRuntime {
    ActionRuntime::new(planner, Arc::new(endpoints))
}

fn target(tool: &str) -> EndpointConfig {
    EndpointConfig::stdio("robot-executor").with_tool(tool)
}

#[tokio::test]
async fn test_gripper_jammed_scenario() {
    let log = CallLog::default();
    let endpoints = FakeEndpoints::default()
        .with_executor("move", RecordingExecutor::new("move", ActionResult::success(""), &log))
        .with_executor(
            "pick",
            RecordingExecutor::new("pick", ActionResult::failure("gripper jammed"), &log),
        );
    let mut runtime = runtime_with(RecordingPlanner::returning(move_pick_plan(), &log), endpoints);

    runtime.register_action("move", &target("move")).unwrap();
    runtime.register_action("pick", &target("pick")).unwrap();
    runtime.load_pddl(true, false, "D").unwrap();
    runtime.load_pddl(false, true, "P").unwrap();
    assert_eq!(runtime.create_plan().await, Ok(2));

    let report = runtime.run_plan().await.unwrap();
    let response = RuntimeResponse {
        success: report.success(),
        message: report.message.clone(),
    };

    assert_eq!(response, RuntimeResponse::failure("gripper jammed"));
    assert_eq!(log.count("move"), 1);
    assert_eq!(log.count("pick"), 1);
    assert_eq!(runtime.plan_state(), PlanState::Failed);
}

#[tokio::test]
async fn test_create_plan_without_domain() {
    let log = CallLog::default();
    let mut runtime = runtime_with(
        RecordingPlanner::returning(move_pick_plan(), &log),
        FakeEndpoints::default(),
    );

    let response: RuntimeResponse = runtime.create_plan().await.into();

    assert_eq!(response, RuntimeResponse::failure("No domain loaded"));
    assert_eq!(log.count("planner"), 0);
}

#[tokio::test]
async fn test_failed_rebuild_clears_previous_plan() {
    let log = CallLog::default();
    let planner = RecordingPlanner::sequence(vec![Ok(move_pick_plan()), Ok(Vec::new())], &log);
    let mut runtime = runtime_with(planner, FakeEndpoints::default());
    runtime.load_pddl(true, false, "D").unwrap();
    runtime.load_pddl(false, true, "P").unwrap();
    runtime.create_plan().await.unwrap();
    assert!(runtime.plan().is_some());
    assert_eq!(runtime.plan_state(), PlanState::Ready);

    assert_eq!(runtime.create_plan().await, Err(RuntimeError::EmptyPlan));
    assert!(runtime.plan().is_none());
    assert_eq!(runtime.plan_state(), PlanState::NoPlan);
    assert_eq!(runtime.run_plan().await.unwrap_err(), RuntimeError::NoPlan);
}

#[tokio::test]
async fn test_create_plan_without_problem() {
    let log = CallLog::default();
    let mut runtime = runtime_with(
        RecordingPlanner::returning(move_pick_plan(), &log),
        FakeEndpoints::default(),
    );
    runtime.load_pddl(true, false, "D").unwrap();

    let response: RuntimeResponse = runtime.create_plan().await.into();

    assert_eq!(response, RuntimeResponse::failure("No problem loaded"));
    assert_eq!(log.count("planner"), 0);
    assert!(runtime.plan().is_none());
}

#[tokio::test]
async fn test_empty_planner_result_leaves_no_plan() {
    let log = CallLog::default();
    let mut runtime = runtime_with(RecordingPlanner::returning(Vec::new(), &log), FakeEndpoints::default());
    runtime.load_pddl(true, false, "D").unwrap();
    runtime.load_pddl(false, true, "P").unwrap();

    let response: RuntimeResponse = runtime.create_plan().await.into();

    assert_eq!(response, RuntimeResponse::failure("No plan found"));
    assert_eq!(log.count("planner"), 1);
    assert!(runtime.plan().is_none());
    assert_eq!(runtime.plan_state(), PlanState::NoPlan);
}

#[tokio::test]
async fn test_planner_error_clears_stale_plan() {
    let log = CallLog::default();
    let planner = RecordingPlanner::sequence(
        vec![Ok(move_pick_plan()), Err("unsolvable".to_string())],
        &log,
    );
    let mut runtime = runtime_with(planner.clone(), FakeEndpoints::default());
    runtime.load_pddl(true, false, "D").unwrap();
    runtime.load_pddl(false, true, "P").unwrap();
    runtime.create_plan().await.unwrap();

    runtime.load_pddl(false, true, "P2").unwrap();
    let err = runtime.create_plan().await.unwrap_err();

    assert_eq!(err.to_string(), "No plan found: unsolvable");
    assert!(runtime.plan().is_none());
    assert_eq!(
        planner.inputs(),
        vec![
            ("D".to_string(), "P".to_string()),
            ("D".to_string(), "P2".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_run_plan_twice_repeats_sequence() {
    let log = CallLog::default();
    let endpoints = FakeEndpoints::default()
        .with_executor("move", RecordingExecutor::new("move", ActionResult::success(""), &log))
        .with_executor("pick", RecordingExecutor::new("pick", ActionResult::success(""), &log));
    let mut runtime = runtime_with(RecordingPlanner::returning(move_pick_plan(), &log), endpoints);
    runtime.register_action("move", &target("move")).unwrap();
    runtime.register_action("pick", &target("pick")).unwrap();
    runtime.load_pddl(true, false, "D").unwrap();
    runtime.load_pddl(false, true, "P").unwrap();
    runtime.create_plan().await.unwrap();

    let first = runtime.run_plan().await.unwrap();
    let second = runtime.run_plan().await.unwrap();

    assert!(first.success() && second.success());
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(log.calls(), vec!["planner", "move", "pick", "move", "pick"]);
    assert_eq!(runtime.plan_state(), PlanState::Completed);
    assert_eq!(runtime.plan().map(|p| p.len()), Some(2));
}

#[tokio::test]
async fn test_run_plan_without_plan() {
    let log = CallLog::default();
    let mut runtime = runtime_with(RecordingPlanner::returning(Vec::new(), &log), FakeEndpoints::default());

    let response: RuntimeResponse = runtime.run_plan().await.into();
    assert_eq!(response, RuntimeResponse::failure("No plan loaded"));
}

#[tokio::test]
async fn test_failed_registration_does_not_mutate_registry() {
    let log = CallLog::default();
    let endpoints = FakeEndpoints::default()
        .with_executor("move", RecordingExecutor::new("move-v1", ActionResult::success(""), &log))
        .with_observer("holding", RecordingObserver::new("holding", &log));
    let mut runtime = runtime_with(RecordingPlanner::returning(Vec::new(), &log), endpoints);

    runtime.register_action("move", &target("move")).unwrap();

    let err = runtime
        .register_action("move", &EndpointConfig::http("not a url"))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::DuplicateOrInvalid { .. }));

    let err = runtime
        .register_condition("holding", &EndpointConfig::default())
        .unwrap_err();
    assert!(matches!(err, RuntimeError::ObserverUnavailable { .. }));
    assert!(runtime.registry().condition_names().is_empty());

    // The first handle is still in place.
    assert!(runtime.run_action("move", &[]).await.success);
    assert_eq!(log.calls(), vec!["move-v1"]);
}

#[tokio::test]
async fn test_reregistration_overwrites() {
    let log = CallLog::default();
    let endpoints = FakeEndpoints::default()
        .with_executor("move_v1", RecordingExecutor::new("v1", ActionResult::success(""), &log))
        .with_executor("move_v2", RecordingExecutor::new("v2", ActionResult::success(""), &log));
    let mut runtime = runtime_with(RecordingPlanner::returning(Vec::new(), &log), endpoints);

    runtime.register_action("move", &target("move_v1")).unwrap();
    runtime.register_action("move", &target("move_v2")).unwrap();
    runtime.run_action("move", &[]).await;

    assert_eq!(log.calls(), vec!["v2"]);
}

#[tokio::test]
async fn test_observe_is_out_of_band() {
    let log = CallLog::default();
    let endpoints = FakeEndpoints::default()
        .with_executor("move", RecordingExecutor::new("move", ActionResult::success(""), &log))
        .with_observer("holding", RecordingObserver::new("holding", &log));
    let mut runtime = runtime_with(
        RecordingPlanner::returning(vec![ActionDescriptor::new("move", ["a", "b"])], &log),
        endpoints,
    );
    runtime.register_action("move", &target("move")).unwrap();
    runtime.register_condition("holding", &target("holding")).unwrap();
    runtime.load_pddl(true, false, "D").unwrap();
    runtime.load_pddl(false, true, "P").unwrap();
    runtime.create_plan().await.unwrap();
    runtime.run_plan().await.unwrap();

    assert_eq!(log.count("holding"), 0);

    let observation = runtime
        .observe(&ConditionDescriptor::new("holding", ["x"]))
        .await
        .unwrap();
    assert!(observation.success);
    assert_eq!(log.count("holding"), 1);
}

#[tokio::test]
async fn test_load_pddl_validation() {
    let log = CallLog::default();
    let mut runtime = runtime_with(RecordingPlanner::returning(Vec::new(), &log), FakeEndpoints::default());

    let response: RuntimeResponse = runtime.load_pddl(false, false, "d.pddl").into();
    assert_eq!(
        response,
        RuntimeResponse::failure("Request must specify either domain or problem")
    );
    assert!(runtime.load_pddl(true, false, "").is_err());
    assert!(runtime.status().domain.is_none());
}

#[tokio::test]
async fn test_bootstrap_registers_configured_endpoints() {
    let log = CallLog::default();
    let endpoints = FakeEndpoints::default()
        .with_executor("move", RecordingExecutor::new("move", ActionResult::success(""), &log))
        .with_observer("holding", RecordingObserver::new("holding", &log));
    let mut runtime = runtime_with(RecordingPlanner::returning(Vec::new(), &log), endpoints);

    let config = RuntimeConfig::from_json(
        r#"{
            "actions": {
                "move": { "command": "robot-executor" },
                "broken": { "url": "nope" },
                "off": { "command": "robot-executor", "disabled": true }
            },
            "conditions": { "holding": { "command": "robot-observer" } },
            "domain": "domain.pddl",
            "problem": "problem.pddl"
        }"#,
    )
    .unwrap();

    let summary = runtime.bootstrap(&config);

    assert_eq!(summary.actions, 1);
    assert_eq!(summary.conditions, 1);
    assert_eq!(summary.failed, 1);

    let status = runtime.status();
    assert_eq!(status.actions, vec!["move".to_string()]);
    assert_eq!(status.conditions, vec!["holding".to_string()]);
    assert_eq!(status.domain.map(|d| d.to_string()), Some("domain.pddl".to_string()));
    assert_eq!(status.problem.map(|p| p.to_string()), Some("problem.pddl".to_string()));
    assert_eq!(status.plan_state, PlanState::NoPlan);
}

#[cfg(unix)]
#[tokio::test]
async fn test_configured_call_timeout_bounds_hung_executor() {
    let config = RuntimeConfig::from_json(
        r#"{
            "actions": { "hang": { "command": "sleep", "args": ["30"] } },
            "call_timeout_secs": 1
        }"#,
    )
    .unwrap();
    let runtime = ActionRuntime::from_config(&config);
    assert_eq!(runtime.status().actions, vec!["hang".to_string()]);

    for _ in 0..2 {
        let started = std::time::Instant::now();
        let result = runtime.run_action("hang", &[]).await;

        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert!(!result.success);
        assert!(result.message.starts_with("Call to 'hang' failed: no response from `hang`"));
    }
}
