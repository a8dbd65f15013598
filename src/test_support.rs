//! Recording fakes for executors, observers, planners and endpoint factories.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use serde_json::json;

use crate::config::EndpointConfig;
use crate::endpoint::{ActionExecutor, BoxFuture, ConditionObserver, EndpointFactory};
use crate::error::RuntimeError;
use crate::planner::Planner;
use crate::types::{ActionResult, ObservationResult, Plan};

/// Ordered record of which fakes were invoked, shared between them.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == label).count()
    }
}

pub struct RecordingExecutor {
    label: String,
    result: Option<ActionResult>,
    log: CallLog,
    last_args: Mutex<Option<Vec<String>>>,
}

impl RecordingExecutor {
    pub fn new(label: &str, result: ActionResult, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            result: Some(result),
            log: log.clone(),
            last_args: Mutex::new(None),
        })
    }

    /// An executor whose call never completes successfully (transport error).
    pub fn unreachable(label: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            result: None,
            log: log.clone(),
            last_args: Mutex::new(None),
        })
    }

    pub fn last_args(&self) -> Option<Vec<String>> {
        self.last_args.lock().unwrap().clone()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn trigger<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<ActionResult>> {
        Box::pin(async move {
            self.log.record(self.label.clone());
            *self.last_args.lock().unwrap() = Some(args.to_vec());
            self.result
                .clone()
                .ok_or_else(|| anyhow!("connection refused"))
        })
    }
}

pub struct RecordingObserver {
    label: String,
    log: CallLog,
}

impl RecordingObserver {
    pub fn new(label: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            log: log.clone(),
        })
    }
}

impl ConditionObserver for RecordingObserver {
    fn observe<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<ObservationResult>> {
        Box::pin(async move {
            self.log.record(self.label.clone());
            Ok(ObservationResult {
                success: true,
                value: json!({ "observer": self.label, "args": args }),
                message: String::new(),
            })
        })
    }
}

/// Planner replaying a sequence of results and counting invocations. The last
/// result repeats once the sequence is exhausted.
pub struct RecordingPlanner {
    results: Mutex<VecDeque<std::result::Result<Plan, String>>>,
    log: CallLog,
    seen: Mutex<Vec<(String, String)>>,
}

impl RecordingPlanner {
    pub fn sequence(results: Vec<std::result::Result<Plan, String>>, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            log: log.clone(),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn returning(plan: Plan, log: &CallLog) -> Arc<Self> {
        Self::sequence(vec![Ok(plan)], log)
    }

    pub fn inputs(&self) -> Vec<(String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Planner for RecordingPlanner {
    fn plan<'a>(&'a self, domain: &'a str, problem: &'a str) -> BoxFuture<'a, Result<Plan>> {
        Box::pin(async move {
            self.log.record("planner");
            self.seen
                .lock()
                .unwrap()
                .push((domain.to_string(), problem.to_string()));
            let mut results = self.results.lock().unwrap();
            let next = if results.len() > 1 {
                results.pop_front()
            } else {
                results.front().cloned()
            };
            next.unwrap_or_else(|| Ok(Vec::new()))
                .map_err(|reason| anyhow!(reason))
        })
    }
}

/// Hands out pre-built fakes keyed by the target's tool name; targets that
/// fail to resolve are rejected the same way the MCP factory rejects them.
#[derive(Default)]
pub struct FakeEndpoints {
    pub executors: Mutex<HashMap<String, Arc<RecordingExecutor>>>,
    pub observers: Mutex<HashMap<String, Arc<RecordingObserver>>>,
}

impl FakeEndpoints {
    pub fn with_executor(self, tool: &str, executor: Arc<RecordingExecutor>) -> Self {
        self.executors
            .lock()
            .unwrap()
            .insert(tool.to_string(), executor);
        self
    }

    pub fn with_observer(self, tool: &str, observer: Arc<RecordingObserver>) -> Self {
        self.observers
            .lock()
            .unwrap()
            .insert(tool.to_string(), observer);
        self
    }
}

impl EndpointFactory for FakeEndpoints {
    fn action_executor(
        &self,
        name: &str,
        target: &EndpointConfig,
    ) -> std::result::Result<Arc<dyn ActionExecutor>, RuntimeError> {
        let invalid = |reason: String| RuntimeError::DuplicateOrInvalid {
            name: name.to_string(),
            reason,
        };
        target.resolve().map_err(|e| invalid(e.to_string()))?;
        let tool = target.tool_name(name);
        self.executors
            .lock()
            .unwrap()
            .get(tool)
            .cloned()
            .map(|e| e as Arc<dyn ActionExecutor>)
            .ok_or_else(|| invalid(format!("no fake executor for tool `{}`", tool)))
    }

    fn condition_observer(
        &self,
        name: &str,
        target: &EndpointConfig,
    ) -> std::result::Result<Arc<dyn ConditionObserver>, RuntimeError> {
        let unavailable = |reason: String| RuntimeError::ObserverUnavailable {
            name: name.to_string(),
            reason,
        };
        target.resolve().map_err(|e| unavailable(e.to_string()))?;
        let tool = target.tool_name(name);
        self.observers
            .lock()
            .unwrap()
            .get(tool)
            .cloned()
            .map(|o| o as Arc<dyn ConditionObserver>)
            .ok_or_else(|| unavailable(format!("no fake observer for tool `{}`", tool)))
    }
}
