//! The runtime context: registry, plan store and planner behind one owner.
//!
//! Every request surface holds a [`SharedRuntime`] and locks it for the whole
//! request, so registry mutation, plan rebuilds and plan execution never
//! interleave.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{EndpointConfig, RuntimeConfig};
use crate::endpoint::{EndpointFactory, McpEndpointFactory};
use crate::error::RuntimeError;
use crate::executor;
use crate::plan_store::PlanStore;
use crate::planner::{self, Planner};
use crate::registry::Registry;
use crate::types::{
    ActionDescriptor, ActionResult, ConditionDescriptor, ObservationResult, PddlKind, PddlSource, PlanReport, PlanState,
};

#[cfg(test)]
mod integration_tests;

pub type SharedRuntime = Arc<Mutex<ActionRuntime>>;

/// Snapshot returned by the `status` operation.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    pub actions: Vec<String>,
    pub conditions: Vec<String>,
    pub domain: Option<PddlSource>,
    pub problem: Option<PddlSource>,
    pub plan: Option<Vec<ActionDescriptor>>,
    pub plan_state: PlanState,
    pub last_run: Option<PlanReport>,
}

/// Counts from applying a configuration at startup.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub actions: usize,
    pub conditions: usize,
    pub failed: usize,
}

pub struct ActionRuntime {
    registry: Registry,
    plan_store: PlanStore,
    planner: Arc<dyn Planner>,
    endpoints: Arc<dyn EndpointFactory>,
    plan_state: PlanState,
    last_run: Option<PlanReport>,
}

impl ActionRuntime {
    /// Create a runtime with an empty registry and no plan.
    pub fn new(planner: Arc<dyn Planner>, endpoints: Arc<dyn EndpointFactory>) -> Self {
        Self {
            registry: Registry::new(),
            plan_store: PlanStore::new(),
            planner,
            endpoints,
            plan_state: PlanState::NoPlan,
            last_run: None,
        }
    }

    /// Build a runtime from configuration: planner, MCP endpoints, and the
    /// configured registrations and planning inputs.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        let endpoints = McpEndpointFactory::new(config.call_timeout_secs.map(Duration::from_secs));
        let mut runtime = Self::new(
            planner::from_config(config.planner.as_ref()),
            Arc::new(endpoints),
        );
        let summary = runtime.bootstrap(config);
        info!(
            actions = summary.actions,
            conditions = summary.conditions,
            failed = summary.failed,
            "Runtime bootstrapped from configuration"
        );
        runtime
    }

    pub fn into_shared(self) -> SharedRuntime {
        Arc::new(Mutex::new(self))
    }

    /// Register configured actions/conditions and load configured inputs.
    /// Registrations that fail are logged and skipped.
    pub fn bootstrap(&mut self, config: &RuntimeConfig) -> BootstrapSummary {
        let mut summary = BootstrapSummary::default();

        for (name, target) in &config.actions {
            if target.disabled {
                info!(action = %name, "Skipping disabled action");
                continue;
            }
            match self.register_action(name, target) {
                Ok(()) => summary.actions += 1,
                Err(e) => {
                    warn!("{}", e);
                    summary.failed += 1;
                }
            }
        }

        for (name, target) in &config.conditions {
            if target.disabled {
                info!(condition = %name, "Skipping disabled condition");
                continue;
            }
            match self.register_condition(name, target) {
                Ok(()) => summary.conditions += 1,
                Err(e) => {
                    warn!("{}", e);
                    summary.failed += 1;
                }
            }
        }

        if let Some(domain) = &config.domain {
            self.plan_store.load(PddlKind::Domain, PddlSource::new(domain.clone()));
        }
        if let Some(problem) = &config.problem {
            self.plan_store.load(PddlKind::Problem, PddlSource::new(problem.clone()));
        }

        summary
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn plan(&self) -> Option<&[ActionDescriptor]> {
        self.plan_store.plan()
    }

    pub fn plan_state(&self) -> PlanState {
        self.plan_state
    }

    pub fn last_run(&self) -> Option<&PlanReport> {
        self.last_run.as_ref()
    }

    pub fn load_pddl(
        &mut self,
        domain: bool,
        problem: bool,
        filepath: &str,
    ) -> Result<PddlKind, RuntimeError> {
        let kind = PddlKind::from_flags(domain, problem)?;
        if filepath.trim().is_empty() {
            return Err(RuntimeError::invalid_request("Request must specify a filepath"));
        }
        info!(?kind, filepath, "Loaded planning input");
        self.plan_store.load(kind, PddlSource::new(filepath));
        Ok(kind)
    }

    /// Build a new plan from the loaded inputs.
    ///
    /// The previous plan is dropped before anything else, so any failure
    /// leaves the runtime without a plan.
    pub async fn create_plan(&mut self) -> Result<usize, RuntimeError> {
        self.plan_store.clear_plan();
        self.plan_state = PlanState::NoPlan;
        self.last_run = None;

        let (domain, problem) = {
            let (domain, problem) = self.plan_store.inputs()?;
            (domain.as_str().to_string(), problem.as_str().to_string())
        };

        let plan = self
            .planner
            .plan(&domain, &problem)
            .await
            .map_err(|e| RuntimeError::PlannerFailed(e.to_string()))?;

        let steps = self.plan_store.set_plan(plan)?;
        self.plan_state = PlanState::Ready;
        info!(steps, %domain, %problem, "Plan created");
        Ok(steps)
    }

    pub fn register_action(&mut self, name: &str, target: &EndpointConfig) -> Result<(), RuntimeError> {
        let handle = self.endpoints.action_executor(name, target)?;
        self.registry.register_action(name, handle)
    }

    pub fn register_condition(
        &mut self,
        name: &str,
        target: &EndpointConfig,
    ) -> Result<(), RuntimeError> {
        let handle = self.endpoints.condition_observer(name, target)?;
        self.registry.register_condition(name, handle)
    }

    pub async fn run_action(&self, name: &str, args: &[String]) -> ActionResult {
        executor::run_action(&self.registry, name, args).await
    }

    /// Execute the stored plan from its first step. The plan stays stored
    /// whatever the outcome.
    pub async fn run_plan(&mut self) -> Result<PlanReport, RuntimeError> {
        let plan = self.plan_store.plan().ok_or(RuntimeError::NoPlan)?;

        self.plan_state = PlanState::Running;
        let report = executor::run_plan(&self.registry, plan).await;
        self.plan_state = report.state;
        self.last_run = Some(report.clone());

        Ok(report)
    }

    pub async fn observe(
        &self,
        condition: &ConditionDescriptor,
    ) -> Result<ObservationResult, RuntimeError> {
        executor::observe(&self.registry, &condition.name, &condition.args).await
    }

    pub fn status(&self) -> RuntimeStatus {
        RuntimeStatus {
            actions: self.registry.action_names(),
            conditions: self.registry.condition_names(),
            domain: self.plan_store.domain().cloned(),
            problem: self.plan_store.problem().cloned(),
            plan: self.plan_store.plan().map(|p| p.to_vec()),
            plan_state: self.plan_state,
            last_run: self.last_run.clone(),
        }
    }
}
