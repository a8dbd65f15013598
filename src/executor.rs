//! Execution engine: single actions, fail-fast plans, and out-of-band
//! observations, all dispatched through the registry's handles.
//!
//! Each call is awaited before the next one starts, so plan steps are observed
//! strictly in order.

use chrono::Utc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::RuntimeError;
use crate::registry::Registry;
use crate::types::{ActionDescriptor, ActionResult, ObservationResult, PlanReport, PlanState};

/// Execute a single action by:
/// 1. Looking up the executor registered under `name`.
/// 2. Performing exactly one call with `args`.
///
/// Unknown names and calls that fail to complete come back as a failed
/// [`ActionResult`]; an executor's own result is returned unmodified.
pub async fn run_action(registry: &Registry, name: &str, args: &[String]) -> ActionResult {
    let executor = match registry.lookup_action(name) {
        Ok(executor) => executor,
        Err(e) => {
            warn!(action = name, "{}", e);
            return ActionResult::failure(e.to_string());
        }
    };

    match executor.trigger(args).await {
        Ok(result) => {
            if !result.success {
                warn!(action = name, message = %result.message, "Action reported failure");
            }
            result
        }
        Err(e) => {
            let err = RuntimeError::CallFailure {
                name: name.to_string(),
                reason: e.to_string(),
            };
            warn!(action = name, "{}", err);
            ActionResult::failure(err.to_string())
        }
    }
}

/// Run `plan` step by step, stopping at the first step that does not succeed.
///
/// The failing step's message is carried into the report verbatim; no later
/// step is attempted and nothing is rolled back.
pub async fn run_plan(registry: &Registry, plan: &[ActionDescriptor]) -> PlanReport {
    let run_id = Uuid::new_v4();
    let span = info_span!("run_plan", %run_id, steps = plan.len());

    async move {
        let started_at = Utc::now();
        info!("Plan execution started");

        for (index, step) in plan.iter().enumerate() {
            info!(step = index, action = %step, "Running step");
            let result = run_action(registry, &step.name, &step.args).await;

            if !result.success {
                warn!(step = index, action = %step, "Plan execution failed");
                return PlanReport {
                    run_id,
                    state: PlanState::Failed,
                    steps_total: plan.len(),
                    steps_run: index + 1,
                    failed_step: Some(index),
                    message: result.message,
                    started_at,
                    finished_at: Utc::now(),
                };
            }
        }

        info!("Plan execution completed");
        PlanReport {
            run_id,
            state: PlanState::Completed,
            steps_total: plan.len(),
            steps_run: plan.len(),
            failed_step: None,
            message: String::new(),
            started_at,
            finished_at: Utc::now(),
        }
    }
    .instrument(span)
    .await
}

/// Query the observer registered for `condition`. Never used during plans.
pub async fn observe(
    registry: &Registry,
    condition: &str,
    args: &[String],
) -> Result<ObservationResult, RuntimeError> {
    let observer = registry.lookup_observer(condition)?;
    observer
        .observe(args)
        .await
        .map_err(|e| RuntimeError::CallFailure {
            name: condition.to_string(),
            reason: e.to_string(),
        })
}
