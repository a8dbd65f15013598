//! Holds the loaded domain/problem inputs and the current plan.

use crate::error::RuntimeError;
use crate::types::{ActionDescriptor, PddlKind, PddlSource, Plan};

#[derive(Debug, Default)]
pub struct PlanStore {
    domain: Option<PddlSource>,
    problem: Option<PddlSource>,
    plan: Option<Plan>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` under `kind`, replacing any previous input of that kind.
    pub fn load(&mut self, kind: PddlKind, payload: PddlSource) {
        match kind {
            PddlKind::Domain => self.domain = Some(payload),
            PddlKind::Problem => self.problem = Some(payload),
        }
    }

    pub fn domain(&self) -> Option<&PddlSource> {
        self.domain.as_ref()
    }

    pub fn problem(&self) -> Option<&PddlSource> {
        self.problem.as_ref()
    }

    /// Both planning inputs, domain checked first.
    pub fn inputs(&self) -> Result<(&PddlSource, &PddlSource), RuntimeError> {
        let domain = self.domain.as_ref().ok_or(RuntimeError::MissingDomain)?;
        let problem = self.problem.as_ref().ok_or(RuntimeError::MissingProblem)?;
        Ok((domain, problem))
    }

    pub fn clear_plan(&mut self) {
        self.plan = None;
    }

    /// Store a freshly built plan. An empty plan is rejected and leaves the
    /// store without a plan.
    pub fn set_plan(&mut self, plan: Plan) -> Result<usize, RuntimeError> {
        if plan.is_empty() {
            self.plan = None;
            return Err(RuntimeError::EmptyPlan);
        }
        let len = plan.len();
        self.plan = Some(plan);
        Ok(len)
    }

    pub fn plan(&self) -> Option<&[ActionDescriptor]> {
        self.plan.as_deref()
    }
}
