//! Planner collaborators: turn a domain + problem pair into an action sequence.
//!
//! The planning algorithm itself is external; this module only invokes it and
//! reads back the ordered `(name, args)` steps.

mod command;

pub use command::CommandPlanner;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::config::PlannerConfig;
use crate::endpoint::BoxFuture;
use crate::types::{ActionDescriptor, Plan};

pub trait Planner: Send + Sync {
    /// Produce a plan for the given inputs. An empty plan means no plan exists.
    fn plan<'a>(&'a self, domain: &'a str, problem: &'a str) -> BoxFuture<'a, Result<Plan>>;
}

/// Returns the same sequence for every request.
#[derive(Debug, Clone, Default)]
pub struct StaticPlanner {
    steps: Plan,
}

impl StaticPlanner {
    pub fn new(steps: Plan) -> Self {
        Self { steps }
    }
}

impl Planner for StaticPlanner {
    fn plan<'a>(&'a self, _domain: &'a str, _problem: &'a str) -> BoxFuture<'a, Result<Plan>> {
        Box::pin(async move { Ok(self.steps.clone()) })
    }
}

/// Build the planner described by the configuration. Without one, every
/// request yields an empty plan.
pub fn from_config(config: Option<&PlannerConfig>) -> Arc<dyn Planner> {
    match config {
        Some(cfg) => match &cfg.command {
            Some(command) => Arc::new(
                CommandPlanner::new(command.clone(), cfg.args.clone())
                    .with_plan_file(cfg.plan_file.clone())
                    .with_timeout(cfg.timeout_secs.map(Duration::from_secs)),
            ),
            None => Arc::new(StaticPlanner::new(cfg.steps.clone())),
        },
        None => {
            tracing::warn!("No planner configured; create_plan will always report no plan");
            Arc::new(StaticPlanner::default())
        }
    }
}

/// Parse planner output in the IPC plan format.
///
/// Each step is a line starting with a parenthesised action such as
/// `(move a b)`, optionally behind a `<time>:` prefix as in `0.000: (move a b) [1]`.
/// `;` starts a comment. Any other line is skipped, even when it contains
/// parentheses (`Plan length: 2 step(s).`), so planner log output can be mixed
/// in as long as the steps themselves are in this form.
pub fn parse_plan(text: &str) -> Result<Plan> {
    let mut plan = Vec::new();

    for (lineno, raw) in text.lines().enumerate() {
        let line = match raw.find(';') {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let Some(step) = step_body(line) else {
            continue;
        };
        let close = step
            .find(')')
            .ok_or_else(|| anyhow!("unterminated step on line {}: `{}`", lineno + 1, raw.trim()))?;

        let mut tokens = step[1..close].split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| anyhow!("empty step on line {}", lineno + 1))?;
        plan.push(ActionDescriptor::new(name, tokens));
    }

    Ok(plan)
}

/// The part of `line` starting at the step's `(`, if the line is a step.
fn step_body(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('(') {
        return Some(line);
    }

    let (prefix, rest) = line.split_once(':')?;
    let prefix = prefix.trim();
    let numeric = !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit() || c == '.');
    let rest = rest.trim_start();
    (numeric && rest.starts_with('(')).then_some(rest)
}
