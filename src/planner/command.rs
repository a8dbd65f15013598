use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::process::Command;
use tracing::{debug, info};

use super::{Planner, parse_plan};
use crate::endpoint::BoxFuture;
use crate::types::Plan;

const DOMAIN_PLACEHOLDER: &str = "${DOMAIN}";
const PROBLEM_PLACEHOLDER: &str = "${PROBLEM}";

/// Runs an external planner process and parses the plan it prints (or writes
/// to `plan_file`).
///
/// `${DOMAIN}` and `${PROBLEM}` in the arguments and plan file are replaced by
/// the loaded inputs; when neither placeholder appears in the arguments, the
/// domain and problem are appended in that order.
#[derive(Debug, Clone)]
pub struct CommandPlanner {
    command: String,
    args: Vec<String>,
    plan_file: Option<String>,
    timeout: Option<Duration>,
}

fn substitute(template: &str, domain: &str, problem: &str) -> String {
    template
        .replace(DOMAIN_PLACEHOLDER, domain)
        .replace(PROBLEM_PLACEHOLDER, problem)
}

impl CommandPlanner {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            plan_file: None,
            timeout: None,
        }
    }

    pub fn with_plan_file(mut self, plan_file: Option<String>) -> Self {
        self.plan_file = plan_file;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_args(&self, domain: &str, problem: &str) -> Vec<String> {
        let templated = self
            .args
            .iter()
            .any(|a| a.contains(DOMAIN_PLACEHOLDER) || a.contains(PROBLEM_PLACEHOLDER));

        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| substitute(a, domain, problem))
            .collect();
        if !templated {
            args.push(domain.to_string());
            args.push(problem.to_string());
        }
        args
    }

    async fn run(&self, domain: &str, problem: &str) -> Result<Plan> {
        let args = self.command_args(domain, problem);
        info!(command = %self.command, ?args, "Invoking planner");

        let mut cmd = Command::new(&self.command);
        cmd.args(&args).kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| anyhow!("planner `{}` timed out after {:?}", self.command, limit))?,
            None => cmd.output().await,
        }
        .map_err(|e| anyhow!("failed to start planner `{}`: {}", self.command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "planner `{}` exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            ));
        }

        let text = match &self.plan_file {
            Some(template) => {
                let path = substitute(template, domain, problem);
                debug!(%path, "Reading plan file");
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| anyhow!("failed to read plan file {}: {}", path, e))?
            }
            None => String::from_utf8_lossy(&output.stdout).into_owned(),
        };

        parse_plan(&text)
    }
}

impl Planner for CommandPlanner {
    fn plan<'a>(&'a self, domain: &'a str, problem: &'a str) -> BoxFuture<'a, Result<Plan>> {
        Box::pin(self.run(domain, problem))
    }
}
