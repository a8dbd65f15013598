//! Data model shared by the registry, plan store and execution engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::config::EndpointConfig;
use crate::error::RuntimeError;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

newtype_string!(
    /// Opaque planning input (a domain or problem file path), handed to the
    /// planner untouched.
    PddlSource
);

/// One step of a plan: an action name plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ActionDescriptor {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")
    }
}

/// A predicate checked through a registered observer. Also the request
/// body of `observe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionDescriptor {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ConditionDescriptor {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// An ordered action sequence produced by the planner.
pub type Plan = Vec<ActionDescriptor>;

/// Result reported by an action executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Result reported by a condition observer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationResult {
    pub success: bool,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Which planning input slot a load request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PddlKind {
    Domain,
    Problem,
}

impl PddlKind {
    /// Resolve the request flags. The domain flag takes precedence when both are set.
    pub fn from_flags(domain: bool, problem: bool) -> Result<Self, RuntimeError> {
        if domain {
            Ok(Self::Domain)
        } else if problem {
            Ok(Self::Problem)
        } else {
            Err(RuntimeError::invalid_request(
                "Request must specify either domain or problem",
            ))
        }
    }
}

/// Lifecycle of the stored plan as seen by `run_plan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    NoPlan,
    Ready,
    Running,
    Completed,
    Failed,
}

/// Outcome of one `run_plan` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    pub run_id: Uuid,
    pub state: PlanState,
    pub steps_total: usize,
    /// Number of steps whose executor was invoked.
    pub steps_run: usize,
    /// Zero-based index of the failing step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<usize>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PlanReport {
    pub fn success(&self) -> bool {
        self.state == PlanState::Completed
    }
}

// Request payloads accepted by the REST and MCP surfaces.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadPddlRequest {
    #[serde(default)]
    pub domain: bool,
    #[serde(default)]
    pub problem: bool,
    pub filepath: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub target: EndpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}
