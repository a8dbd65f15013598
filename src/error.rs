//! Error kinds surfaced by the runtime and the `{success, message}` response
//! every request surface returns.
//!
//! None of these errors are fatal: each one is converted into a failed
//! [`RuntimeResponse`] and the runtime keeps serving requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recoverable failures of registry, plan and execution operations.
///
/// The `Display` output of each variant is the message handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Malformed load or registration request.
    #[error("{0}")]
    InvalidRequest(String),

    /// The executor handle for an action could not be constructed.
    #[error("Cannot register action '{name}': {reason}")]
    DuplicateOrInvalid { name: String, reason: String },

    /// The observer endpoint for a condition could not be resolved.
    #[error("Service for condition '{name}' not found: {reason}")]
    ObserverUnavailable { name: String, reason: String },

    #[error("No domain loaded")]
    MissingDomain,

    #[error("No problem loaded")]
    MissingProblem,

    /// The planner produced a zero-length plan.
    #[error("No plan found")]
    EmptyPlan,

    /// The planner itself failed before producing a plan.
    #[error("No plan found: {0}")]
    PlannerFailed(String),

    #[error("No action registered with name '{0}'")]
    ActionNotFound(String),

    #[error("No observer registered for condition '{0}'")]
    ConditionNotFound(String),

    /// The call to an executor or observer did not complete.
    #[error("Call to '{name}' failed: {reason}")]
    CallFailure { name: String, reason: String },

    #[error("No plan loaded")]
    NoPlan,
}

impl RuntimeError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// True for both unknown-action and unknown-condition lookups.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ActionNotFound(_) | Self::ConditionNotFound(_))
    }
}

/// Wire response shared by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl RuntimeResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<RuntimeError> for RuntimeResponse {
    fn from(err: RuntimeError) -> Self {
        Self::failure(err.to_string())
    }
}

impl<T> From<Result<T, RuntimeError>> for RuntimeResponse {
    fn from(result: Result<T, RuntimeError>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => e.into(),
        }
    }
}
