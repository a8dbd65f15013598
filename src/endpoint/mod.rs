//! Executor handles: the invocable references the registry stores.
//!
//! Both kinds share one shape: a single call taking the ordered argument list.
//! An `Err` from a call means the call itself did not complete (transport
//! failure, timeout); an executor that ran and failed reports it through
//! `ActionResult::success == false` instead.

mod mcp;

pub use mcp::{McpEndpoint, McpEndpointFactory};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;

use crate::config::EndpointConfig;
use crate::error::RuntimeError;
use crate::types::{ActionResult, ObservationResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A side-effecting remote capability.
pub trait ActionExecutor: Send + Sync {
    fn trigger<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<ActionResult>>;
}

/// A read-only remote capability.
pub trait ConditionObserver: Send + Sync {
    fn observe<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<ObservationResult>>;
}

/// Builds executor handles from registration targets.
///
/// Construction failures map to `DuplicateOrInvalid` for actions and
/// `ObserverUnavailable` for conditions.
pub trait EndpointFactory: Send + Sync {
    fn action_executor(
        &self,
        name: &str,
        target: &EndpointConfig,
    ) -> Result<Arc<dyn ActionExecutor>, RuntimeError>;

    fn condition_observer(
        &self,
        name: &str,
        target: &EndpointConfig,
    ) -> Result<Arc<dyn ConditionObserver>, RuntimeError>;
}
