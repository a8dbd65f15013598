//! Registry of action executors and condition observers, keyed by name.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::info;

use crate::endpoint::{ActionExecutor, ConditionObserver};
use crate::error::RuntimeError;

/// Name → handle mappings for actions and conditions.
///
/// Every name in `conditions` has an entry in `observers`. Re-registering a
/// name replaces its handle.
#[derive(Default)]
pub struct Registry {
    actions: HashMap<String, Arc<dyn ActionExecutor>>,
    conditions: BTreeSet<String>,
    observers: HashMap<String, Arc<dyn ConditionObserver>>,
}

fn validate_name(name: &str) -> Result<(), RuntimeError> {
    if name.trim().is_empty() {
        return Err(RuntimeError::invalid_request("Registration name must not be empty"));
    }
    Ok(())
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action executor, replacing any prior handle for `name`.
    pub fn register_action(
        &mut self,
        name: &str,
        handle: Arc<dyn ActionExecutor>,
    ) -> Result<(), RuntimeError> {
        validate_name(name)?;
        if self.actions.insert(name.to_string(), handle).is_some() {
            info!(action = name, "Replaced existing action registration");
        } else {
            info!(action = name, "Registered action");
        }
        Ok(())
    }

    /// Register a condition observer, replacing any prior handle for `name`.
    pub fn register_condition(
        &mut self,
        name: &str,
        handle: Arc<dyn ConditionObserver>,
    ) -> Result<(), RuntimeError> {
        validate_name(name)?;
        self.conditions.insert(name.to_string());
        if self.observers.insert(name.to_string(), handle).is_some() {
            info!(condition = name, "Replaced existing condition registration");
        } else {
            info!(condition = name, "Registered condition");
        }
        Ok(())
    }

    pub fn lookup_action(&self, name: &str) -> Result<&dyn ActionExecutor, RuntimeError> {
        self.actions
            .get(name)
            .map(|handle| handle.as_ref())
            .ok_or_else(|| RuntimeError::ActionNotFound(name.to_string()))
    }

    pub fn lookup_observer(&self, name: &str) -> Result<&dyn ConditionObserver, RuntimeError> {
        self.observers
            .get(name)
            .map(|handle| handle.as_ref())
            .ok_or_else(|| RuntimeError::ConditionNotFound(name.to_string()))
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Registered condition names, sorted.
    pub fn condition_names(&self) -> Vec<String> {
        self.conditions.iter().cloned().collect()
    }
}
