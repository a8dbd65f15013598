use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, env, fs, path::Path, path::PathBuf};

use crate::types::ActionDescriptor;

/// Contents of `runtime.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub planner: Option<PlannerConfig>,
    #[serde(default)]
    pub actions: BTreeMap<String, EndpointConfig>,
    #[serde(default)]
    pub conditions: BTreeMap<String, EndpointConfig>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    /// Upper bound on a single executor or observer call.
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
}

/// External planner invocation.
///
/// Either a `command` to run, or a fixed list of `steps` returned as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// File the planner writes its plan to; stdout is parsed when unset.
    /// `command`, `args` and `plan_file` get `${VAR}` expansion, except for
    /// `${DOMAIN}` and `${PROBLEM}`.
    #[serde(default)]
    pub plan_file: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub steps: Vec<ActionDescriptor>,
}

/// Where an action executor or condition observer lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    // stdio server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    // http server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Tool to call on the service; defaults to the registered name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default)]
    pub disabled: bool,
}

/// A validated endpoint address.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointTarget {
    Stdio {
        command: String,
        args: Vec<String>,
        env: BTreeMap<String, String>,
    },
    Http {
        url: url::Url,
    },
}

impl EndpointConfig {
    pub fn stdio(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Default::default()
        }
    }

    pub fn http(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Name of the remote tool backing the registration `name`.
    pub fn tool_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.tool.as_deref().unwrap_or(name)
    }

    pub fn resolve(&self) -> anyhow::Result<EndpointTarget> {
        if self.disabled {
            return Err(anyhow::anyhow!("endpoint is disabled"));
        }

        if let Some(cmd) = &self.command {
            if cmd.trim().is_empty() {
                return Err(anyhow::anyhow!("`command` must not be empty"));
            }
            return Ok(EndpointTarget::Stdio {
                command: cmd.clone(),
                args: self.args.clone(),
                env: self.env.clone(),
            });
        }

        if let Some(raw) = &self.url {
            let url = url::Url::parse(raw)
                .map_err(|e| anyhow::anyhow!("malformed url `{}`: {}", raw, e))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(anyhow::anyhow!(
                    "unsupported url scheme `{}` (expected http or https)",
                    url.scheme()
                ));
            }
            return Ok(EndpointTarget::Http { url });
        }

        Err(anyhow::anyhow!("endpoint must have either `command` or `url`"))
    }
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("ACTION_RUNTIME_CONFIG") {
        return Some(PathBuf::from(p));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg)
            .join("action-runtime")
            .join("runtime.json");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let candidate = PathBuf::from("runtime.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

/// Placeholders the planner substitutes itself; never taken from the environment.
const PLANNER_PLACEHOLDERS: [&str; 2] = ["DOMAIN", "PROBLEM"];

fn expand_env_vars(input: &str) -> String {
    expand_env_vars_keeping(input, &[])
}

/// Expand `${VAR}` from the environment, leaving unknown variables and the
/// names in `keep` as written.
fn expand_env_vars_keeping(input: &str, keep: &[&str]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            let value = if keep.contains(&name.as_str()) {
                None
            } else {
                env::var(&name).ok()
            };
            if let Some(val) = value {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}

fn expand_endpoint(cfg: EndpointConfig) -> EndpointConfig {
    let mut cfg = cfg;

    for val in cfg.env.values_mut() {
        *val = expand_env_vars(val);
    }
    if let Some(cmd) = cfg.command.as_mut() {
        *cmd = expand_env_vars(cmd);
    }
    cfg.args = cfg.args.into_iter().map(|a| expand_env_vars(&a)).collect();
    if let Some(url) = cfg.url.as_mut() {
        *url = expand_env_vars(url);
    }

    cfg
}

impl RuntimeConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mut cfg: RuntimeConfig = serde_json::from_str(raw)?;

        cfg.actions = cfg
            .actions
            .into_iter()
            .map(|(name, endpoint)| (name, expand_endpoint(endpoint)))
            .collect();
        cfg.conditions = cfg
            .conditions
            .into_iter()
            .map(|(name, endpoint)| (name, expand_endpoint(endpoint)))
            .collect();

        if let Some(planner) = cfg.planner.as_mut() {
            let expand = |v: &str| expand_env_vars_keeping(v, &PLANNER_PLACEHOLDERS);
            planner.command = planner.command.as_deref().map(expand);
            planner.args = planner.args.iter().map(|a| expand(a.as_str())).collect();
            planner.plan_file = planner.plan_file.as_deref().map(expand);
        }
        cfg.domain = cfg.domain.map(|d| expand_env_vars(&d));
        cfg.problem = cfg.problem.map(|p| expand_env_vars(&p));

        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::from_json(&raw)
    }

    /// Load the configuration from an explicit path, or the resolved default
    /// location. A missing default file yields an empty configuration.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => match resolve_config_path() {
                Some(p) => Self::load_from(&p),
                None => {
                    tracing::debug!("No runtime.json found, using empty configuration");
                    Ok(Self::default())
                }
            },
        }
    }
}
