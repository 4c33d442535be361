//! Configuration: per-kind guards and controller policies, loaded from JSON.
//!
//! ```json
//! {
//!   "lookup_failure_policy": "propagate",
//!   "requeue": { "base_delay_ms": 5000, "multiplier": 2.0, "max_delay_ms": 300000, "jitter": 0.1 },
//!   "guards": [
//!     { "dependent_kind": "Database", "owner_kind": "DatabaseServer" },
//!     { "dependent_kind": "FirewallRule", "owner_kind": "DatabaseServer",
//!       "terminal_states": ["Succeeded", "Failed", "Canceled", "Ready"] }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::{ControllerBuilder, RequeuePolicy};
use crate::classifier::StateClassifier;
use crate::guard::OwnerStateGuard;
use crate::registry::RegistryError;
use crate::resolver::LookupFailurePolicy;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TOLLGATE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("TOLLGATE_CONFIG is not set")]
    MissingEnv,

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub lookup_failure_policy: LookupFailurePolicy,

    #[serde(default)]
    pub requeue: RequeueConfig,

    #[serde(default)]
    pub guards: Vec<GuardSpec>,
}

/// Guard for one dependent kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardSpec {
    pub dependent_kind: String,
    pub owner_kind: String,

    /// Omitted: database-server preset. Must not be empty when given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_states: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequeueConfig {
    pub base_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    pub jitter: f64,
}

impl Default for RequeueConfig {
    fn default() -> Self {
        let p = RequeuePolicy::default();
        Self {
            base_delay_ms: p.base_delay.as_millis() as u64,
            multiplier: p.multiplier,
            max_delay_ms: p.max_delay.as_millis() as u64,
            jitter: p.jitter,
        }
    }
}

impl From<&RequeueConfig> for RequeuePolicy {
    fn from(c: &RequeueConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(c.base_delay_ms),
            multiplier: c.multiplier,
            max_delay: Duration::from_millis(c.max_delay_ms),
            jitter: c.jitter,
        }
    }
}

impl GuardSpec {
    pub fn classifier(&self) -> StateClassifier {
        match &self.terminal_states {
            Some(states) => StateClassifier::new(states),
            None => StateClassifier::database_server(),
        }
    }
}

impl GuardConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_json_str(&raw)
    }

    /// Load from the file named by `TOLLGATE_CONFIG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV).ok_or(ConfigError::MissingEnv)?;
        Self::from_path(PathBuf::from(path))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for spec in &self.guards {
            if spec.dependent_kind.trim().is_empty() || spec.owner_kind.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "guard kinds must not be empty".to_string(),
                ));
            }
            if spec.terminal_states.is_some() && spec.classifier().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "terminal_states for {} is empty; every state would block",
                    spec.dependent_kind
                )));
            }
        }

        let r = &self.requeue;
        if !(r.multiplier.is_finite() && r.multiplier >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "requeue.multiplier must be >= 1.0, got {}",
                r.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&r.jitter) {
            return Err(ConfigError::Invalid(format!(
                "requeue.jitter must be within 0.0..=1.0, got {}",
                r.jitter
            )));
        }
        if r.max_delay_ms < r.base_delay_ms {
            return Err(ConfigError::Invalid(
                "requeue.max_delay_ms is smaller than requeue.base_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// A builder with every guard registered and policies applied.
    ///
    /// The caller still provides the owner state source.
    pub fn into_builder(self) -> Result<ControllerBuilder, ConfigError> {
        self.validate()?;
        let mut builder = ControllerBuilder::new()
            .with_lookup_failure_policy(self.lookup_failure_policy)
            .with_requeue_policy(RequeuePolicy::from(&self.requeue));
        for spec in &self.guards {
            let guard = OwnerStateGuard::new(spec.owner_kind.as_str(), spec.classifier());
            builder = builder.register(spec.dependent_kind.as_str(), guard)?;
        }
        Ok(builder)
    }
}
