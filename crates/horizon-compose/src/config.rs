//! Instantiator configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How expression animations are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpressionAnimationPolicy {
    /// One scratch expression animation per instantiation, fully reset and
    /// reconfigured for every occurrence. Relies on the native side copying
    /// animation state when an animation is started.
    Reuse,
    /// A distinct expression animation per source node, memoized like any
    /// other object.
    PerOccurrence,
}

impl Default for ExpressionAnimationPolicy {
    fn default() -> Self {
        if cfg!(feature = "fresh-expression-animations") {
            Self::PerOccurrence
        } else {
            Self::Reuse
        }
    }
}

/// Configuration for an [`Instantiator`](crate::Instantiator).
///
/// Can be loaded from TOML:
///
/// ```
/// use horizon_compose::{ExpressionAnimationPolicy, InstantiatorConfig};
///
/// let config = InstantiatorConfig::from_toml_str(r#"
/// expression-animations = "per-occurrence"
/// "#)?;
/// assert_eq!(config.expression_animations, ExpressionAnimationPolicy::PerOccurrence);
/// # Ok::<(), horizon_compose::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct InstantiatorConfig {
    /// Allocation policy for expression animations.
    pub expression_animations: ExpressionAnimationPolicy,
}

impl InstantiatorConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expression animation policy.
    pub fn expression_animations(mut self, policy: ExpressionAnimationPolicy) -> Self {
        self.expression_animations = policy;
        self
    }

    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
