//! Environment config resolution.
//!
//! A [`SubviewResolver`] is the configuration table narrowed to one
//! environment tag. Lookups are pure: an activity with no entry for the
//! environment simply has no subview behaviour, and every caller treats
//! that as "let the navigation through unchanged".

use crate::config::{OmniflowConfig, SubviewConfig};
use crate::error::ConfigError;
use crate::info_log;
use std::collections::HashMap;

/// Subview configuration of every activity for one environment.
#[derive(Debug, Clone)]
pub struct SubviewResolver {
    environment: String,
    table: HashMap<String, SubviewConfig>,
}

impl SubviewResolver {
    /// Validate `config` and index it for `environment`.
    ///
    /// The environment tag is matched verbatim against the table's keys.
    pub fn new(config: &OmniflowConfig, environment: impl Into<String>) -> Result<Self, ConfigError> {
        config.validate()?;
        let resolver = Self::unchecked(config, environment);

        info_log!(
            "Subview resolver for environment '{}': {} of {} activities configured",
            resolver.environment,
            resolver.table.len(),
            config.activities.len()
        );

        Ok(resolver)
    }

    /// Build a resolver without validating the table.
    ///
    /// Lookups behave the same, but a cyclic default chain is only detected
    /// when an expansion runs into it.
    pub fn unchecked(config: &OmniflowConfig, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        let table = config
            .activities
            .iter()
            .filter_map(|activity| {
                activity
                    .subview_for(&environment)
                    .map(|subview| (activity.name.clone(), subview.clone()))
            })
            .collect();
        Self { environment, table }
    }

    /// The environment tag this resolver was built for.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Subview configuration of `activity`, or `None` if unconfigured.
    pub fn resolve(&self, activity: &str) -> Option<&SubviewConfig> {
        self.table.get(activity)
    }

    /// Return `true` if `child` may nest directly under `parent`.
    pub fn allows_child(&self, parent: &str, child: &str) -> bool {
        self.resolve(parent).is_some_and(|s| s.allows(child))
    }

    /// Return `true` if `activity` can host subviews at all.
    pub fn hosts_subviews(&self, activity: &str) -> bool {
        self.resolve(activity).is_some_and(|s| !s.children.is_empty())
    }
}
