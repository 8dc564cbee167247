//! Subview configuration table.
//!
//! The application declares, per activity and per environment tag, which
//! activities may be nested under it and which child is entered by default:
//!
//! ```text
//! activity name ─┬─ "desktop" ─ { children: [View, View2], initialActivity: View }
//!                └─ "mobile"  ─ { children: [] }
//! ```
//!
//! The table can be built in code with the builder methods or loaded from
//! JSON with [`OmniflowConfig::from_json_str`]. Field names on the wire are
//! camelCase (`initialActivity`).
//!
//! [`OmniflowConfig::validate`] rejects duplicate activity names, references
//! to undeclared activities and cyclic default chains. It runs automatically
//! when a [`SubviewResolver`](crate::environment::SubviewResolver) is built,
//! so an expansion can never loop at navigation time.
//!
//! # Example
//!
//! ```
//! use omniflow::config::{ActivityDefinition, OmniflowConfig, SubviewConfig};
//!
//! let config = OmniflowConfig::new()
//!     .activity(
//!         ActivityDefinition::new("Root").subview(
//!             "desktop",
//!             SubviewConfig::new()
//!                 .children(["View", "View2"])
//!                 .initial("View", Default::default()),
//!         ),
//!     )
//!     .activity(ActivityDefinition::new("View"))
//!     .activity(ActivityDefinition::new("View2"));
//!
//! assert!(config.validate().is_ok());
//! ```

use crate::error::ConfigError;
use crate::{warn_log, ActivityParams};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Per-environment options of one activity, keyed by environment tag.
pub type ActivityOptions = BTreeMap<String, EnvironmentOptions>;

/// The whole configuration table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OmniflowConfig {
    /// Every activity known to the stack, in declaration order.
    #[serde(default)]
    pub activities: Vec<ActivityDefinition>,
}

/// One activity and its optional subview options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub omniflow: Option<ActivityOptions>,
}

/// Options that apply to one activity in one environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentOptions {
    pub subview: SubviewConfig,
}

/// Which activities may nest under an activity, and which one is entered
/// automatically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubviewConfig {
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_activity: Option<InitialActivity>,
}

/// Default child entered when the owning activity becomes current.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialActivity {
    pub name: String,
    #[serde(default)]
    pub params: ActivityParams,
}

// ============================================================================
// Builders
// ============================================================================

impl OmniflowConfig {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an activity definition.
    pub fn activity(mut self, definition: ActivityDefinition) -> Self {
        self.activities.push(definition);
        self
    }

    /// Parse a table from JSON.
    ///
    /// Parsing does not validate; call [`validate`](Self::validate) or build
    /// a resolver.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(source).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Find an activity definition by name.
    pub fn find(&self, name: &str) -> Option<&ActivityDefinition> {
        self.activities.iter().find(|a| a.name == name)
    }

    /// Every environment tag mentioned anywhere in the table.
    pub fn environments(&self) -> BTreeSet<&str> {
        self.activities
            .iter()
            .filter_map(|a| a.omniflow.as_ref())
            .flat_map(|options| options.keys().map(String::as_str))
            .collect()
    }
}

impl ActivityDefinition {
    /// Declare an activity with no subview behaviour.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            omniflow: None,
        }
    }

    /// Attach a subview configuration for one environment.
    pub fn subview(mut self, environment: impl Into<String>, subview: SubviewConfig) -> Self {
        self.omniflow
            .get_or_insert_with(BTreeMap::new)
            .insert(environment.into(), EnvironmentOptions { subview });
        self
    }

    /// Subview configuration for `environment`, if any.
    pub fn subview_for(&self, environment: &str) -> Option<&SubviewConfig> {
        self.omniflow
            .as_ref()?
            .get(environment)
            .map(|options| &options.subview)
    }
}

impl SubviewConfig {
    /// Create a configuration with no children and no default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow one more child activity.
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.children.push(name.into());
        self
    }

    /// Allow several child activities.
    pub fn children<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the default child entered automatically.
    pub fn initial(mut self, name: impl Into<String>, params: ActivityParams) -> Self {
        self.initial_activity = Some(InitialActivity {
            name: name.into(),
            params,
        });
        self
    }

    /// Return `true` if `name` may be nested directly under this activity.
    pub fn allows(&self, name: &str) -> bool {
        self.children.iter().any(|c| c == name)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl OmniflowConfig {
    /// Check the table for duplicate names, undeclared references and
    /// cyclic default chains in any environment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut declared: HashSet<&str> = HashSet::with_capacity(self.activities.len());
        for activity in &self.activities {
            if !declared.insert(activity.name.as_str()) {
                return Err(ConfigError::DuplicateActivity {
                    name: activity.name.clone(),
                });
            }
        }

        for activity in &self.activities {
            let Some(options) = &activity.omniflow else {
                continue;
            };
            for (environment, env_options) in options {
                let subview = &env_options.subview;
                let referenced = subview
                    .children
                    .iter()
                    .chain(subview.initial_activity.iter().map(|i| &i.name));
                for name in referenced {
                    if !declared.contains(name.as_str()) {
                        return Err(ConfigError::UnknownActivity {
                            activity: activity.name.clone(),
                            referenced: name.clone(),
                        });
                    }
                }
                if let Some(initial) = &subview.initial_activity {
                    if !subview.allows(&initial.name) {
                        warn_log!(
                            "initial activity '{}' of '{}' in environment '{}' is not listed in its children",
                            initial.name,
                            activity.name,
                            environment
                        );
                    }
                }
            }
        }

        for environment in self.environments() {
            for activity in &self.activities {
                self.check_default_chain(&activity.name, environment)?;
            }
        }

        Ok(())
    }

    /// Follow `initialActivity` links from `start` and fail on a revisit.
    fn check_default_chain(&self, start: &str, environment: &str) -> Result<(), ConfigError> {
        let mut path = vec![start.to_string()];
        let mut current = start;
        while let Some(initial) = self
            .find(current)
            .and_then(|a| a.subview_for(environment))
            .and_then(|s| s.initial_activity.as_ref())
        {
            let revisit = path.iter().any(|seen| *seen == initial.name);
            path.push(initial.name.clone());
            if revisit {
                return Err(ConfigError::CyclicDefaults {
                    environment: environment.to_string(),
                    cycle: path,
                });
            }
            current = &initial.name;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
