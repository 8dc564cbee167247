//! Activity parameters.
//!
//! [`ActivityParams`] is the string-keyed parameter map carried by every
//! activity and every step. Values are structured ([`serde_json::Value`]) so
//! applications can pass more than flat strings.
//!
//! Two keys are reserved for nested navigation state:
//!
//! | Key | Holds |
//! |-----|-------|
//! | [`CHILD_NAME_KEY`] (`OMNI_childName`) | encoded list of descendant activity names |
//! | [`CHILD_PARAMS_KEY`] (`OMNI_childParams`) | encoded list of descendant parameter sets |
//!
//! Both are written and read through [`DescendantChain`](crate::chain::DescendantChain);
//! applications should treat them as opaque.
//!
//! # Example
//!
//! ```
//! use omniflow::ActivityParams;
//!
//! let mut params = ActivityParams::new();
//! params.insert("id", "42");
//! params.insert("page", 3);
//!
//! assert_eq!(params.get_str("id"), Some("42"));
//! assert_eq!(params.get_as::<u32>("page"), Some(3));
//! assert!(!params.has_subview_state());
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Reserved key holding the encoded list of descendant activity names.
pub const CHILD_NAME_KEY: &str = "OMNI_childName";

/// Reserved key holding the encoded list of descendant parameter sets.
pub const CHILD_PARAMS_KEY: &str = "OMNI_childParams";

/// Parameters of an activity or step.
///
/// Backed by a `BTreeMap` so that equality and serialization are
/// independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityParams {
    params: BTreeMap<String, Value>,
}

impl ActivityParams {
    /// Create empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing map.
    pub fn from_map(params: BTreeMap<String, Value>) -> Self {
        Self { params }
    }

    /// Get a parameter value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Get a parameter if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.as_str()
    }

    /// Get a parameter and deserialize it as `T`.
    ///
    /// Returns `None` if the key is missing or the value has another shape.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        T::deserialize(self.params.get(key)?).ok()
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.params.remove(key)
    }

    /// Return `true` if the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over all `(key, value)` pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.params.iter()
    }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Return the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Return `true` if either reserved subview key is present.
    pub fn has_subview_state(&self) -> bool {
        self.contains(CHILD_NAME_KEY) || self.contains(CHILD_PARAMS_KEY)
    }

    /// Copy of these parameters without the reserved subview keys.
    pub fn without_subview_state(&self) -> Self {
        let mut stripped = self.clone();
        stripped.remove(CHILD_NAME_KEY);
        stripped.remove(CHILD_PARAMS_KEY);
        stripped
    }

    /// View as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for ActivityParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ActivityParams {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
