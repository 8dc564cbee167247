//! Descendant chains.
//!
//! A [`DescendantChain`] is the ordered list of nested children currently
//! active under an activity, from its immediate child to the deepest
//! descendant. It is never stored on its own: it lives inside the activity's
//! parameters as two index-aligned encoded lists,
//!
//! ```text
//! OMNI_childName   = encode(["Settings", "Profile"])
//! OMNI_childParams = encode([{"tab": "general"}, {"id": "7"}])
//! ```
//!
//! and is rebuilt by decoding on every read. Writing replaces both keys
//! wholesale.

use crate::codec::ParamCodec;
use crate::error::DecodeError;
use crate::params::{CHILD_NAME_KEY, CHILD_PARAMS_KEY};
use crate::ActivityParams;
use serde_json::Value;

/// Ordered `(name, params)` pairs of the active nested path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescendantChain {
    names: Vec<String>,
    params: Vec<ActivityParams>,
}

impl DescendantChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from parallel lists.
    pub fn from_parts(names: Vec<String>, params: Vec<ActivityParams>) -> Result<Self, DecodeError> {
        if names.len() != params.len() {
            return Err(DecodeError::MisalignedChain {
                names: names.len(),
                params: params.len(),
            });
        }
        Ok(Self { names, params })
    }

    /// Append a descendant below the current innermost one.
    pub fn push(&mut self, name: impl Into<String>, params: ActivityParams) {
        self.names.push(name.into());
        self.params.push(params);
    }

    /// Append every entry of `other`.
    pub fn extend(&mut self, other: Self) {
        self.names.extend(other.names);
        self.params.extend(other.params);
    }

    /// The first `len` entries.
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.min(self.len());
        Self {
            names: self.names[..len].to_vec(),
            params: self.params[..len].to_vec(),
        }
    }

    /// Number of nesting levels.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Return `true` if no child is active.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Activity names, outermost first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Parameter sets, index-aligned with [`names`](Self::names).
    pub fn params(&self) -> &[ActivityParams] {
        &self.params
    }

    /// Entry at `index` (0 = immediate child).
    pub fn get(&self, index: usize) -> Option<(&str, &ActivityParams)> {
        Some((self.names.get(index)?.as_str(), self.params.get(index)?))
    }

    /// The deepest active descendant.
    pub fn innermost(&self) -> Option<(&str, &ActivityParams)> {
        self.get(self.len().checked_sub(1)?)
    }

    /// Iterate over `(name, params)` pairs, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActivityParams)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.params.iter())
    }

    // ------------------------------------------------------------------------
    // Persistence in reserved params
    // ------------------------------------------------------------------------

    /// Read the chain stored in `params`.
    ///
    /// Missing keys mean an empty chain. One key without the other, lists of
    /// different lengths, or payloads the codec rejects are errors.
    pub fn read(params: &ActivityParams, codec: &dyn ParamCodec) -> Result<Self, DecodeError> {
        let names = params.get(CHILD_NAME_KEY);
        let child_params = params.get(CHILD_PARAMS_KEY);

        let (names, child_params) = match (names, child_params) {
            (None, None) => return Ok(Self::new()),
            (Some(_), None) => {
                return Err(DecodeError::IncompleteChain {
                    present: CHILD_NAME_KEY,
                    missing: CHILD_PARAMS_KEY,
                })
            }
            (None, Some(_)) => {
                return Err(DecodeError::IncompleteChain {
                    present: CHILD_PARAMS_KEY,
                    missing: CHILD_NAME_KEY,
                })
            }
            (Some(n), Some(p)) => (n, p),
        };

        let names: Vec<String> = decode_list(codec, CHILD_NAME_KEY, names)?
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Ok(s),
                _ => Err(DecodeError::UnexpectedShape {
                    key: CHILD_NAME_KEY,
                    expected: "a list of activity names",
                }),
            })
            .collect::<Result<_, _>>()?;

        let child_params: Vec<ActivityParams> = decode_list(codec, CHILD_PARAMS_KEY, child_params)?
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => Ok(map.into_iter().collect::<ActivityParams>()),
                _ => Err(DecodeError::UnexpectedShape {
                    key: CHILD_PARAMS_KEY,
                    expected: "a list of parameter objects",
                }),
            })
            .collect::<Result<_, _>>()?;

        Self::from_parts(names, child_params)
    }

    /// Write this chain into `params`, replacing any previous chain.
    ///
    /// An empty chain removes both reserved keys.
    pub fn write_into(&self, params: &mut ActivityParams, codec: &dyn ParamCodec) {
        if self.is_empty() {
            params.remove(CHILD_NAME_KEY);
            params.remove(CHILD_PARAMS_KEY);
            return;
        }
        let names = Value::Array(self.names.iter().cloned().map(Value::String).collect());
        let child_params = Value::Array(self.params.iter().map(ActivityParams::to_value).collect());
        params.insert(CHILD_NAME_KEY, codec.encode(&names));
        params.insert(CHILD_PARAMS_KEY, codec.encode(&child_params));
    }

    /// Copy of `params` with this chain written into it.
    pub fn embedded_in(&self, params: &ActivityParams, codec: &dyn ParamCodec) -> ActivityParams {
        let mut out = params.clone();
        self.write_into(&mut out, codec);
        out
    }
}

/// Decode one reserved key into a JSON array.
fn decode_list(
    codec: &dyn ParamCodec,
    key: &'static str,
    raw: &Value,
) -> Result<Vec<Value>, DecodeError> {
    let Value::String(encoded) = raw else {
        return Err(DecodeError::UnexpectedShape {
            key,
            expected: "an encoded string",
        });
    };
    match codec.decode(encoded)? {
        Value::Array(items) => Ok(items),
        _ => Err(DecodeError::UnexpectedShape {
            key,
            expected: "a list",
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================
