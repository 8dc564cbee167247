//! Parameter codec.
//!
//! Nested navigation state has to fit inside the flat parameter map of a
//! stack entry. A [`ParamCodec`] turns any structured value into a single
//! string and back. The default [`EnvelopeCodec`] writes
//!
//! ```text
//! omni1.<base64url(JSON)>
//! ```
//!
//! The `omni1.` prefix lets `decode` reject strings it did not produce
//! instead of misreading them, and base64url keeps the result safe to store
//! in URLs or history entries.
//!
//! # Example
//!
//! ```
//! use omniflow::codec::{EnvelopeCodec, ParamCodec};
//! use serde_json::json;
//!
//! let codec = EnvelopeCodec;
//! let encoded = codec.encode(&json!({"id": 1, "tags": ["a", "b"]}));
//! assert!(encoded.starts_with("omni1."));
//! assert_eq!(codec.decode(&encoded).unwrap(), json!({"id": 1, "tags": ["a", "b"]}));
//!
//! assert!(codec.decode("{\"id\":1}").is_err());
//! ```

use crate::error::{DecodeError, OmniflowError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Converts structured values to stack-storable strings and back.
///
/// Implementations must round-trip: `decode(&encode(v)) == Ok(v)` for every
/// value `v`, and `decode` must fail rather than guess on input it did not
/// produce.
pub trait ParamCodec: Send + Sync + 'static {
    /// Encode a structured value. Total: never fails.
    fn encode(&self, value: &Value) -> String;

    /// Decode a string produced by [`encode`](Self::encode).
    fn decode(&self, encoded: &str) -> Result<Value, DecodeError>;

    /// Codec name for debugging.
    fn name(&self) -> &'static str {
        "ParamCodec"
    }
}

/// Default codec: versioned prefix followed by base64url-encoded JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeCodec;

impl EnvelopeCodec {
    /// Prefix identifying strings written by this codec.
    pub const PREFIX: &'static str = "omni1.";
}

impl ParamCodec for EnvelopeCodec {
    fn encode(&self, value: &Value) -> String {
        // `Value`'s Display impl is compact JSON and cannot fail.
        let json = value.to_string();
        format!("{}{}", Self::PREFIX, URL_SAFE_NO_PAD.encode(json))
    }

    fn decode(&self, encoded: &str) -> Result<Value, DecodeError> {
        let body = encoded
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| DecodeError::foreign(encoded))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|e| DecodeError::Malformed {
                reason: e.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Malformed {
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "EnvelopeCodec"
    }
}

/// Encode any serializable value with `codec`.
///
/// Fails only if `value` cannot be represented as a structured value
/// (e.g. a map with non-string keys).
pub fn encode_as<T>(codec: &dyn ParamCodec, value: &T) -> Result<String, OmniflowError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|e| OmniflowError::Encode {
        message: e.to_string(),
    })?;
    Ok(codec.encode(&value))
}

/// Decode a string written by [`encode_as`] into `T`.
pub fn decode_as<T>(codec: &dyn ParamCodec, encoded: &str) -> Result<T, OmniflowError>
where
    T: DeserializeOwned,
{
    let value = codec.decode(encoded)?;
    serde_json::from_value(value).map_err(|e| {
        OmniflowError::Decode(DecodeError::Malformed {
            reason: e.to_string(),
        })
    })
}

// ============================================================================
// Tests
// ============================================================================
