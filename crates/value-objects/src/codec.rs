//! Structured-text codec used for mapped columns.

use crate::error::BoxError;
use serde_json::Value;

/// Failures of a [`Codec`]. The cause is whatever the codec reported.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Encode failed: {0}")]
    Encode(#[source] BoxError),
    #[error("Decode failed: {0}")]
    Decode(#[source] BoxError),
}

impl CodecError {
    pub fn encode(source: impl Into<BoxError>) -> Self {
        Self::Encode(source.into())
    }

    pub fn decode(source: impl Into<BoxError>) -> Self {
        Self::Decode(source.into())
    }
}

/// Converts sub-object state to column text and back.
pub trait Codec {
    fn encode(&self, value: &Value) -> Result<String, CodecError>;
    fn decode(&self, text: &str) -> Result<Value, CodecError>;
}

/// The default codec: compact JSON via `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::encode)
    }

    fn decode(&self, text: &str) -> Result<Value, CodecError> {
        serde_json::from_str(text).map_err(CodecError::decode)
    }
}
