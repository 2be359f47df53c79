use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Sidecar contents for one image: string keys mapped to JSON values.
///
/// Accessors never fail. A missing key (or a value of the wrong shape) reads
/// as an empty string or an empty sequence, so rules can test fields without
/// caring whether the scanner wrote them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    fields: Map<String, Value>,
}
impl MetadataRecord {
    pub const SEQUENCE_NAME: &'static str = "SequenceName";
    pub const IMAGE_TYPE: &'static str = "ImageType";

    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON sidecar document. The top-level value must be an object.
    pub fn from_json(json: impl AsRef<[u8]>) -> Result<Self> {
        let value: Value = serde_json::from_slice(json.as_ref()).or_raise(|| ErrorKind::InvalidSidecar)?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => exn::bail!(ErrorKind::UnexpectedSidecarShape("null")),
            Value::Bool(_) => exn::bail!(ErrorKind::UnexpectedSidecarShape("boolean")),
            Value::Number(_) => exn::bail!(ErrorKind::UnexpectedSidecarShape("number")),
            Value::String(_) => exn::bail!(ErrorKind::UnexpectedSidecarShape("string")),
            Value::Array(_) => exn::bail!(ErrorKind::UnexpectedSidecarShape("array")),
        }
    }

    /// Builder-style insert, mostly useful for constructing records by hand.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads a string field, defaulting to `""` when absent or not a string.
    pub fn string(&self, key: &str) -> &str {
        self.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    /// Reads a sequence-of-strings field, preserving order.
    ///
    /// A bare string is a one-element sequence. Numbers and booleans inside
    /// the sequence are rendered as their JSON text; nulls and nested
    /// structures are dropped.
    pub fn strings(&self, key: &str) -> Vec<Cow<'_, str>> {
        match self.get(key) {
            Some(Value::String(s)) => vec![Cow::Borrowed(s.as_str())],
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }

    /// Scanner sequence name. Not used by any rule yet.
    pub fn sequence_name(&self) -> &str {
        self.string(Self::SEQUENCE_NAME)
    }

    pub fn image_type(&self) -> Vec<Cow<'_, str>> {
        self.strings(Self::IMAGE_TYPE)
    }

    /// `ImageType` elements joined with `_`, the form the rules test against.
    pub fn image_type_joined(&self) -> String {
        self.image_type().join("_")
    }
}
impl From<Map<String, Value>> for MetadataRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
