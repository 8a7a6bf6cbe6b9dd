//! # Request Headers
//!
//! Callers hand headers over as JSON text (`{"Content-Type": "text/plain"}`).
//! Header formatting is a convenience, not part of the transfer contract:
//! a malformed payload is dropped with a warning and the request proceeds.

use serde_json::Value;
use shared_types::is_token_char;
use tracing::warn;

use super::errors::HeaderError;

/// Ordered set of request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// Empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict parse. Fails on the first unusable entry.
    ///
    /// Strings are taken verbatim, numbers and booleans are stringified,
    /// `null`, arrays and nested objects are rejected.
    pub fn parse(text: &str) -> Result<Self, HeaderError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        let value: Value =
            serde_json::from_str(text).map_err(|e| HeaderError::Malformed(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(HeaderError::NotAnObject);
        };

        let mut set = Self::new();
        for (name, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(HeaderError::InvalidValue(name)),
            };
            set.insert(name, value)?;
        }
        Ok(set)
    }

    /// Lenient parse used at submission: any failure yields an empty set.
    pub fn parse_lenient(text: &str) -> Self {
        match Self::parse(text) {
            Ok(set) => set,
            Err(err) => {
                warn!(error = %err, "Ignoring malformed request headers");
                Self::new()
            }
        }
    }

    /// Add a header after validating name and value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), HeaderError> {
        let name = name.into();
        let value = value.into();
        if name.is_empty() || !name.chars().all(is_token_char) {
            return Err(HeaderError::InvalidName(name));
        }
        if value.chars().any(|c| c.is_control() && c != '\t') {
            return Err(HeaderError::InvalidValue(name));
        }
        self.entries.push((name, value));
        Ok(())
    }

    /// Look up the first value for a header, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
