//! # Core Entities
//!
//! Identifiers and request vocabulary used on both sides of the bridge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::MethodError;

/// Opaque identifier for one in-flight request.
///
/// Valid only between submission and the dispatch of its terminal event.
/// Values are allocated strictly increasing and are never reused by the
/// allocator that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestHandle(u64);

impl RequestHandle {
    /// Wrap a raw handle value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value, as handed across the native boundary.
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic handle allocator.
///
/// Starts at 1 so that 0 stays available to native callers as "no handle".
#[derive(Debug)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    /// Create an allocator whose first handle is `#1`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next handle.
    pub fn allocate(&mut self) -> RequestHandle {
        let handle = RequestHandle(self.next);
        self.next = self.next.wrapping_add(1).max(1);
        handle
    }

    /// Peek at the value the next call to `allocate` returns.
    pub fn peek(&self) -> RequestHandle {
        RequestHandle(self.next)
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque caller-supplied value echoed verbatim to every callback.
///
/// Pointer-sized so a native caller can smuggle a context pointer through
/// it; the bridge copies it and never looks inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserArg(pub usize);

impl From<usize> for UserArg {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// Validated HTTP request method.
///
/// Stored uppercase. Any RFC 7230 token is accepted, so extension methods
/// pass through to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Method(String);

impl Method {
    /// `GET`
    pub fn get() -> Self {
        Self("GET".to_string())
    }

    /// `POST`
    pub fn post() -> Self {
        Self("POST".to_string())
    }

    /// Parse and normalise a method name.
    pub fn parse(raw: &str) -> Result<Self, MethodError> {
        if raw.is_empty() {
            return Err(MethodError::Empty);
        }
        if let Some(bad) = raw.chars().find(|c| !is_token_char(*c)) {
            return Err(MethodError::InvalidCharacter(bad));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the submit-side payload is attached to the request.
    ///
    /// Only `POST` sends a body; every other method is sent without one and
    /// no submit-side copy is made.
    pub fn carries_body(&self) -> bool {
        self.0 == "POST"
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Method {
    type Err = MethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Method {
    type Error = MethodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.0
    }
}

/// RFC 7230 `tchar`.
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}
