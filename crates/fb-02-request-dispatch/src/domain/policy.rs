//! # Success Policy
//!
//! Decides whether a received response goes to the success or the error
//! callback. Network targets succeed only on `200`. Targets that are not
//! reached over a network transport always succeed, whatever status the
//! transport reports, so one submission path serves remote and local
//! resources alike.

use shared_types::status::HTTP_OK;

/// How a target URL is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Fetched over HTTP(S).
    Network,
    /// Local or virtual resource.
    Local,
}

impl TargetKind {
    /// Classify by scheme prefix: a URL whose first four characters are
    /// `http` (any case) is a network target, anything else is local.
    pub fn classify(url: &str) -> Self {
        match url.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("http") => Self::Network,
            _ => Self::Local,
        }
    }

    /// Whether the target goes over the network.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network)
    }
}

/// Whether a response with `status` counts as success for `target`.
pub fn is_success(target: TargetKind, status: i32) -> bool {
    match target {
        TargetKind::Network => status == HTTP_OK,
        TargetKind::Local => true,
    }
}
