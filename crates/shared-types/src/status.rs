//! Internal status markers.
//!
//! Passed to the error callback in place of an HTTP status when the failure
//! originates inside the bridge. All are negative so they never collide with
//! a status a transport can report.

/// Copy-in or copy-out could not allocate its buffer.
pub const ALLOCATION_FAILED: i32 = -1;

/// The transport refused to start the request.
pub const TRANSPORT_REJECTED: i32 = -2;

/// The bridge shut down while the request was pending.
pub const BRIDGE_SHUTDOWN: i32 = -3;

/// HTTP status treated as success for network targets.
pub const HTTP_OK: i32 = 200;

/// Canonical reason phrase for an HTTP status, empty when unknown.
pub fn reason_phrase(status: i32) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        413 => "Payload Too Large",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// Whether a status is one of the bridge's internal markers.
pub fn is_internal(status: i32) -> bool {
    status < 0
}
