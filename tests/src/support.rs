//! Test fixtures shared by the integration flows.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{any, get};
use axum::Router;
use fb_02_request_dispatch::Callbacks;
use futures::StreamExt;
use parking_lot::Mutex;
use shared_types::{RequestHandle, UserArg};
use tokio::net::TcpListener;

// =============================================================================
// CALLBACK RECORDER
// =============================================================================

/// One callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Success {
        handle: RequestHandle,
        arg: UserArg,
        body: Vec<u8>,
        transferred: bool,
    },
    Error {
        handle: RequestHandle,
        arg: UserArg,
        status: i32,
        text: String,
    },
    Progress {
        handle: RequestHandle,
        loaded: u64,
        total: u64,
    },
}

impl Call {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Call::Progress { .. })
    }
}

/// Records every callback in invocation order.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks wired to this recorder.
    pub fn callbacks(&self) -> Callbacks {
        let (ok, err, progress) = (
            Arc::clone(&self.calls),
            Arc::clone(&self.calls),
            Arc::clone(&self.calls),
        );
        Callbacks::new()
            .on_success(move |handle, arg, response| {
                let transferred = response.is_transferred();
                ok.lock().push(Call::Success {
                    handle,
                    arg,
                    body: response.as_bytes().to_vec(),
                    transferred,
                });
            })
            .on_error(move |handle, arg, status, text| {
                err.lock().push(Call::Error {
                    handle,
                    arg,
                    status,
                    text: text.to_string(),
                });
            })
            .on_progress(move |handle, _, loaded, total| {
                progress.lock().push(Call::Progress {
                    handle,
                    loaded,
                    total,
                });
            })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls for one handle.
    pub fn for_handle(&self, handle: RequestHandle) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                Call::Success { handle: h, .. }
                | Call::Error { handle: h, .. }
                | Call::Progress { handle: h, .. } => *h == handle,
            })
            .collect()
    }

    /// The terminal call for `handle`, asserting there is at most one and
    /// that nothing follows it.
    pub fn terminal(&self, handle: RequestHandle) -> Option<Call> {
        let calls = self.for_handle(handle);
        let terminals: Vec<_> = calls.iter().filter(|c| c.is_terminal()).collect();
        assert!(terminals.len() <= 1, "more than one terminal call: {calls:?}");
        if let Some(last) = terminals.first() {
            assert_eq!(calls.last(), Some(*last), "call after terminal: {calls:?}");
        }
        terminals.first().map(|c| (*c).clone())
    }
}

// =============================================================================
// HTTP RESPONDER
// =============================================================================

/// A request as the responder saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type RequestLog = Arc<Mutex<Vec<ReceivedRequest>>>;

/// In-process axum server with fixed routes.
///
/// | Path | Response |
/// |------|----------|
/// | `/ok` | 200, `hello` |
/// | `/missing` | 404, `nope` |
/// | `/created` | 201, `made` |
/// | `/echo` | 200, request body echoed |
/// | `/chunked` | 200, three chunks, no `Content-Length` |
/// | `/redirect` | 302 to `/ok` |
/// | `/hang` | never answers |
pub struct Responder {
    addr: SocketAddr,
    received: RequestLog,
}

impl Responder {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = RequestLog::default();
        let router = routes(Arc::clone(&received));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { addr, received }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.received.lock().clone()
    }
}

fn routes(log: RequestLog) -> Router {
    Router::new()
        .route("/ok", get(|| async { "hello" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
        .route("/created", get(|| async { (StatusCode::CREATED, "made") }))
        .route("/echo", any(|body: Bytes| async move { body }))
        .route(
            "/redirect",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/ok")]) }),
        )
        .route("/chunked", get(chunked))
        .route("/hang", get(hang))
        .layer(middleware::from_fn_with_state(log, record))
}

/// Log the request, then hand it on with its body restored.
async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    log.lock().push(ReceivedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers: parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: body.to_vec(),
    });
    next.run(Request::from_parts(parts, Body::from(body))).await
}

async fn chunked() -> Body {
    let chunks = futures::stream::iter(["alpha", "beta", "gamma"]).then(|chunk| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, Infallible>(Bytes::from_static(chunk.as_bytes()))
    });
    Body::from_stream(chunks)
}

async fn hang() -> StatusCode {
    std::future::pending().await
}
