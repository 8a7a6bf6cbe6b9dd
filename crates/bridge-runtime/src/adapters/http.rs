//! reqwest-backed host transport.
//!
//! Every started request runs as its own tokio task and reports back through
//! an unbounded channel of `HostEvent`s. Each task sends zero or more
//! `Progress` events followed by exactly one terminal event, so the host
//! loop sees per-handle events in order.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use fb_02_request_dispatch::{TargetKind, Transport, TransportRequest};
use reqwest::redirect::Policy;
use shared_types::status::{HTTP_OK, TRANSPORT_REJECTED};
use shared_types::{HostEvent, RequestHandle, TransportError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::RuntimeError;

/// Request data copied out of the registry for the task.
#[derive(Debug)]
struct OwnedRequest {
    handle: RequestHandle,
    url: String,
    method: reqwest::Method,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

/// Host transport for network and local targets.
pub struct HttpTransport {
    client: reqwest::Client,
    local_root: PathBuf,
    events: UnboundedSender<HostEvent>,
    runtime: Handle,
    tasks: HashMap<RequestHandle, JoinHandle<()>>,
}

impl HttpTransport {
    /// Build the client from `config`. Must be called inside a tokio runtime.
    pub fn new(
        config: &TransportConfig,
        events: UnboundedSender<HostEvent>,
    ) -> Result<Self, RuntimeError> {
        let runtime = Handle::try_current().map_err(|e| RuntimeError::NoRuntime(e.to_string()))?;
        let redirect = match config.max_redirects {
            0 => Policy::none(),
            n => Policy::limited(n),
        };
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .redirect(redirect)
            .build()
            .map_err(|e| RuntimeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            local_root: config.local_root.clone(),
            events,
            runtime,
            tasks: HashMap::new(),
        })
    }

    /// Requests whose task has not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }

    fn reap_finished(&mut self) {
        self.tasks.retain(|_, task| !task.is_finished());
    }
}

impl Transport for HttpTransport {
    fn start(&mut self, request: TransportRequest<'_>) -> Result<(), TransportError> {
        self.reap_finished();
        let handle = request.handle;
        let events = self.events.clone();

        let task = match request.target {
            TargetKind::Network => {
                let url = reqwest::Url::parse(request.url).map_err(|e| {
                    TransportError::new(TRANSPORT_REJECTED, format!("invalid url: {e}"))
                })?;
                let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
                    .map_err(|e| {
                        TransportError::new(TRANSPORT_REJECTED, format!("invalid method: {e}"))
                    })?;
                let owned = OwnedRequest {
                    handle,
                    url: url.to_string(),
                    method,
                    headers: request
                        .headers
                        .iter()
                        .map(|(n, v)| (n.to_string(), v.to_string()))
                        .collect(),
                    body: request.body.map(<[u8]>::to_vec),
                };
                let client = self.client.clone();
                self.runtime.spawn(fetch_network(client, owned, events))
            }
            TargetKind::Local => {
                let path = resolve_local(&self.local_root, request.url)
                    .map_err(|reason| TransportError::new(TRANSPORT_REJECTED, reason))?;
                self.runtime.spawn(fetch_local(handle, path, events))
            }
        };

        debug!(handle = %handle, url = request.url, "Transport task spawned");
        self.tasks.insert(handle, task);
        Ok(())
    }

    fn abort(&mut self, handle: RequestHandle) {
        let Some(task) = self.tasks.remove(&handle) else {
            return;
        };
        if task.is_finished() {
            return;
        }
        task.abort();
        debug!(handle = %handle, "Transport task aborted");
        if self.events.send(HostEvent::Aborted { handle }).is_err() {
            warn!(handle = %handle, "Host loop gone, abort not reported");
        }
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Map a local target onto the filesystem.
///
/// Every target is joined onto `root`. The `file://` prefix, query strings
/// and fragments are dropped. Absolute paths and `..` segments are refused
/// so a target can never name a file outside `root`.
pub fn resolve_local(root: &Path, url: &str) -> Result<PathBuf, String> {
    let raw = url.strip_prefix("file://").unwrap_or(url);
    let raw = raw.split(['?', '#']).next().unwrap_or(raw);
    if raw.is_empty() {
        return Err("empty local path".to_string());
    }
    let path = Path::new(raw);
    for component in path.components() {
        match component {
            Component::ParentDir => {
                return Err(format!("parent directory segments are not allowed: {raw}"));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(format!("absolute paths are not allowed: {raw}"));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(root.join(path))
}

async fn fetch_network(
    client: reqwest::Client,
    request: OwnedRequest,
    events: UnboundedSender<HostEvent>,
) {
    let handle = request.handle;
    let event = match run_network(&client, request, &events).await {
        Ok(event) => event,
        Err(err) => {
            debug!(handle = %handle, error = %err, "Network request failed");
            HostEvent::Failed {
                handle,
                error: TransportError::network(err.to_string()),
            }
        }
    };
    // The receiver only disappears when the host loop is gone.
    let _ = events.send(event);
}

async fn run_network(
    client: &reqwest::Client,
    request: OwnedRequest,
    events: &UnboundedSender<HostEvent>,
) -> Result<HostEvent, reqwest::Error> {
    let handle = request.handle;
    let mut builder = client.request(request.method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let mut response = builder.send().await?;
    let status = response.status();
    let total = response.content_length();
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        let _ = events.send(HostEvent::Progress {
            handle,
            loaded: body.len() as u64,
            total,
        });
    }

    Ok(HostEvent::Loaded {
        handle,
        status: i32::from(status.as_u16()),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    })
}

async fn fetch_local(handle: RequestHandle, path: PathBuf, events: UnboundedSender<HostEvent>) {
    let event = match tokio::fs::read(&path).await {
        Ok(body) => {
            let len = body.len() as u64;
            let _ = events.send(HostEvent::Progress {
                handle,
                loaded: len,
                total: Some(len),
            });
            HostEvent::Loaded {
                handle,
                status: HTTP_OK,
                status_text: "OK".to_string(),
                body,
            }
        }
        Err(err) => HostEvent::Failed {
            handle,
            error: TransportError::network(format!("{}: {err}", path.display())),
        },
    };
    let _ = events.send(event);
}
