//! # fetch-bridge
//!
//! Submit one request through the bridge and print the response body.
//!
//! ```text
//! fetch-bridge https://example.com/data.json
//! fetch-bridge -X POST -d '{"score":10}' -H '{"Content-Type":"application/json"}' https://example.com/scores
//! fetch-bridge --config bridge.toml levels/1.json -o level1.json
//! fetch-bridge --metrics https://example.com/data.json
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use tracing::{info, warn};

use bridge_runtime::{CommandClipboard, HostLoop, RuntimeConfig};
use bridge_telemetry::{init_telemetry, TelemetryConfig};
use fb_01_buffer_relay::OwnedBuffer;
use fb_02_request_dispatch::{copy_to_clipboard, Callbacks, SubmitRequest};

#[derive(Parser, Debug)]
#[command(name = "fetch-bridge")]
#[command(about = "Fetch a URL or local asset through the fetch bridge")]
#[command(version)]
struct Args {
    /// URL (http/https) or path relative to the configured local root
    url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request body, sent for methods that carry one
    #[arg(short, long)]
    data: Option<String>,

    /// Request headers as a JSON object
    #[arg(short = 'H', long)]
    headers: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the body here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also copy the body to the system clipboard
    #[arg(long)]
    copy: bool,

    /// Print Prometheus metrics to stderr when the request ends
    #[arg(long)]
    metrics: bool,
}

enum Outcome {
    Body(Vec<u8>),
    Error { status: i32, text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry_config = TelemetryConfig::from_env();
    telemetry_config.metrics_enabled |= args.metrics;
    let telemetry = init_telemetry(telemetry_config).context("failed to initialise telemetry")?;
    let config = RuntimeConfig::resolve(args.config.as_deref())
        .context("failed to load configuration")?;
    let mut host = HostLoop::new(config)?;

    let outcome: Arc<Mutex<Option<Outcome>>> = Arc::new(Mutex::new(None));
    let on_ok = Arc::clone(&outcome);
    let on_err = Arc::clone(&outcome);
    let callbacks = Callbacks::new()
        .on_success(move |_, _, response| {
            let body = response
                .into_owned()
                .map(OwnedBuffer::into_vec)
                .unwrap_or_default();
            *on_ok.lock() = Some(Outcome::Body(body));
        })
        .on_error(move |_, _, status, text| {
            *on_err.lock() = Some(Outcome::Error {
                status,
                text: text.to_string(),
            });
        })
        .on_progress(|handle, _, loaded, total| {
            if total > 0 {
                eprint!("\r{handle}: {loaded}/{total} bytes");
            } else {
                eprint!("\r{handle}: {loaded} bytes");
            }
        });

    let mut request = SubmitRequest::get(&args.url)
        .with_method(&args.method)
        .with_free_response(false);
    if let Some(data) = &args.data {
        request = request.with_body(data.as_bytes());
    }
    if let Some(headers) = &args.headers {
        request = request.with_headers(headers);
    }

    let handle = host.submit(request, callbacks)?;
    info!(handle = %handle, url = %args.url, method = %args.method, "Request submitted");

    let interrupted = tokio::select! {
        _ = host.run_until_idle() => false,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl+C");
            }
            true
        }
    };
    if interrupted {
        info!("Interrupted, shutting down");
    }
    host.shutdown();
    eprintln!();

    if args.metrics {
        if let Some(metrics) = telemetry.metrics() {
            eprint!("{}", metrics.gather_text()?);
        }
    }

    let result = outcome.lock().take();
    match result {
        Some(Outcome::Body(body)) => {
            match &args.output {
                Some(path) => std::fs::write(path, &body)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&body)?;
                    stdout.flush()?;
                }
            }
            if args.copy {
                let mut clipboard = CommandClipboard::new();
                copy_to_clipboard(&mut clipboard, &String::from_utf8_lossy(&body));
            }
            Ok(())
        }
        Some(Outcome::Error { status, text }) => bail!("request failed ({status}): {text}"),
        None => bail!("request {handle} aborted"),
    }
}
