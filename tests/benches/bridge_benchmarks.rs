//! # Fetch Bridge Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | fb-01 Buffer Relay | copy-in + release, copy-out + hand-off |
//! | fb-02 Request Dispatch | submit → progress → loaded, header parsing |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fb_01_buffer_relay::BufferRelay;
use fb_02_request_dispatch::{
    Callbacks, DispatchConfig, FetchBridge, HeaderSet, RecordingTransport, SubmitRequest,
};
use shared_types::HostEvent;

// ============================================================================
// FB-01: Buffer Relay
// ============================================================================

fn bench_relay_copies(c: &mut Criterion) {
    let mut group = c.benchmark_group("fb-01-buffer-relay");

    for size in [64usize, 4 * 1024, 256 * 1024] {
        let payload = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("copy_in_release", size), &payload, |b, p| {
            let mut relay = BufferRelay::default();
            b.iter(|| {
                let buf = relay.copy_in(black_box(p)).unwrap();
                relay.release(buf);
            })
        });

        group.bench_with_input(BenchmarkId::new("copy_out_hand_off", size), &payload, |b, p| {
            let mut relay = BufferRelay::default();
            b.iter(|| {
                let buf = relay.copy_out(black_box(p)).unwrap();
                black_box(relay.hand_off(buf));
            })
        });
    }

    group.finish();
}

// ============================================================================
// FB-02: Request Dispatch
// ============================================================================

fn bench_dispatch_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("fb-02-request-dispatch");

    for body_size in [0usize, 16 * 1024] {
        let body = vec![1u8; body_size];
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("submit_progress_loaded", body_size),
            &body,
            |b, body| {
                let mut bridge = FetchBridge::new(RecordingTransport::new(), DispatchConfig::default());
                b.iter(|| {
                    let handle = bridge
                        .submit(
                            SubmitRequest::get("https://bench.local/asset"),
                            Callbacks::new()
                                .on_success(|_, _, resp| {
                                    black_box(resp.len());
                                })
                                .on_progress(|_, _, loaded, _| {
                                    black_box(loaded);
                                }),
                        )
                        .unwrap();
                    bridge.deliver(HostEvent::Progress {
                        handle,
                        loaded: body.len() as u64,
                        total: Some(body.len() as u64),
                    });
                    bridge.deliver(HostEvent::Loaded {
                        handle,
                        status: 200,
                        status_text: "OK".into(),
                        body: body.clone(),
                    });
                    bridge.transport_mut().started.clear();
                })
            },
        );
    }

    group.bench_function("stale_event", |b| {
        let mut bridge = FetchBridge::new(RecordingTransport::new(), DispatchConfig::default());
        b.iter(|| {
            black_box(bridge.deliver(HostEvent::Aborted {
                handle: shared_types::RequestHandle::from_raw(u64::MAX),
            }))
        })
    });

    group.finish();
}

fn bench_header_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("fb-02-headers");
    let payload = r#"{"Content-Type":"application/json","Authorization":"Bearer abc.def","X-Retry":3,"X-Debug":true}"#;

    group.bench_function("parse_4_headers", |b| {
        b.iter(|| black_box(HeaderSet::parse(black_box(payload)).unwrap()))
    });
    group.bench_function("parse_lenient_malformed", |b| {
        b.iter(|| black_box(HeaderSet::parse_lenient(black_box("{broken"))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_relay_copies,
    bench_dispatch_lifecycle,
    bench_header_parsing
);
criterion_main!(benches);
