//! # Network Flows
//!
//! `HostLoop` + `HttpTransport` against the in-process responder:
//!
//! 1. **200**: progress then exactly one success, body lent or transferred
//! 2. **Non-200**: error callback with the real status and reason phrase
//! 3. **POST**: body and headers reach the server; the caller's buffer can be
//!    reused as soon as `submit` returns
//! 4. **Shutdown**: a request the server never answers is rejected

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bridge_runtime::{HostLoop, RuntimeConfig, TransportConfig};
    use fb_02_request_dispatch::SubmitRequest;
    use shared_types::status::BRIDGE_SHUTDOWN;
    use shared_types::UserArg;
    use tokio::sync::watch;
    use tokio::time::timeout;

    use crate::support::{Call, Recorder, Responder};

    const DEADLINE: Duration = Duration::from_secs(10);

    fn host() -> HostLoop {
        HostLoop::new(RuntimeConfig::default()).unwrap()
    }

    fn host_following_redirects(max: usize) -> HostLoop {
        HostLoop::new(RuntimeConfig {
            transport: TransportConfig {
                max_redirects: max,
                ..TransportConfig::default()
            },
            ..RuntimeConfig::default()
        })
        .unwrap()
    }

    async fn settle(host: &mut HostLoop) {
        timeout(DEADLINE, host.run_until_idle())
            .await
            .expect("requests did not settle");
    }

    // =========================================================================
    // SUCCESS PATH
    // =========================================================================

    #[tokio::test]
    async fn test_get_200_lends_body() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/ok");
        let handle = host
            .submit(
                SubmitRequest::get(&url).with_user_arg(7usize),
                recorder.callbacks(),
            )
            .unwrap();
        settle(&mut host).await;

        assert_eq!(
            recorder.terminal(handle),
            Some(Call::Success {
                handle,
                arg: UserArg(7),
                body: b"hello".to_vec(),
                transferred: false,
            })
        );
        let progress: Vec<_> = recorder
            .for_handle(handle)
            .into_iter()
            .filter(|c| !c.is_terminal())
            .collect();
        assert_eq!(
            progress.last(),
            Some(&Call::Progress {
                handle,
                loaded: 5,
                total: 5
            })
        );
        assert_eq!(host.bridge().relay().live_count(), 0);
        assert_eq!(server.received()[0].method, "GET");
    }

    #[tokio::test]
    async fn test_transferred_body_leaves_relay() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/ok");
        let handle = host
            .submit(
                SubmitRequest::get(&url).with_free_response(false),
                recorder.callbacks(),
            )
            .unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { transferred: true, ref body, .. }) if body == b"hello"
        ));
        assert_eq!(host.bridge().relay().live_count(), 0);
        assert_eq!(host.bridge().relay().stats().hand_offs, 1);
    }

    #[tokio::test]
    async fn test_chunked_body_reports_unknown_total() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/chunked");
        let handle = host.submit(SubmitRequest::get(&url), recorder.callbacks()).unwrap();
        settle(&mut host).await;

        let calls = recorder.for_handle(handle);
        let loaded: Vec<u64> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Progress { loaded, total, .. } => {
                    assert_eq!(*total, 0);
                    Some(*loaded)
                }
                _ => None,
            })
            .collect();
        assert!(!loaded.is_empty());
        assert!(loaded.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(loaded.last(), Some(&14));
        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { ref body, .. }) if body == b"alphabetagamma"
        ));
    }

    // =========================================================================
    // STATUS HANDLING
    // =========================================================================

    #[tokio::test]
    async fn test_404_goes_to_error_callback() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/missing");
        let handle = host
            .submit(
                SubmitRequest::get(&url).with_user_arg(3usize),
                recorder.callbacks(),
            )
            .unwrap();
        settle(&mut host).await;

        assert_eq!(
            recorder.terminal(handle),
            Some(Call::Error {
                handle,
                arg: UserArg(3),
                status: 404,
                text: "Not Found".into(),
            })
        );
        assert_eq!(host.bridge().relay().live_count(), 0);
    }

    #[tokio::test]
    async fn test_non_200_success_class_is_still_an_error() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/created");
        let handle = host.submit(SubmitRequest::get(&url), recorder.callbacks()).unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Error { status: 201, ref text, .. }) if text == "Created"
        ));
    }

    #[tokio::test]
    async fn test_redirect_not_followed_by_default() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/redirect");
        let handle = host.submit(SubmitRequest::get(&url), recorder.callbacks()).unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Error { status: 302, .. })
        ));
        assert_eq!(server.received().len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_followed_when_configured() {
        let server = Responder::start().await;
        let mut host = host_following_redirects(3);
        let recorder = Recorder::new();

        let url = server.url("/redirect");
        let handle = host.submit(SubmitRequest::get(&url), recorder.callbacks()).unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { ref body, .. }) if body == b"hello"
        ));
        let paths: Vec<_> = server.received().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/redirect", "/ok"]);
    }

    #[tokio::test]
    async fn test_connection_refused_reports_status_zero() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut host = host();
        let recorder = Recorder::new();
        let url = format!("http://{addr}/gone");
        let handle = host.submit(SubmitRequest::get(&url), recorder.callbacks()).unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Error { status: 0, .. })
        ));
    }

    // =========================================================================
    // REQUEST SHAPING
    // =========================================================================

    #[tokio::test]
    async fn test_post_body_is_copied_before_submit_returns() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/echo");
        let mut payload = br#"{"score":10}"#.to_vec();
        let handle = host
            .submit(
                SubmitRequest::post(&url, &payload)
                    .with_headers(r#"{"X-Score": 10, "Content-Type": "application/json"}"#),
                recorder.callbacks(),
            )
            .unwrap();
        payload.iter_mut().for_each(|b| *b = b'#');
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { ref body, .. }) if body == br#"{"score":10}"#
        ));
        let received = server.received();
        let received = &received[0];
        assert_eq!(received.method, "POST");
        assert_eq!(received.header("x-score"), Some("10"));
        assert_eq!(received.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_get_body_is_not_sent() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/echo");
        let handle = host
            .submit(
                SubmitRequest::get(&url).with_body(b"ignored"),
                recorder.callbacks(),
            )
            .unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { ref body, .. }) if body.is_empty()
        ));
        assert!(server.received()[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_headers_do_not_block_request() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let url = server.url("/ok");
        let handle = host
            .submit(
                SubmitRequest::get(&url).with_headers("{not json"),
                recorder.callbacks(),
            )
            .unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_requests_each_complete_once() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let ok = server.url("/ok");
        let missing = server.url("/missing");
        let handles: Vec<_> = (0..16usize)
            .map(|i| {
                let url = if i % 4 == 0 { &missing } else { &ok };
                let handle = host
                    .submit(
                        SubmitRequest::get(url).with_user_arg(i),
                        recorder.callbacks(),
                    )
                    .unwrap();
                (i, handle)
            })
            .collect();
        settle(&mut host).await;

        for (i, handle) in handles {
            match recorder.terminal(handle) {
                Some(Call::Success { arg, .. }) => {
                    assert_ne!(i % 4, 0);
                    assert_eq!(arg, UserArg(i));
                }
                Some(Call::Error { arg, status, .. }) => {
                    assert_eq!(i % 4, 0);
                    assert_eq!(status, 404);
                    assert_eq!(arg, UserArg(i));
                }
                other => panic!("request {i} ended with {other:?}"),
            }
        }
        assert_eq!(host.pending_count(), 0);
        assert_eq!(host.bridge().relay().live_count(), 0);
    }

    // =========================================================================
    // ABORT AND SHUTDOWN
    // =========================================================================

    #[tokio::test]
    async fn test_shutdown_rejects_unanswered_request() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let hang = server.url("/hang");
        let ok = server.url("/ok");
        let hanging = host.submit(SubmitRequest::get(&hang), recorder.callbacks()).unwrap();
        let quick = host.submit(SubmitRequest::get(&ok), recorder.callbacks()).unwrap();

        let (tx, rx) = watch::channel(false);
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = tx.send(true);
        });
        timeout(DEADLINE, host.run(rx)).await.unwrap();
        stopper.await.unwrap();

        assert!(matches!(recorder.terminal(quick), Some(Call::Success { .. })));
        assert_eq!(
            recorder.terminal(hanging),
            Some(Call::Error {
                handle: hanging,
                arg: UserArg(0),
                status: BRIDGE_SHUTDOWN,
                text: "bridge shut down".into(),
            })
        );
        assert!(!host.bridge().is_accepting());
    }

    #[tokio::test]
    async fn test_abort_is_silent() {
        let server = Responder::start().await;
        let mut host = host();
        let recorder = Recorder::new();

        let hang = server.url("/hang");
        let handle = host.submit(SubmitRequest::get(&hang), recorder.callbacks()).unwrap();
        assert!(host.abort(handle));
        settle(&mut host).await;

        assert_eq!(recorder.for_handle(handle), vec![]);
        assert_eq!(host.bridge().stats().snapshot().aborted, 1);
    }
}
