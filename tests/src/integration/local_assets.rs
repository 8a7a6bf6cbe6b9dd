//! # Local Asset Flows
//!
//! Targets without an `http` prefix are read from the configured local root.
//! They always go to the success callback once read, whatever the status,
//! and a single progress event with `loaded == total` precedes it.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use bridge_runtime::{HostLoop, RuntimeConfig, TransportConfig};
    use fb_02_request_dispatch::{DispatchConfig, DispatchError, SubmitRequest};
    use shared_types::status::TRANSPORT_REJECTED;
    use shared_types::UserArg;
    use tokio::time::timeout;

    use crate::support::{Call, Recorder};

    fn host_at(root: &Path) -> HostLoop {
        HostLoop::new(RuntimeConfig {
            transport: TransportConfig {
                local_root: root.to_path_buf(),
                ..TransportConfig::default()
            },
            ..RuntimeConfig::default()
        })
        .unwrap()
    }

    async fn settle(host: &mut HostLoop) {
        timeout(Duration::from_secs(5), host.run_until_idle())
            .await
            .expect("requests did not settle");
    }

    #[tokio::test]
    async fn test_nested_asset_is_read() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("levels/world1")).unwrap();
        std::fs::write(root.path().join("levels/world1/1.json"), b"[1,2,3]").unwrap();
        let mut host = host_at(root.path());
        let recorder = Recorder::new();

        let handle = host
            .submit(
                SubmitRequest::get("levels/world1/1.json").with_user_arg(11usize),
                recorder.callbacks(),
            )
            .unwrap();
        settle(&mut host).await;

        assert_eq!(
            recorder.for_handle(handle),
            vec![
                Call::Progress {
                    handle,
                    loaded: 7,
                    total: 7
                },
                Call::Success {
                    handle,
                    arg: UserArg(11),
                    body: b"[1,2,3]".to_vec(),
                    transferred: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_file_scheme_and_query_are_stripped() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("save.dat"), b"slot").unwrap();
        let mut host = host_at(root.path());
        let recorder = Recorder::new();

        let handle = host
            .submit(
                SubmitRequest::get("file://save.dat?v=2#top"),
                recorder.callbacks(),
            )
            .unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { ref body, .. }) if body == b"slot"
        ));
    }

    #[tokio::test]
    async fn test_absolute_path_outside_root_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let file = elsewhere.path().join("config.ini");
        std::fs::write(&file, b"outside-root").unwrap();
        let mut host = host_at(root.path());
        let recorder = Recorder::new();

        let path = file.to_string_lossy().to_string();
        let plain = host.submit(SubmitRequest::get(&path), recorder.callbacks()).unwrap();
        let scheme = format!("file://{path}");
        let prefixed = host.submit(SubmitRequest::get(&scheme), recorder.callbacks()).unwrap();

        assert_eq!(host.pending_count(), 0);
        for handle in [plain, prefixed] {
            assert!(matches!(
                recorder.terminal(handle),
                Some(Call::Error { status: TRANSPORT_REJECTED, .. })
            ));
        }
        assert!(!recorder
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Success { .. })));
    }

    #[tokio::test]
    async fn test_empty_file_succeeds_with_empty_body() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("empty"), b"").unwrap();
        let mut host = host_at(root.path());
        let recorder = Recorder::new();

        let handle = host.submit(SubmitRequest::get("empty"), recorder.callbacks()).unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { ref body, .. }) if body.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_transport_failure() {
        let root = tempfile::tempdir().unwrap();
        let mut host = host_at(root.path());
        let recorder = Recorder::new();

        let handle = host
            .submit(SubmitRequest::get("nope.json"), recorder.callbacks())
            .unwrap();
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Error { status: 0, ref text, .. }) if text.contains("nope.json")
        ));
        assert_eq!(host.bridge().stats().snapshot().failed_transport, 1);
    }

    #[tokio::test]
    async fn test_parent_traversal_refused_synchronously() {
        let root = tempfile::tempdir().unwrap();
        let mut host = host_at(root.path());
        let recorder = Recorder::new();

        let handle = host
            .submit(SubmitRequest::get("assets/../../secret"), recorder.callbacks())
            .unwrap();

        // Completed before submit returned; nothing left to pump.
        assert_eq!(host.pending_count(), 0);
        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Error { status: TRANSPORT_REJECTED, .. })
        ));
        assert_eq!(host.bridge().relay().live_count(), 0);
    }

    #[tokio::test]
    async fn test_post_to_local_target_releases_submit_buffer() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("scores"), b"ok").unwrap();
        let mut host = host_at(root.path());
        let recorder = Recorder::new();

        let handle = host
            .submit(SubmitRequest::post("scores", b"99"), recorder.callbacks())
            .unwrap();
        assert_eq!(host.bridge().relay().live_count(), 1);
        settle(&mut host).await;

        assert!(matches!(
            recorder.terminal(handle),
            Some(Call::Success { .. })
        ));
        assert_eq!(host.bridge().relay().live_count(), 0);
    }

    #[tokio::test]
    async fn test_pending_limit_refuses_submission() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a"), b"a").unwrap();
        let mut host = HostLoop::new(RuntimeConfig {
            dispatch: DispatchConfig {
                max_pending: 1,
                ..DispatchConfig::default()
            },
            transport: TransportConfig {
                local_root: root.path().to_path_buf(),
                ..TransportConfig::default()
            },
        })
        .unwrap();
        let recorder = Recorder::new();

        host.submit(SubmitRequest::get("a"), recorder.callbacks()).unwrap();
        assert_eq!(
            host.submit(SubmitRequest::get("a"), recorder.callbacks()),
            Err(DispatchError::TooManyPending { limit: 1 })
        );
        settle(&mut host).await;

        host.submit(SubmitRequest::get("a"), recorder.callbacks()).unwrap();
        settle(&mut host).await;
        let successes = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Success { .. }))
            .count();
        assert_eq!(successes, 2);
    }
}
