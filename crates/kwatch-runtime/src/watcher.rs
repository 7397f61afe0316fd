use std::path::PathBuf;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};

use crate::controller::WatchController;
use crate::error::{Error, Result};

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Watches the credential files a watch session was built from and restarts
/// the session when they are rewritten (e.g. after switching contexts).
/// Rapid successive file events coalesce into one restart: the worker keeps
/// sliding its sleep window while events keep arriving, so a bulk rewrite
/// does not trigger a restart storm.
pub struct KubeconfigWatcher {
    _watcher: PollWatcher,
}

impl KubeconfigWatcher {
    pub fn spawn(paths: Vec<PathBuf>, controller: Arc<WatchController>) -> Result<Self> {
        let (tx_fs, rx_fs) = channel();

        let config = notify::Config::default().with_poll_interval(Duration::from_secs(1));
        let mut watcher = PollWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx_fs.send(event);
                }
            },
            config,
        )
        .map_err(|err| Error::Config(format!("create file watcher: {err}")))?;

        for path in &paths {
            // Missing kubeconfig entries are skipped, not fatal.
            let _ = watcher.watch(path, RecursiveMode::NonRecursive);
        }

        let cancel = controller.cancel_token();
        thread::Builder::new()
            .name("kubeconfig-watcher".to_string())
            .spawn(move || {
                while let Ok(event) = rx_fs.recv() {
                    if cancel.is_cancelled() {
                        return;
                    }
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        continue;
                    }
                    // Sliding debounce: keep draining while events arrive.
                    loop {
                        match rx_fs.recv_timeout(DEBOUNCE_WINDOW) {
                            Ok(_) => continue,
                            Err(RecvTimeoutError::Timeout) => break,
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                    if cancel.is_cancelled() {
                        return;
                    }
                    controller.restart();
                }
            })
            .map_err(|err| Error::Config(format!("spawn kubeconfig watcher: {err}")))?;

        Ok(KubeconfigWatcher { _watcher: watcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InitialSnapshot, ResourceClient, ResourceMeta, ResourceQuery};
    use crate::error::Result;
    use crate::event::{StreamMessage, WatchStream};
    use crate::options::Options;
    use kwatch_core::TableCommand;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::sync_channel;
    use std::sync::mpsc::SyncSender;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Fetches count up; watch streams stay open and idle.
    struct StubClient {
        fetches: AtomicUsize,
        open_streams: Mutex<Vec<SyncSender<StreamMessage>>>,
    }

    impl StubClient {
        fn new() -> Self {
            StubClient {
                fetches: AtomicUsize::new(0),
                open_streams: Mutex::new(Vec::new()),
            }
        }
    }

    impl ResourceClient for StubClient {
        fn default_namespace(&self) -> Result<String> {
            Ok("default".to_string())
        }

        fn fetch(&self, _query: &ResourceQuery) -> Result<InitialSnapshot> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(InitialSnapshot {
                meta: ResourceMeta {
                    group: String::new(),
                    version: "v1".to_string(),
                    kind: "Pod".to_string(),
                    namespaced: true,
                },
                payloads: Vec::new(),
                list_resource_version: Some("1".to_string()),
            })
        }

        fn watch(&self, _query: &ResourceQuery, _resource_version: &str) -> Result<WatchStream> {
            let (tx, rx) = sync_channel(16);
            self.open_streams.lock().unwrap().push(tx);
            Ok(WatchStream::new(rx, Box::new(())))
        }
    }

    #[test]
    fn kubeconfig_rewrite_restarts_the_watch() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config");
        std::fs::write(&path, "context: a").expect("seed file");

        let (tx, rx) = sync_channel(64);
        let client = Arc::new(StubClient::new());
        let controller = Arc::new(WatchController::new(
            client.clone(),
            Options::default(),
            vec!["pods".to_string()],
            tx,
        ));
        controller.watch().expect("initial watch");
        assert_eq!(client.fetches.load(Ordering::SeqCst), 1);

        let _watcher =
            KubeconfigWatcher::spawn(vec![path.clone()], controller.clone()).expect("watcher");

        // Let the poll watcher take its baseline, then rewrite the file.
        thread::sleep(Duration::from_millis(1500));
        std::fs::write(&path, "context: b").expect("rewrite file");

        let deadline = Instant::now() + Duration::from_secs(5);
        while client.fetches.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(100));
        }
        assert!(
            client.fetches.load(Ordering::SeqCst) >= 2,
            "restart did not refetch"
        );

        let mut saw_clear = false;
        while let Ok(command) = rx.try_recv() {
            if matches!(command, TableCommand::Clear) {
                saw_clear = true;
            }
        }
        assert!(saw_clear, "restart did not clear the table");
        controller.shutdown();
    }
}
