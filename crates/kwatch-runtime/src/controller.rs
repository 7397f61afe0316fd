use std::sync::mpsc::{RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;

use kwatch_core::TableCommand;

use crate::client::{ResourceClient, ResourceQuery};
use crate::decoder::decode_table;
use crate::error::{Error, Result};
use crate::event::{Lifecycle, StreamMessage};
use crate::options::Options;
use crate::token::CancelToken;
use crate::translate::Translator;

const RETRY_DELAY: Duration = Duration::from_secs(5);
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

struct Worker {
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

/// Owns the watch session: initial fetch, the stream worker with its retry
/// loop, and wholesale restarts. Exactly one stream worker is alive at a
/// time; the old one is cancelled *and joined* before a new one starts, so
/// two workers can never feed the table concurrently.
pub struct WatchController {
    client: Arc<dyn ResourceClient>,
    options: Options,
    args: Vec<String>,
    tx: SyncSender<TableCommand>,
    cancel: CancelToken,
    retry_delay: Duration,
    worker: Mutex<Option<Worker>>,
}

impl WatchController {
    pub fn new(
        client: Arc<dyn ResourceClient>,
        options: Options,
        args: Vec<String>,
        tx: SyncSender<TableCommand>,
    ) -> Self {
        WatchController {
            client,
            options,
            args,
            tx,
            cancel: CancelToken::new(),
            retry_delay: RETRY_DELAY,
            worker: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The session-scoped cancellation token. Cancelling it stops the
    /// stream promptly and prevents further reconnect attempts.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop everything and wait for the stream worker to exit.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.stop_worker();
    }

    /// Validate configuration that must be correct before the UI starts:
    /// output mode and namespace resolution.
    pub fn preflight(&self) -> Result<()> {
        self.options.validate()?;
        self.build_query()?;
        Ok(())
    }

    /// Establish the initial watch: fetch the snapshot, print it as Added,
    /// then hand the stream to a worker. Errors here are fatal setup
    /// failures (bad output format, unresolvable namespace, unknown
    /// resource type) and terminate the session.
    pub fn watch(&self) -> Result<()> {
        self.options.validate()?;
        self.start_watch(false)
    }

    /// Cancel the active stream and reconnect from scratch, clearing the
    /// table before the first print so rows from the old context don't
    /// linger. Rows that survived under the old column layout are replaced
    /// wholesale by this resync. Retries forever (with backoff) until the
    /// session is cancelled.
    pub fn restart(&self) {
        self.stop_worker();
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            match self.start_watch(true) {
                Ok(()) => return,
                Err(err) => {
                    let _ = self.tx.send(TableCommand::SetError(format!(
                        "retry in 5s: restart watch: {err}"
                    )));
                }
            }
            if self.cancel.wait_timeout(self.retry_delay) {
                return;
            }
        }
    }

    fn stop_worker(&self) {
        let worker = self.worker.lock().unwrap().take();
        if let Some(worker) = worker {
            worker.cancel.cancel();
            let _ = worker.handle.join();
        }
    }

    fn build_query(&self) -> Result<ResourceQuery> {
        let namespace = match &self.options.namespace {
            Some(namespace) => namespace.clone(),
            None => self.client.default_namespace()?,
        };
        if namespace.is_empty() {
            return Err(Error::Config("no namespace selected".to_string()));
        }
        Ok(ResourceQuery {
            args: self.args.clone(),
            namespace,
            all_namespaces: self.options.all_namespaces,
            label_selector: self.options.label_selector.clone(),
            field_selector: self.options.field_selector.clone(),
        })
    }

    fn start_watch(&self, clear_before_printing: bool) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Ok(());
        }
        let query = self.build_query()?;
        let snapshot = self.client.fetch(&query)?;
        let mut translator = Translator::new(
            self.options.wide(),
            self.options.normalized_label_columns(),
            query.all_namespaces,
            snapshot.meta.clone(),
        );

        if clear_before_printing {
            let _ = self.tx.send(TableCommand::Clear);
        }

        let now = Utc::now();
        for payload in &snapshot.payloads {
            let table = decode_table(payload)?;
            for command in translator.translate(&table, Lifecycle::Added, now)? {
                let _ = self.tx.send(command);
            }
        }
        // A fetch that got this far supersedes any advisory error from a
        // previous attempt.
        let _ = self.tx.send(TableCommand::ClearError);
        let _ = self.tx.send(TableCommand::StopSpinner);

        // Watching from resource version "0" makes the watch itself deliver
        // the add event for single objects. List responses already
        // represented the Added state, so they resume from their own
        // version to avoid duplicating it.
        let resource_version = snapshot
            .list_resource_version
            .clone()
            .unwrap_or_else(|| "0".to_string());

        let worker_cancel = CancelToken::new();
        let thread_cancel = worker_cancel.clone();
        let session_cancel = self.cancel.clone();
        let client = self.client.clone();
        let tx = self.tx.clone();
        let retry_delay = self.retry_delay;
        let handle = thread::Builder::new()
            .name("watch-stream".to_string())
            .spawn(move || {
                watch_loop(
                    client,
                    query,
                    resource_version,
                    translator,
                    tx,
                    session_cancel,
                    thread_cancel,
                    retry_delay,
                );
            })
            .map_err(|err| Error::Client(format!("spawn stream worker: {err}")))?;

        *self.worker.lock().unwrap() = Some(Worker {
            cancel: worker_cancel,
            handle,
        });
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn watch_loop(
    client: Arc<dyn ResourceClient>,
    query: ResourceQuery,
    resource_version: String,
    mut translator: Translator,
    tx: SyncSender<TableCommand>,
    session: CancelToken,
    worker: CancelToken,
    retry_delay: Duration,
) {
    loop {
        let result = pipe_events(
            client.as_ref(),
            &query,
            &resource_version,
            &mut translator,
            &tx,
            &session,
            &worker,
        );
        if session.is_cancelled() || worker.is_cancelled() {
            return;
        }
        if let Err(err) = result {
            let _ = tx.send(TableCommand::SetError(format!("retry in 5s: {err}")));
        }
        if wait_either(&session, &worker, retry_delay) {
            return;
        }
    }
}

fn pipe_events(
    client: &dyn ResourceClient,
    query: &ResourceQuery,
    resource_version: &str,
    translator: &mut Translator,
    tx: &SyncSender<TableCommand>,
    session: &CancelToken,
    worker: &CancelToken,
) -> Result<()> {
    let stream = client.watch(query, resource_version)?;
    loop {
        if session.is_cancelled() || worker.is_cancelled() {
            return Ok(());
        }
        match stream.receiver().recv_timeout(POLL_TIMEOUT) {
            Ok(StreamMessage::Event(event)) => {
                let table = decode_table(&event.payload)?;
                for command in translator.translate(&table, event.lifecycle, Utc::now())? {
                    let _ = tx.send(command);
                }
            }
            Ok(StreamMessage::Error(message)) => return Err(Error::Stream(message)),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::Stream("watch channel closed".to_string()))
            }
        }
    }
}

/// Sleep until either token cancels or the window elapses. Returns true on
/// cancellation.
fn wait_either(session: &CancelToken, worker: &CancelToken, total: Duration) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if session.is_cancelled() || worker.is_cancelled() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let step = (deadline - now).min(POLL_TIMEOUT);
        if session.wait_timeout(step) {
            return true;
        }
    }
}
