//! Kubernetes-backed implementation of the runtime's resource client.
//!
//! All tokio/kube plumbing is confined to this crate: the rest of the
//! workspace is synchronous and talks to the cluster through the
//! [`ResourceClient`] trait, so a self-contained runtime bridges the async
//! watch streams into plain mpsc channels.

mod paths;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::sync_channel;
use std::sync::{Arc, Mutex};

use futures::{pin_mut, TryStreamExt};
use http::header::ACCEPT;
use kube::api::WatchEvent;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::ApiResource;
use kube::discovery::{verbs, Discovery, Scope};
use kube::{Client, Config};
use serde_json::Value;

use kwatch_runtime::{
    Error, InitialSnapshot, Lifecycle, RawEvent, ResourceClient, ResourceMeta, ResourceQuery,
    Result, StreamMessage, WatchStream,
};

use paths::{collection_path, encode_query_value};

/// Server-side tabular representation, with a v1beta1 fallback for old
/// API servers.
const TABLE_ACCEPT: &str = "application/json;as=Table;v=v1;g=meta.k8s.io, \
     application/json;as=Table;v=v1beta1;g=meta.k8s.io, application/json";

/// Connection settings from the CLI's kubeconfig-related flags.
#[derive(Debug, Clone, Default)]
pub struct ClientFlags {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub cluster: Option<String>,
    pub user: Option<String>,
}

#[derive(Clone)]
struct ResolvedResource {
    resource: ApiResource,
    namespaced: bool,
}

pub struct KubeResourceClient {
    runtime: Arc<tokio::runtime::Runtime>,
    client: Client,
    default_namespace: String,
    config_paths: Vec<PathBuf>,
    // Watch retries re-resolve the same argument every few seconds; cache
    // the discovery result instead of re-running discovery each time.
    resolved: Mutex<HashMap<String, ResolvedResource>>,
}

impl KubeResourceClient {
    pub fn connect(flags: &ClientFlags) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| Error::Client(format!("start client runtime: {err}")))?;

        let options = KubeConfigOptions {
            context: flags.context.clone(),
            cluster: flags.cluster.clone(),
            user: flags.user.clone(),
        };
        let config = runtime
            .block_on(load_config(flags.kubeconfig.clone(), options))
            .map_err(|err| Error::Config(format!("read kubeconfig: {err}")))?;

        let default_namespace = config.default_namespace.clone();
        let client = Client::try_from(config)
            .map_err(|err| Error::Client(format!("create client: {err}")))?;

        Ok(KubeResourceClient {
            runtime: Arc::new(runtime),
            client,
            default_namespace,
            config_paths: kubeconfig_paths(flags),
            resolved: Mutex::new(HashMap::new()),
        })
    }

    /// Resolve a positional resource argument (plural, kind or singular,
    /// case-insensitive) via API discovery.
    fn resolve(&self, argument: &str) -> Result<ResolvedResource> {
        if argument.is_empty() {
            return Err(Error::Config("no resource type given".to_string()));
        }
        if let Some(hit) = self.resolved.lock().unwrap().get(argument) {
            return Ok(hit.clone());
        }

        let client = self.client.clone();
        let discovery = self
            .runtime
            .block_on(async move { Discovery::new(client).run().await })
            .map_err(|err| Error::Client(format!("discover server resources: {err}")))?;

        for group in discovery.groups() {
            for (resource, capabilities) in group.recommended_resources() {
                if !matches_argument(argument, &resource) {
                    continue;
                }
                if !capabilities.supports_operation(verbs::WATCH) {
                    return Err(Error::Config(format!(
                        "resource type {argument:?} does not support watching"
                    )));
                }
                let hit = ResolvedResource {
                    namespaced: matches!(capabilities.scope, Scope::Namespaced),
                    resource,
                };
                self.resolved
                    .lock()
                    .unwrap()
                    .insert(argument.to_string(), hit.clone());
                return Ok(hit);
            }
        }
        Err(Error::Config(format!(
            "the server doesn't have a resource type {argument:?}"
        )))
    }

    fn request_table(&self, uri: String) -> Result<Value> {
        let request = http::Request::builder()
            .uri(uri)
            .header(ACCEPT, TABLE_ACCEPT)
            .body(Vec::new())
            .map_err(|err| Error::Client(format!("build request: {err}")))?;
        let client = self.client.clone();
        self.runtime
            .block_on(async move { client.request::<Value>(request).await })
            .map_err(|err| Error::Client(err.to_string()))
    }

    fn selector_query(&self, query: &ResourceQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(labels) = &query.label_selector {
            params.push(("labelSelector".to_string(), labels.clone()));
        }
        let mut field_selector = query.field_selector.clone().unwrap_or_default();
        if let Some(name) = query.names().first() {
            if !field_selector.is_empty() {
                field_selector.push(',');
            }
            field_selector.push_str(&format!("metadata.name={name}"));
        }
        if !field_selector.is_empty() {
            params.push(("fieldSelector".to_string(), field_selector));
        }
        params
    }
}

impl ResourceClient for KubeResourceClient {
    fn default_namespace(&self) -> Result<String> {
        Ok(self.default_namespace.clone())
    }

    fn fetch(&self, query: &ResourceQuery) -> Result<InitialSnapshot> {
        let resolved = self.resolve(query.resource())?;
        let meta = ResourceMeta {
            group: resolved.resource.group.clone(),
            version: resolved.resource.version.clone(),
            kind: resolved.resource.kind.clone(),
            namespaced: resolved.namespaced,
        };

        let names = query.names();
        if names.len() > 1 {
            return Err(Error::Config(
                "at most one resource name is supported".to_string(),
            ));
        }

        let namespace = (resolved.namespaced && !query.all_namespaces)
            .then_some(query.namespace.as_str());
        let base = collection_path(&resolved.resource, namespace);

        if let Some(name) = names.first() {
            // Single objects fetch directly; the watch cursor stays at "0"
            // so the watch itself delivers the add event.
            let payload = self.request_table(format!("{base}/{name}"))?;
            return Ok(InitialSnapshot {
                meta,
                payloads: vec![payload],
                list_resource_version: None,
            });
        }

        let uri = with_query(&base, &self.selector_query(query));
        let payload = self.request_table(uri)?;
        let resource_version = payload
            .get("metadata")
            .and_then(|m| m.get("resourceVersion"))
            .and_then(Value::as_str)
            .unwrap_or("0")
            .to_string();
        Ok(InitialSnapshot {
            meta,
            payloads: vec![payload],
            list_resource_version: Some(resource_version),
        })
    }

    fn watch(&self, query: &ResourceQuery, resource_version: &str) -> Result<WatchStream> {
        let resolved = self.resolve(query.resource())?;
        let namespace = (resolved.namespaced && !query.all_namespaces)
            .then_some(query.namespace.as_str());
        let base = collection_path(&resolved.resource, namespace);

        let mut params = vec![
            ("watch".to_string(), "true".to_string()),
            ("resourceVersion".to_string(), resource_version.to_string()),
            ("allowWatchBookmarks".to_string(), "false".to_string()),
        ];
        params.extend(self.selector_query(query));
        let uri = with_query(&base, &params);

        let request = http::Request::builder()
            .uri(uri)
            .header(ACCEPT, TABLE_ACCEPT)
            .body(Vec::new())
            .map_err(|err| Error::Client(format!("build watch request: {err}")))?;

        let (tx, rx) = sync_channel(64);
        let client = self.client.clone();
        let handle = self.runtime.spawn(async move {
            let stream = match client.request_events::<Value>(request).await {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = tx.send(StreamMessage::Error(err.to_string()));
                    return;
                }
            };
            pin_mut!(stream);
            loop {
                match stream.try_next().await {
                    Ok(Some(event)) => {
                        if tx.send(convert_event(event)).is_err() {
                            // Receiver gone: the stream was torn down.
                            return;
                        }
                    }
                    Ok(None) => return,
                    Err(err) => {
                        let _ = tx.send(StreamMessage::Error(err.to_string()));
                        return;
                    }
                }
            }
        });

        Ok(WatchStream::new(rx, Box::new(AbortOnDrop(handle))))
    }

    fn config_paths(&self) -> Vec<PathBuf> {
        self.config_paths.clone()
    }
}

/// Aborts the stream-forwarding task when the watch stream is dropped.
struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn load_config(
    kubeconfig: Option<PathBuf>,
    options: KubeConfigOptions,
) -> std::result::Result<Config, String> {
    if let Some(path) = kubeconfig {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|err| err.to_string())?;
        return Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|err| err.to_string());
    }
    match Config::from_kubeconfig(&options).await {
        Ok(config) => Ok(config),
        // Fall back to in-cluster configuration.
        Err(kubeconfig_err) => Config::infer()
            .await
            .map_err(|_| kubeconfig_err.to_string()),
    }
}

fn convert_event(event: WatchEvent<Value>) -> StreamMessage {
    match event {
        WatchEvent::Added(payload) => StreamMessage::Event(RawEvent {
            lifecycle: Lifecycle::Added,
            payload,
        }),
        WatchEvent::Modified(payload) => StreamMessage::Event(RawEvent {
            lifecycle: Lifecycle::Modified,
            payload,
        }),
        WatchEvent::Deleted(payload) => StreamMessage::Event(RawEvent {
            lifecycle: Lifecycle::Deleted,
            payload,
        }),
        WatchEvent::Bookmark(_) => StreamMessage::Event(RawEvent {
            lifecycle: Lifecycle::Bookmark,
            payload: Value::Null,
        }),
        WatchEvent::Error(status) => {
            StreamMessage::Error(format!("watch error: {}", status.message))
        }
    }
}

fn matches_argument(argument: &str, resource: &ApiResource) -> bool {
    argument.eq_ignore_ascii_case(&resource.plural)
        || argument.eq_ignore_ascii_case(&resource.kind)
        || format!("{}s", resource.kind).eq_ignore_ascii_case(argument)
}

/// The kubeconfig files the `-W` watcher should observe, in precedence
/// order: the explicit flag, `$KUBECONFIG` entries, `~/.kube/config`.
fn kubeconfig_paths(flags: &ClientFlags) -> Vec<PathBuf> {
    if let Some(path) = &flags.kubeconfig {
        return vec![path.clone()];
    }
    if let Ok(env) = std::env::var("KUBECONFIG") {
        let paths: Vec<PathBuf> = std::env::split_paths(&env).collect();
        if !paths.is_empty() {
            return paths;
        }
    }
    dirs::home_dir()
        .map(|home| vec![home.join(".kube").join("config")])
        .unwrap_or_default()
}

fn with_query(base: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    let query: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_query_value(value)))
        .collect();
    format!("{base}?{}", query.join("&"))
}
