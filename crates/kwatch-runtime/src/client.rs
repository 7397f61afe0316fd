use crate::error::Result;
use crate::event::WatchStream;

/// Everything needed to build the list/watch requests for one watch session.
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    /// Positional arguments: resource type, then optional names.
    pub args: Vec<String>,
    /// Resolved target namespace. Ignored for cluster-scoped resources and
    /// when `all_namespaces` is set.
    pub namespace: String,
    pub all_namespaces: bool,
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
}

impl ResourceQuery {
    pub fn resource(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or_default()
    }

    pub fn names(&self) -> &[String] {
        self.args.get(1..).unwrap_or_default()
    }
}

/// Group/version/kind metadata of the resolved resource, used by the
/// translator to pick kind-specific cell transforms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMeta {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub namespaced: bool,
}

/// The initial state of a watch session: tabular payloads to print as
/// Added, plus the resumption cursor decision input.
#[derive(Debug, Clone)]
pub struct InitialSnapshot {
    pub meta: ResourceMeta,
    /// Tabular payloads, one per fetched object or list.
    pub payloads: Vec<serde_json::Value>,
    /// The resource version of a list response. `None` for single-object
    /// fetches, where the watch starts from "0" so the watch itself
    /// delivers the add event.
    pub list_resource_version: Option<String>,
}

/// The cluster collaborator: resolves the query, fetches the initial
/// snapshot in tabular form, and opens live event streams.
pub trait ResourceClient: Send + Sync {
    /// The namespace the current context resolves to.
    fn default_namespace(&self) -> Result<String>;

    /// Fetch the current object or list as tabular payloads.
    fn fetch(&self, query: &ResourceQuery) -> Result<InitialSnapshot>;

    /// Open a watch stream resuming from `resource_version`.
    fn watch(&self, query: &ResourceQuery, resource_version: &str) -> Result<WatchStream>;

    /// Files whose rewrite should restart the watch session (credentials).
    fn config_paths(&self) -> Vec<std::path::PathBuf> {
        Vec::new()
    }
}
