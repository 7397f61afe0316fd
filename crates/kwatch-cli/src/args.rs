use std::path::PathBuf;

use clap::Parser;

use kwatch_runtime::OptionalDuration;

#[derive(Parser)]
#[command(name = "kwatch")]
#[command(version)]
#[command(about = "Watches resources")]
#[command(long_about = "Watches resources.

Prints a table of the most important information about the specified
resource and keeps it up to date from the live change stream, instead of
re-printing a snapshot on an interval.

Supports the usual listing flags: label selectors (--selector, -l),
all namespaces (--all-namespaces, -A) and wide output (--output, -o).")]
#[command(after_help = "Examples:
  # Watch all pods
  kwatch pods

  # Watch all pods with more information (such as node name)
  kwatch pods -o wide

  # Watch a specific pod
  kwatch pods my-pod-7d68885db5-6dfst

  # Watch a subset of pods, filtering on labels
  kwatch pods --selector app=my-app

  # Watch all pods in all namespaces
  kwatch pods -A

  # Watch other resource types
  kwatch cronjobs
  kwatch deployments
  kwatch nodes

  # Restart the watch when the kubeconfig file changes,
  # such as after switching contexts
  kwatch pods -W")]
pub struct Cli {
    /// Resource type, optionally followed by a resource name.
    #[arg(required = true, value_name = "TYPE [NAME]")]
    pub args: Vec<String>,

    /// List the requested object(s) across all namespaces.
    #[arg(short = 'A', long, env = "KWATCH_ALL_NAMESPACES")]
    pub all_namespaces: bool,

    /// Selector (label query) to filter on, supports '=', '==', and '!='.
    #[arg(short = 'l', long = "selector", env = "KWATCH_SELECTOR")]
    pub selector: Option<String>,

    /// Selector (field query) to filter on, supports '=', '==', and '!='.
    #[arg(long, env = "KWATCH_FIELD_SELECTOR")]
    pub field_selector: Option<String>,

    /// Output format. Only "wide" is supported.
    #[arg(short = 'o', long, env = "KWATCH_OUTPUT")]
    pub output: Option<String>,

    /// Comma separated list of labels to present as columns.
    #[arg(short = 'L', long = "label-columns", env = "KWATCH_LABEL_COLUMNS")]
    pub label_columns: Vec<String>,

    /// Hide deleted rows after this duration. "0" always hides,
    /// "false" shows them forever.
    #[arg(long, default_value = "30s", env = "KWATCH_HIDE_DELETED")]
    pub hide_deleted: OptionalDuration,

    /// Restart the watch when the kubeconfig file changes.
    #[arg(short = 'W', long, env = "KWATCH_WATCH_KUBECONFIG")]
    pub watch_kubeconfig: bool,

    /// Namespace to list resources in. Defaults to the current context's.
    #[arg(short = 'n', long, env = "KWATCH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Path to the kubeconfig file to use.
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Name of the kubeconfig context to use.
    #[arg(long)]
    pub context: Option<String>,

    /// Name of the kubeconfig cluster to use.
    #[arg(long)]
    pub cluster: Option<String>,

    /// Name of the kubeconfig user to use.
    #[arg(long)]
    pub user: Option<String>,
}
