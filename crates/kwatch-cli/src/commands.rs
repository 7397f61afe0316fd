use std::sync::Arc;

use anyhow::Result;

use kwatch_client::{ClientFlags, KubeResourceClient};
use kwatch_runtime::Options;

use crate::args::Cli;
use crate::handlers;
use crate::presentation::theme::detect_theme;

pub fn run(cli: Cli) -> Result<()> {
    let options = Options {
        namespace: cli.namespace,
        all_namespaces: cli.all_namespaces,
        label_selector: cli.selector,
        field_selector: cli.field_selector,
        output: cli.output,
        label_columns: cli.label_columns,
        hide_deleted: cli.hide_deleted,
        watch_kubeconfig: cli.watch_kubeconfig,
    };
    // Flag validation happens before any connection is attempted.
    options.validate()?;

    let flags = ClientFlags {
        kubeconfig: cli.kubeconfig,
        context: cli.context,
        cluster: cli.cluster,
        user: cli.user,
    };
    let client = Arc::new(KubeResourceClient::connect(&flags)?);

    let theme = detect_theme();
    handlers::watch::handle(client, options, cli.args, theme)
}
