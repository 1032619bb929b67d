use crate::cli::RunArgs;
use anyhow::Context;
use shortcut::{simulated::SimulatedBrowser, Invocation, Registry};
use std::sync::Arc;
use tracing::info;

pub fn run(args: RunArgs, tab_count: usize) -> anyhow::Result<()> {
    let host = Arc::new(SimulatedBrowser::with_tabs(tab_count));
    let registry = Registry::browser(host.clone())?;
    let output = invoke(&registry, &host, &args)?;
    print!("{output}");
    Ok(())
}

/// Invoke the requested action and describe the resulting browser state.
pub fn invoke(
    registry: &Registry,
    host: &SimulatedBrowser,
    args: &RunArgs,
) -> anyhow::Result<String> {
    let invocation = Invocation {
        action: args.name.as_str().into(),
        argument: args.argument,
    };
    info!(%invocation, "running action");
    registry
        .invoke(&invocation)
        .with_context(|| format!("failed to run {invocation}"))?;

    let mut out = format!("{}\n", host.state());
    if registry.resolve(&args.name)?.has_query() {
        let on = registry.query(&args.name)?;
        out.push_str(&format!("{} is now {}\n", args.name, if on { "on" } else { "off" }));
    }
    Ok(out)
}
