//! `baton service` — actions on services and their dependency graphs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use baton_builder::orchestrator::Orchestrator;
use baton_common::error::BatonError;
use baton_common::workspace::Workspace;
use baton_compose::runner::Runner;
use baton_compose::topology::Topology;
use baton_core::resolver;
use clap::Args;

/// Arguments for the `service` subcommand.
#[derive(Args, Debug)]
pub struct ServiceArgs {
    /// Action to perform on the service.
    pub action: String,

    /// Name of the service under `services/`.
    pub target: String,

    /// Run profile from the service's `run` table (run action only).
    pub profile: Option<String>,
}

const VALID_ACTIONS: &str = "build, run";
const DEFAULT_PROFILE: &str = "default";

/// Executes a `service` action.
///
/// An unknown action is reported on stderr with the valid actions and
/// does not fail the invocation; no work has started at that point.
///
/// # Errors
///
/// Returns an error if resolution fails, the build fails, or an
/// external tool fails to start.
pub fn execute(args: ServiceArgs, verbose: bool) -> anyhow::Result<()> {
    match args.action.as_str() {
        "build" => build(&args.target, verbose),
        "run" => {
            let profile = args.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
            run(&args.target, profile, verbose)
        }
        _ => {
            let notice = BatonError::UnknownAction {
                action: args.action,
                valid: VALID_ACTIONS.to_owned(),
            };
            eprintln!("{notice}");
            Ok(())
        }
    }
}

/// Builds a service and every unit it depends on.
fn build(target: &str, verbose: bool) -> anyhow::Result<()> {
    let workspace = Workspace::discover()?;
    tracing::info!(service = target, root = %workspace.root().display(), "service build requested");

    let graph = resolver::resolve_service(&workspace, target)?;
    Orchestrator::new(&workspace, verbose)?.build(&graph)?;
    Ok(())
}

/// Builds a service, then launches it together with its visible
/// dependencies and tears the topology down afterwards.
fn run(target: &str, profile: &str, verbose: bool) -> anyhow::Result<()> {
    let workspace = Workspace::discover()?;
    tracing::info!(service = target, profile, "service run requested");

    let graph = resolver::resolve_service(&workspace, target)?;
    Orchestrator::new(&workspace, verbose)?.build(&graph)?;

    let mut topology = Topology::project(&graph);
    let Some(service) = graph.root().as_service() else {
        return Err(anyhow::anyhow!("resolved graph for '{target}' has a non-service root"));
    };
    let fragment = service
        .config
        .run_profile(profile)
        .cloned()
        .unwrap_or_default();

    let entry = if profile == DEFAULT_PROFILE {
        topology.extend(target, &fragment, None)?;
        target
    } else {
        topology.extend(profile, &fragment, Some(target))?;
        profile
    };

    print!("{}", topology.to_yaml()?);

    // Ctrl+C reaches the whole process group. The handler keeps this
    // process alive so teardown still runs after the compose child exits.
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    let succeeded = Runner::new(&workspace)?.run(&topology, target, entry)?;
    if interrupted.load(Ordering::SeqCst) {
        tracing::info!(service = entry, "run interrupted; topology torn down");
    } else if succeeded {
        tracing::info!(service = entry, "run finished");
    } else {
        tracing::warn!(service = entry, "run exited with a failure status");
    }
    Ok(())
}
