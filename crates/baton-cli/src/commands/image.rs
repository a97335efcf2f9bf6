//! `baton image` — actions on standalone images.

use baton_builder::orchestrator::Orchestrator;
use baton_common::error::BatonError;
use baton_common::workspace::Workspace;
use baton_core::resolver;
use clap::Args;

/// Arguments for the `image` subcommand.
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Action to perform on the image.
    pub action: String,

    /// Name of the image under `images/`.
    pub target: String,
}

const VALID_ACTIONS: &str = "build";

/// Executes an `image` action.
///
/// An unknown action is reported on stderr with the valid actions and
/// does not fail the invocation; no work has started at that point.
///
/// # Errors
///
/// Returns an error if the build fails.
pub fn execute(args: ImageArgs, verbose: bool) -> anyhow::Result<()> {
    match args.action.as_str() {
        "build" => build(&args.target, verbose),
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

/// Builds one image from its context directory.
fn build(target: &str, verbose: bool) -> anyhow::Result<()> {
    let workspace = Workspace::discover()?;
    tracing::info!(image = target, root = %workspace.root().display(), "image build requested");

    let graph = resolver::resolve_image(target);
    Orchestrator::new(&workspace, verbose)?.build(&graph)?;
    Ok(())
}
