//! CLI command definitions and dispatch.

pub mod image;
pub mod service;

use clap::{Parser, Subcommand};

/// baton — dependency-aware builds and runs for container services.
#[derive(Parser, Debug)]
#[command(name = baton_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Show the output of external build commands.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Act on a standalone image under `images/`.
    Image(image::ImageArgs),
    /// Act on a service under `services/` and its dependency tree.
    Service(service::ServiceArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let verbose = cli.verbose > 0;
    match cli.command {
        Command::Image(args) => image::execute(args, verbose),
        Command::Service(args) => service::execute(args, verbose),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_service_run_with_profile_and_verbosity() {
        let cli = Cli::try_parse_from(["baton", "service", "run", "users", "debug", "-v"])
            .expect("should parse");
        assert_eq!(cli.verbose, 1);
        let Command::Service(args) = cli.command else {
            unreachable!("expected a service command");
        };
        assert_eq!(args.action, "run");
        assert_eq!(args.target, "users");
        assert_eq!(args.profile.as_deref(), Some("debug"));
    }

    #[test]
    fn parses_image_build_without_verbosity() {
        let cli = Cli::try_parse_from(["baton", "image", "build", "db"]).expect("should parse");
        assert_eq!(cli.verbose, 0);
        let Command::Image(args) = cli.command else {
            unreachable!("expected an image command");
        };
        assert_eq!(args.action, "build");
        assert_eq!(args.target, "db");
    }
}
