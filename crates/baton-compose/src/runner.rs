//! Launching a projected topology through the external orchestrator.
//!
//! The run blocks for the lifetime of the launched topology. Teardown
//! is unconditional: kill and remove run whether the topology exited
//! cleanly, failed, or was interrupted, so no containers are left
//! behind.

use std::path::{Path, PathBuf};
use std::process::Command;

use baton_common::error::{BatonError, Result};
use baton_common::fsutil;
use baton_common::workspace::Workspace;

use crate::topology::Topology;

const COMPOSE_BIN: &str = "docker-compose";

/// External multi-service orchestration.
pub trait ComposeBackend: Send + Sync {
    /// Brings up `entry` and its linked closure from the topology file
    /// in `dir`, blocking until the topology exits. Returns whether it
    /// exited cleanly.
    ///
    /// # Errors
    ///
    /// Returns an error if the orchestration tool cannot be invoked.
    fn up(&self, dir: &Path, entry: &str) -> Result<bool>;

    /// Force-stops and removes the topology's containers.
    ///
    /// # Errors
    ///
    /// Returns an error if the orchestration tool cannot be invoked.
    fn kill(&self, dir: &Path) -> Result<()>;
}

/// Backend that shells out to the Docker Compose CLI.
#[derive(Debug)]
pub struct DockerCompose {
    compose: PathBuf,
}

impl DockerCompose {
    /// Locates the `docker-compose` binary on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`BatonError::ToolNotFound`] when Docker Compose is not
    /// installed.
    pub fn discover() -> Result<Self> {
        let compose = which::which(COMPOSE_BIN).map_err(|_| BatonError::ToolNotFound {
            tool: COMPOSE_BIN,
            hint: "install Docker Compose or add it to your PATH",
        })?;
        Ok(Self { compose })
    }
}

impl ComposeBackend for DockerCompose {
    fn up(&self, dir: &Path, entry: &str) -> Result<bool> {
        tracing::debug!(entry, dir = %dir.display(), "invoking docker-compose up");
        let status = Command::new(&self.compose)
            .args(["up", "--no-recreate", entry])
            .current_dir(dir)
            .status()
            .map_err(|e| spawn_err(&self.compose, e))?;
        Ok(status.success())
    }

    fn kill(&self, dir: &Path) -> Result<()> {
        // Exit codes are ignored; there may be nothing left to kill.
        let _ = Command::new(&self.compose)
            .arg("kill")
            .current_dir(dir)
            .status()
            .map_err(|e| spawn_err(&self.compose, e))?;
        let _ = Command::new(&self.compose)
            .args(["rm", "-f"])
            .current_dir(dir)
            .status()
            .map_err(|e| spawn_err(&self.compose, e))?;
        Ok(())
    }
}

fn spawn_err(program: &Path, source: std::io::Error) -> BatonError {
    BatonError::Io {
        path: program.to_path_buf(),
        source,
    }
}

/// Runs a projected topology and always tears it down afterwards.
pub struct Runner<'a> {
    workspace: &'a Workspace,
    backend: Box<dyn ComposeBackend>,
}

impl<'a> Runner<'a> {
    /// Creates a runner backed by the Docker Compose CLI.
    ///
    /// # Errors
    ///
    /// Returns an error if Docker Compose is not installed.
    pub fn new(workspace: &'a Workspace) -> Result<Self> {
        Ok(Self::with_backend(
            workspace,
            Box::new(DockerCompose::discover()?),
        ))
    }

    /// Creates a runner with a custom orchestration backend.
    #[must_use]
    pub fn with_backend(workspace: &'a Workspace, backend: Box<dyn ComposeBackend>) -> Self {
        Self { workspace, backend }
    }

    /// Exports `topology` into the run working directory for `target`
    /// and brings up `entry`.
    ///
    /// `target` is the service the invocation was made for and names
    /// the working directory; `entry` is the topology entry to launch,
    /// which differs from `target` when a run profile is used.
    ///
    /// The returned flag reflects only the run's own exit status;
    /// teardown runs regardless of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be prepared,
    /// the topology cannot be exported, or the orchestration tool
    /// cannot be invoked.
    pub fn run(&self, topology: &Topology, target: &str, entry: &str) -> Result<bool> {
        let work_dir = self.workspace.work_dir("service", "run", target);
        fsutil::clean_dir(&work_dir)?;
        let path = topology.export(&work_dir)?;
        tracing::info!(entry, path = %path.display(), "starting topology");

        eprintln!(">>> Running service '{entry}' and its dependencies");
        let up_result = self.backend.up(&work_dir, entry);

        eprintln!(">>> Killing service '{entry}' and its dependencies");
        let kill_result = self.backend.kill(&work_dir);

        let succeeded = up_result?;
        kill_result?;
        tracing::info!(entry, succeeded, "topology finished");
        Ok(succeeded)
    }
}
