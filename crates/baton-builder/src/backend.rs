//! Image-build backend abstraction.
//!
//! The orchestrator drives a [`BuildBackend`]; the production
//! implementation shells out to the Docker CLI.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use baton_common::error::{BatonError, Result};

const DOCKER_BIN: &str = "docker";

/// External image build.
///
/// Implementors turn a staged build context into a tagged image.
pub trait BuildBackend: Send + Sync {
    /// Builds the context at `dir` into an image tagged `tag`.
    ///
    /// Build output stays hidden unless `verbose` is set or the build
    /// fails, in which case the captured output is surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`BatonError::BuildFailed`] when the external build
    /// exits non-zero.
    fn build_image(&self, dir: &Path, tag: &str, verbose: bool) -> Result<()>;
}

/// Backend that shells out to the Docker CLI.
#[derive(Debug)]
pub struct DockerBuild {
    docker: PathBuf,
}

impl DockerBuild {
    /// Locates the `docker` binary on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`BatonError::ToolNotFound`] when Docker is not
    /// installed.
    pub fn discover() -> Result<Self> {
        let docker = which::which(DOCKER_BIN).map_err(|_| BatonError::ToolNotFound {
            tool: DOCKER_BIN,
            hint: "install Docker or add it to your PATH",
        })?;
        Ok(Self { docker })
    }
}

impl BuildBackend for DockerBuild {
    fn build_image(&self, dir: &Path, tag: &str, verbose: bool) -> Result<()> {
        tracing::debug!(tag, dir = %dir.display(), "invoking docker build");

        let mut command = Command::new(&self.docker);
        let _ = command.args(["build", "-t", tag]).arg(dir);

        let status = if verbose {
            command.status().map_err(|e| spawn_err(&self.docker, e))?
        } else {
            // Capture stdout so a clean build stays quiet; stderr
            // passes through untouched.
            let output = command
                .stderr(Stdio::inherit())
                .output()
                .map_err(|e| spawn_err(&self.docker, e))?;
            if !output.status.success() {
                print!("{}", String::from_utf8_lossy(&output.stdout));
            }
            output.status
        };

        if status.success() {
            return Ok(());
        }
        Err(BatonError::BuildFailed {
            tag: tag.to_owned(),
            status: status.code().unwrap_or(-1),
        })
    }
}

fn spawn_err(program: &Path, source: std::io::Error) -> BatonError {
    BatonError::Io {
        path: program.to_path_buf(),
        source,
    }
}
