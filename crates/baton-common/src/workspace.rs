//! Managed project tree layout and discovery.
//!
//! A baton workspace is a repository with `images/` and `services/`
//! directories at its root and a scratch `build/` area for staging.
//! The root is the nearest ancestor of the starting directory that
//! contains a `.git` entry.

use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{BatonError, Result};

/// A discovered project tree that baton operates on.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Opens a workspace rooted at the given directory without probing.
    #[must_use]
    pub fn at_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discovers the workspace containing the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined or
    /// no ancestor contains a `.git` entry.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| BatonError::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        Self::discover_from(&cwd)
    }

    /// Discovers the workspace containing `start`.
    ///
    /// `.git` may be a directory or a file (worktrees); either marks the
    /// root.
    ///
    /// # Errors
    ///
    /// Returns [`BatonError::NoWorkspace`] if no ancestor of `start`
    /// contains a `.git` entry.
    pub fn discover_from(start: &Path) -> Result<Self> {
        start
            .ancestors()
            .find(|dir| dir.join(".git").exists())
            .map(|root| Self::at_root(root))
            .ok_or_else(|| BatonError::NoWorkspace {
                start: start.to_path_buf(),
            })
    }

    /// Returns the project root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding standalone image build contexts.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(constants::IMAGES_DIR)
    }

    /// Returns the build context directory of one image.
    #[must_use]
    pub fn image_dir(&self, name: &str) -> PathBuf {
        self.images_dir().join(name)
    }

    /// Returns the directory holding service source trees.
    #[must_use]
    pub fn services_dir(&self) -> PathBuf {
        self.root.join(constants::SERVICES_DIR)
    }

    /// Returns the source tree of one service.
    #[must_use]
    pub fn service_dir(&self, name: &str) -> PathBuf {
        self.services_dir().join(name)
    }

    /// Returns the path of a service's `service.yml`.
    #[must_use]
    pub fn service_config(&self, name: &str) -> PathBuf {
        self.service_dir(name).join(constants::SERVICE_CONFIG_FILE)
    }

    /// Returns the scratch directory used to stage builds.
    #[must_use]
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(constants::BUILD_DIR)
    }

    /// Returns the working directory for one action on one target.
    ///
    /// The directory name encodes `(kind, action, target)` so unrelated
    /// invocations never share staging state.
    #[must_use]
    pub fn work_dir(&self, kind: &str, action: &str, target: &str) -> PathBuf {
        self.build_dir().join(format!("{kind}:{action}:{target}"))
    }
}
