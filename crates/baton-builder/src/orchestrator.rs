//! Dependency-first build orchestration.
//!
//! Visits every unit of a resolved graph in postorder, so a unit is
//! only built once everything it depends on has been built. The walk
//! stops at the first failure; units downstream of the failed one are
//! never attempted.

use std::path::{Path, PathBuf};

use baton_common::error::Result;
use baton_common::fsutil;
use baton_common::workspace::Workspace;
use baton_core::graph::DependencyGraph;
use baton_core::unit::Unit;

use crate::backend::{BuildBackend, DockerBuild};

/// Drives dependency-first builds over a resolved graph.
pub struct Orchestrator<'a> {
    workspace: &'a Workspace,
    backend: Box<dyn BuildBackend>,
    verbose: bool,
}

impl<'a> Orchestrator<'a> {
    /// Creates an orchestrator backed by the Docker CLI.
    ///
    /// # Errors
    ///
    /// Returns an error if Docker is not installed.
    pub fn new(workspace: &'a Workspace, verbose: bool) -> Result<Self> {
        Ok(Self::with_backend(
            workspace,
            Box::new(DockerBuild::discover()?),
            verbose,
        ))
    }

    /// Creates an orchestrator with a custom build backend.
    #[must_use]
    pub fn with_backend(
        workspace: &'a Workspace,
        backend: Box<dyn BuildBackend>,
        verbose: bool,
    ) -> Self {
        Self {
            workspace,
            backend,
            verbose,
        }
    }

    /// Builds every unit of `graph`, dependencies first.
    ///
    /// Each unit's build context is staged into its own clean directory
    /// under the action's working directory before the external build
    /// runs. The working directory is removed when every build succeeds
    /// and kept for inspection when one fails.
    ///
    /// # Errors
    ///
    /// Returns the first build failure. Images already built in this
    /// walk are left in place; nothing is rolled back.
    pub fn build(&self, graph: &DependencyGraph) -> Result<()> {
        let root = graph.root();
        let work_dir = self
            .workspace
            .work_dir(root.kind().as_str(), "build", root.name());
        fsutil::clean_dir(&work_dir)?;
        tracing::info!(root = %root, units = graph.unit_count(), "building dependency graph");

        for idx in graph.postorder() {
            self.build_unit(graph.unit(idx), &work_dir)?;
        }

        let _ = std::fs::remove_dir_all(&work_dir);
        Ok(())
    }

    /// Stages and builds a single unit.
    ///
    /// An image without a build context directory is assumed to exist
    /// externally (e.g. pullable from a registry) and is skipped with
    /// a warning. A service always has a source tree; its description
    /// was loaded from it during resolution.
    fn build_unit(&self, unit: &Unit, work_dir: &Path) -> Result<()> {
        let context = match unit {
            Unit::Image(image) => {
                eprintln!(">>> Building image '{}'", image.name);
                let context = self.workspace.image_dir(&image.name);
                if !context.is_dir() {
                    eprintln!("Unknown image '{}'. Assuming it already exists.", image.name);
                    tracing::warn!(image = %image.name, "no build context, assuming external image");
                    return Ok(());
                }
                context
            }
            Unit::Service(service) => {
                eprintln!(">>> Building service '{}'", service.name);
                self.workspace.service_dir(&service.name)
            }
        };

        let stage_dir = stage_dir_for(work_dir, unit);
        fsutil::stage(&context, &stage_dir)?;
        self.backend
            .build_image(&stage_dir, &unit.image_tag(), self.verbose)
    }
}

/// Returns the staging directory for one unit under the action's
/// working directory.
fn stage_dir_for(work_dir: &Path, unit: &Unit) -> PathBuf {
    work_dir.join(format!("{}:{}", unit.kind(), unit.name()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use baton_common::error::BatonError;
    use baton_core::resolver;

    use super::*;

    /// Backend that records each requested build instead of running
    /// docker, failing on demand.
    #[derive(Default)]
    struct RecordingBackend {
        built: Arc<Mutex<Vec<String>>>,
        staged: Arc<Mutex<Vec<bool>>>,
        fail_on: Option<&'static str>,
    }

    impl BuildBackend for RecordingBackend {
        fn build_image(&self, dir: &Path, tag: &str, _verbose: bool) -> Result<()> {
            self.built.lock().expect("lock").push(tag.to_owned());
            self.staged
                .lock()
                .expect("lock")
                .push(dir.join("Dockerfile").is_file());
            if self.fail_on == Some(tag) {
                return Err(BatonError::BuildFailed {
                    tag: tag.to_owned(),
                    status: 1,
                });
            }
            Ok(())
        }
    }

    fn workspace_with(
        services: &[(&str, &str)],
        images: &[&str],
    ) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, yaml) in services {
            let service_dir = dir.path().join("services").join(name);
            std::fs::create_dir_all(&service_dir).expect("create service dir");
            std::fs::write(service_dir.join("service.yml"), yaml).expect("write service.yml");
            std::fs::write(service_dir.join("Dockerfile"), "FROM scratch\n")
                .expect("write Dockerfile");
        }
        for name in images {
            let image_dir = dir.path().join("images").join(name);
            std::fs::create_dir_all(&image_dir).expect("create image dir");
            std::fs::write(image_dir.join("Dockerfile"), "FROM scratch\n")
                .expect("write Dockerfile");
        }
        let workspace = Workspace::at_root(dir.path());
        (dir, workspace)
    }

    #[test]
    fn builds_dependencies_before_dependents() {
        let (_dir, workspace) = workspace_with(
            &[
                (
                    "users",
                    "name: users\ndependencies:\n  - service: auth\n  - image: db\n",
                ),
                ("auth", "name: auth\ndependencies:\n  - image: db\n"),
            ],
            &["db"],
        );
        let graph = resolver::resolve_service(&workspace, "users").expect("should resolve");

        let backend = RecordingBackend::default();
        let built = Arc::clone(&backend.built);
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        orchestrator.build(&graph).expect("should build");

        let built = built.lock().expect("lock");
        assert_eq!(*built, vec!["db", "baton-s-auth", "baton-s-users"]);
    }

    #[test]
    fn shared_dependency_builds_exactly_once() {
        let (_dir, workspace) = workspace_with(
            &[
                ("app", "name: app\ndependencies:\n  - service: a\n  - service: b\n"),
                ("a", "name: a\ndependencies:\n  - image: db\n"),
                ("b", "name: b\ndependencies:\n  - image: db\n"),
            ],
            &["db"],
        );
        let graph = resolver::resolve_service(&workspace, "app").expect("should resolve");

        let backend = RecordingBackend::default();
        let built = Arc::clone(&backend.built);
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        orchestrator.build(&graph).expect("should build");

        let built = built.lock().expect("lock");
        assert_eq!(
            built.iter().filter(|tag| tag.as_str() == "db").count(),
            1,
            "got: {built:?}"
        );
        assert_eq!(built.len(), 4);
    }

    #[test]
    fn failure_short_circuits_dependents() {
        let (_dir, workspace) = workspace_with(
            &[("users", "name: users\ndependencies:\n  - image: db\n")],
            &["db"],
        );
        let graph = resolver::resolve_service(&workspace, "users").expect("should resolve");

        let backend = RecordingBackend {
            fail_on: Some("db"),
            ..RecordingBackend::default()
        };
        let built = Arc::clone(&backend.built);
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        let result = orchestrator.build(&graph);

        assert!(matches!(
            result,
            Err(BatonError::BuildFailed { tag, status: 1 }) if tag == "db"
        ));
        let built = built.lock().expect("lock");
        assert_eq!(*built, vec!["db"], "dependent must not be attempted");
    }

    #[test]
    fn image_without_context_is_skipped() {
        let (_dir, workspace) = workspace_with(
            &[("users", "name: users\ndependencies:\n  - image: postgres\n")],
            &[],
        );
        let graph = resolver::resolve_service(&workspace, "users").expect("should resolve");

        let backend = RecordingBackend::default();
        let built = Arc::clone(&backend.built);
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        orchestrator.build(&graph).expect("should build");

        let built = built.lock().expect("lock");
        assert_eq!(*built, vec!["baton-s-users"], "external image is not built");
    }

    #[test]
    fn contexts_are_staged_before_build() {
        let (_dir, workspace) = workspace_with(&[("users", "name: users\n")], &[]);
        let graph = resolver::resolve_service(&workspace, "users").expect("should resolve");

        let backend = RecordingBackend::default();
        let staged = Arc::clone(&backend.staged);
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        orchestrator.build(&graph).expect("should build");

        let staged = staged.lock().expect("lock");
        assert_eq!(*staged, vec![true], "Dockerfile must be staged");
    }

    #[test]
    fn work_dir_is_removed_after_success() {
        let (_dir, workspace) = workspace_with(&[("users", "name: users\n")], &[]);
        let graph = resolver::resolve_service(&workspace, "users").expect("should resolve");
        let work_dir = workspace.work_dir("service", "build", "users");

        let orchestrator =
            Orchestrator::with_backend(&workspace, Box::new(RecordingBackend::default()), false);
        orchestrator.build(&graph).expect("should build");

        assert!(!work_dir.exists());
    }

    #[test]
    fn work_dir_is_kept_after_failure() {
        let (_dir, workspace) = workspace_with(&[("users", "name: users\n")], &[]);
        let graph = resolver::resolve_service(&workspace, "users").expect("should resolve");
        let work_dir = workspace.work_dir("service", "build", "users");

        let backend = RecordingBackend {
            fail_on: Some("baton-s-users"),
            ..RecordingBackend::default()
        };
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        let result = orchestrator.build(&graph);

        assert!(result.is_err());
        assert!(work_dir.exists(), "failed staging left for inspection");
    }

    #[test]
    fn stale_work_dir_is_cleared_before_building() {
        let (_dir, workspace) = workspace_with(&[("users", "name: users\n")], &[]);
        let graph = resolver::resolve_service(&workspace, "users").expect("should resolve");
        let work_dir = workspace.work_dir("service", "build", "users");
        std::fs::create_dir_all(&work_dir).expect("create stale dir");
        std::fs::write(work_dir.join("stale.txt"), "old").expect("write stale file");

        let backend = RecordingBackend {
            fail_on: Some("baton-s-users"),
            ..RecordingBackend::default()
        };
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        let _ = orchestrator.build(&graph);

        assert!(!work_dir.join("stale.txt").exists());
    }

    #[test]
    fn standalone_image_graph_builds_one_image() {
        let (_dir, workspace) = workspace_with(&[], &["db"]);
        let graph = resolver::resolve_image("db");

        let backend = RecordingBackend::default();
        let built = Arc::clone(&backend.built);
        let orchestrator = Orchestrator::with_backend(&workspace, Box::new(backend), false);
        orchestrator.build(&graph).expect("should build");

        let built = built.lock().expect("lock");
        assert_eq!(*built, vec!["db"]);
    }
}
