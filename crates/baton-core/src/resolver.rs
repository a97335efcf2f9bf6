//! Recursive resolution of a unit and everything it depends on.
//!
//! Resolution walks `service.yml` files starting from the requested
//! unit, deduplicating shared dependencies through the graph's key
//! index. A stack of the services currently being expanded detects
//! cycles: meeting a service that is already on the stack means the
//! dependency chain loops back into itself.

use petgraph::graph::NodeIndex;

use baton_common::error::{BatonError, Result};
use baton_common::workspace::Workspace;

use crate::config::{Dependency, ServiceConfig};
use crate::graph::DependencyGraph;
use crate::unit::{ImageUnit, ServiceUnit, Unit, UnitKey};

/// Resolves the full dependency graph of service `name`.
///
/// Each reachable service's description is loaded exactly once, even
/// when several paths lead to it. Image dependencies become leaf nodes
/// without touching the filesystem; whether their build context exists
/// is checked at build time.
///
/// # Errors
///
/// Returns [`BatonError::Cycle`] when the dependency chain loops back
/// into a service already being expanded, [`BatonError::UnknownService`]
/// when a referenced service has no description file, and any error
/// raised while loading a description.
pub fn resolve_service(workspace: &Workspace, name: &str) -> Result<DependencyGraph> {
    tracing::debug!(service = name, "resolving dependency graph");

    let config = ServiceConfig::load(&workspace.service_config(name), name)?;
    let mut resolver = Resolver {
        workspace,
        graph: DependencyGraph::with_root(Unit::Service(ServiceUnit {
            name: name.to_owned(),
            config,
        })),
        resolving: vec![name.to_owned()],
    };
    let root = resolver.graph.root_index();
    resolver.expand_service(root)?;

    tracing::debug!(
        service = name,
        units = resolver.graph.unit_count(),
        "dependency graph resolved"
    );
    Ok(resolver.graph)
}

/// Resolves a standalone image: a graph holding a single visible node.
#[must_use]
pub fn resolve_image(name: &str) -> DependencyGraph {
    DependencyGraph::with_root(Unit::Image(ImageUnit {
        name: name.to_owned(),
        visible: true,
    }))
}

/// State threaded through one resolution pass.
struct Resolver<'a> {
    workspace: &'a Workspace,
    graph: DependencyGraph,
    /// Names of the services whose dependencies are being expanded,
    /// outermost first.
    resolving: Vec<String>,
}

impl Resolver<'_> {
    /// Returns the node for service `name`, loading and expanding it
    /// on first sight.
    fn service_node(&mut self, name: &str) -> Result<NodeIndex> {
        if self.resolving.iter().any(|entry| entry == name) {
            return Err(BatonError::Cycle {
                service: name.to_owned(),
            });
        }
        if let Some(idx) = self.graph.node(&UnitKey::service(name)) {
            return Ok(idx);
        }

        let config = ServiceConfig::load(&self.workspace.service_config(name), name)?;
        let idx = self.graph.insert_unit(Unit::Service(ServiceUnit {
            name: name.to_owned(),
            config,
        }));

        self.resolving.push(name.to_owned());
        self.expand_service(idx)?;
        let _ = self.resolving.pop();
        Ok(idx)
    }

    /// Returns the node for image `name`, inserting it on first sight.
    fn image_node(&mut self, name: &str, visible: bool) -> NodeIndex {
        self.graph.insert_unit(Unit::Image(ImageUnit {
            name: name.to_owned(),
            visible,
        }))
    }

    /// Adds one edge per declared dependency of the service at `idx`,
    /// resolving each target first.
    fn expand_service(&mut self, idx: NodeIndex) -> Result<()> {
        let dependencies = match self.graph.unit(idx) {
            Unit::Service(service) => service.config.dependencies.clone(),
            Unit::Image(_) => return Ok(()),
        };

        for dependency in &dependencies {
            let child = match dependency {
                Dependency::Image(target) => self.image_node(target, true),
                Dependency::BaseImage(target) => self.image_node(target, false),
                Dependency::Service(target) => self.service_node(target)?,
            };
            self.graph.insert_dependency(idx, child);
        }
        Ok(())
    }
}
