//! Projection of a dependency graph onto a runnable topology.
//!
//! The topology is the on-disk `docker-compose.yml` shape: a mapping
//! of entry name to service configuration. Entries stay plain YAML
//! mappings so run-profile fragments can merge arbitrary orchestration
//! keys without the projector having to know them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use baton_common::constants;
use baton_common::error::{BatonError, Result};
use baton_core::graph::DependencyGraph;

/// A runnable topology, one entry per visible unit.
///
/// Serialization is alphabetical by entry name, so the exported file
/// is stable across runs of the same graph.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    entries: BTreeMap<String, Mapping>,
}

impl Topology {
    /// Projects the visible part of `graph` onto a topology.
    ///
    /// Every visible unit gets an entry backed by its image tag.
    /// A service entry additionally links to its visible direct
    /// dependencies, in declaration order; hidden dependencies are
    /// baked into the service's image rather than wired as peers, so
    /// they are left out.
    #[must_use]
    pub fn project(graph: &DependencyGraph) -> Self {
        let mut entries = BTreeMap::new();
        for idx in graph.postorder() {
            let unit = graph.unit(idx);
            if !unit.visible() {
                continue;
            }

            let mut entry = Mapping::new();
            let _ = entry.insert("image".into(), unit.image_tag().into());

            if unit.as_service().is_some() {
                let links: Vec<Value> = graph
                    .dependencies(idx)
                    .into_iter()
                    .filter(|&dep| graph.unit(dep).visible())
                    .map(|dep| graph.unit(dep).name().into())
                    .collect();
                if !links.is_empty() {
                    let _ = entry.insert("links".into(), Value::Sequence(links));
                }
            }

            let _ = entries.insert(unit.name().to_owned(), entry);
        }

        tracing::debug!(entries = entries.len(), "topology projected");
        Self { entries }
    }

    /// Merges a run-profile fragment into the topology.
    ///
    /// Without `clone_of`, the fragment's top-level keys replace those
    /// of the entry named `name`. With `clone_of`, the entry for
    /// `clone_of` is deep-copied under `name` first, given a single
    /// link back to `clone_of`, and then overridden by the fragment;
    /// the original entry is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BatonError::UnknownEntry`] when the entry to merge
    /// into (or clone from) does not exist.
    pub fn extend(&mut self, name: &str, fragment: &Mapping, clone_of: Option<&str>) -> Result<()> {
        let mut entry = match clone_of {
            Some(original) => {
                let mut copy = self.lookup(original)?.clone();
                let _ = copy.insert("links".into(), Value::Sequence(vec![original.into()]));
                copy
            }
            None => self.lookup(name)?.clone(),
        };

        for (key, value) in fragment {
            let _ = entry.insert(key.clone(), value.clone());
        }
        let _ = self.entries.insert(name.to_owned(), entry);
        Ok(())
    }

    /// Writes the topology as `docker-compose.yml` under `dir`,
    /// returning the file's path.
    ///
    /// The file is regenerated in full on every export; it is never
    /// treated as a cache.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(constants::COMPOSE_FILE);
        std::fs::write(&path, self.to_yaml()?).map_err(|e| BatonError::Io {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "topology exported");
        Ok(path)
    }

    /// Renders the topology as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.entries)?)
    }

    /// Returns the entry named `name`, if present.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&Mapping> {
        self.entries.get(name)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the topology has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&Mapping> {
        self.entries.get(name).ok_or_else(|| BatonError::UnknownEntry {
            name: name.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use baton_common::workspace::Workspace;
    use baton_core::resolver;

    use super::*;

    fn workspace_with(services: &[(&str, &str)]) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, yaml) in services {
            let service_dir = dir.path().join("services").join(name);
            std::fs::create_dir_all(&service_dir).expect("create service dir");
            std::fs::write(service_dir.join("service.yml"), yaml).expect("write service.yml");
        }
        let workspace = Workspace::at_root(dir.path());
        (dir, workspace)
    }

    fn project_service(services: &[(&str, &str)], name: &str) -> Topology {
        let (_dir, workspace) = workspace_with(services);
        let graph = resolver::resolve_service(&workspace, name).expect("should resolve");
        Topology::project(&graph)
    }

    fn get<'a>(entry: &'a Mapping, key: &str) -> Option<&'a Value> {
        entry.get(key)
    }

    fn link_names(entry: &Mapping) -> Vec<String> {
        match get(entry, "links") {
            Some(Value::Sequence(links)) => links
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn image_entry_references_its_own_tag() {
        let graph = resolver::resolve_image("db");
        let topology = Topology::project(&graph);

        let entry = topology.entry("db").expect("db entry");
        assert_eq!(get(entry, "image"), Some(&Value::String("db".into())));
        assert!(get(entry, "links").is_none());
    }

    #[test]
    fn service_entry_uses_namespaced_image() {
        let topology = project_service(&[("users", "name: users\n")], "users");

        let entry = topology.entry("users").expect("users entry");
        assert_eq!(
            get(entry, "image"),
            Some(&Value::String("baton-s-users".into()))
        );
    }

    #[test]
    fn hidden_units_produce_no_entry() {
        let topology = project_service(&[("worker", "name: worker\ntype: python\n")], "worker");

        assert_eq!(topology.len(), 1);
        assert!(topology.entry("baton-base-python").is_none());
        let entry = topology.entry("worker").expect("worker entry");
        assert!(get(entry, "links").is_none(), "hidden dep must not be linked");
    }

    #[test]
    fn links_name_only_visible_dependencies() {
        let topology = project_service(
            &[
                (
                    "users",
                    "name: users\ntype: python\ndependencies:\n  - service: auth\n  - image: db\n",
                ),
                ("auth", "name: auth\n"),
            ],
            "users",
        );

        let entry = topology.entry("users").expect("users entry");
        assert_eq!(link_names(entry), vec!["auth", "db"]);
        assert_eq!(topology.len(), 3);
    }

    #[test]
    fn extend_merges_fragment_in_place() {
        let mut topology = project_service(&[("worker", "name: worker\n")], "worker");

        let mut fragment = Mapping::new();
        let _ = fragment.insert("command".into(), "task.sh".into());
        topology
            .extend("worker", &fragment, None)
            .expect("should extend");

        let entry = topology.entry("worker").expect("worker entry");
        assert_eq!(get(entry, "command"), Some(&Value::String("task.sh".into())));
        assert_eq!(
            get(entry, "image"),
            Some(&Value::String("baton-s-worker".into()))
        );
        assert_eq!(topology.len(), 1);
    }

    #[test]
    fn extend_clone_creates_linked_variant() {
        let mut topology = project_service(&[("worker", "name: worker\n")], "worker");

        let mut fragment = Mapping::new();
        let _ = fragment.insert("command".into(), "task.sh".into());
        topology
            .extend("worker-oneoff", &fragment, Some("worker"))
            .expect("should extend");

        let clone = topology.entry("worker-oneoff").expect("cloned entry");
        assert_eq!(
            get(clone, "image"),
            Some(&Value::String("baton-s-worker".into()))
        );
        assert_eq!(link_names(clone), vec!["worker"]);
        assert_eq!(get(clone, "command"), Some(&Value::String("task.sh".into())));

        let original = topology.entry("worker").expect("original entry");
        assert!(get(original, "command").is_none(), "original must not change");
        assert!(get(original, "links").is_none());
    }

    #[test]
    fn extend_clone_replaces_inherited_links() {
        let mut topology = project_service(
            &[
                ("users", "name: users\ndependencies:\n  - service: auth\n"),
                ("auth", "name: auth\n"),
            ],
            "users",
        );

        topology
            .extend("oneoff", &Mapping::new(), Some("users"))
            .expect("should extend");

        let clone = topology.entry("oneoff").expect("cloned entry");
        assert_eq!(link_names(clone), vec!["users"]);
    }

    #[test]
    fn extend_unknown_entry_fails() {
        let mut topology = Topology::default();
        let result = topology.extend("ghost", &Mapping::new(), None);
        assert!(matches!(
            result,
            Err(BatonError::UnknownEntry { name }) if name == "ghost"
        ));
    }

    #[test]
    fn export_writes_alphabetical_topology() {
        let dir = tempfile::tempdir().expect("tempdir");
        let topology = project_service(
            &[
                ("users", "name: users\ndependencies:\n  - service: auth\n"),
                ("auth", "name: auth\n"),
            ],
            "users",
        );

        let path = topology.export(dir.path()).expect("should export");
        assert_eq!(path, dir.path().join("docker-compose.yml"));

        let text = std::fs::read_to_string(&path).expect("read exported file");
        let auth_pos = text.find("auth:").expect("auth entry in file");
        let users_pos = text.find("users:").expect("users entry in file");
        assert!(auth_pos < users_pos, "entries must be sorted: {text}");
        assert!(text.contains("image: baton-s-users"), "got: {text}");
    }
}
