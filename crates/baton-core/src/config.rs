//! Service description files (`service.yml`).
//!
//! Loading applies defaults, validates field shapes, then appends the
//! hidden base-image dependency derived from the service's `type`. The
//! resolver trusts the resulting descriptor list exactly as returned.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use baton_common::constants;
use baton_common::error::{BatonError, Result};

/// One dependency declared by (or injected into) a service.
///
/// The `image` and `service` kinds are written in `service.yml` as
/// single-key mappings. The base-image kind is appended automatically
/// from the service's `type` and cannot be written by users.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    /// A standalone image the service needs at runtime.
    Image(String),
    /// Another service the service needs at runtime.
    Service(String),
    /// The service's base runtime image, injected from its type.
    #[serde(skip)]
    BaseImage(String),
}

impl Dependency {
    /// Returns the name of the referenced unit.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::Image(name) | Self::Service(name) | Self::BaseImage(name) => name,
        }
    }
}

/// Validated description of a service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name; must match the directory the file lives in.
    pub name: String,
    /// Runtime type. When present, the matching base image is appended
    /// as a hidden dependency after validation.
    #[serde(rename = "type")]
    pub service_type: Option<String>,
    /// Declared dependencies, in declaration order.
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub dependencies: Vec<Dependency>,
    /// Run profiles: topology override fragments keyed by profile name.
    #[serde(default)]
    pub run: BTreeMap<String, serde_yaml::Mapping>,
}

impl ServiceConfig {
    /// Creates a minimal description with defaults applied.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service_type: None,
            dependencies: Vec::new(),
            run: BTreeMap::new(),
        }
    }

    /// Loads and validates the description of service `name` from `path`.
    ///
    /// # Errors
    ///
    /// A missing file maps to [`BatonError::UnknownService`]; unreadable
    /// files map to [`BatonError::Io`]; YAML and validation failures map
    /// to [`BatonError::Config`] naming the offending file and field.
    pub fn load(path: &Path, name: &str) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BatonError::UnknownService {
                    name: name.to_owned(),
                });
            }
            Err(e) => {
                return Err(BatonError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let mut config: Self =
            serde_yaml::from_str(&text).map_err(|e| config_err(path, e.to_string()))?;
        config.validate(path, name)?;
        config.inject_base_image();

        tracing::debug!(
            service = name,
            dependencies = config.dependencies.len(),
            "service description loaded"
        );
        Ok(config)
    }

    /// Returns the override fragment of a run profile, if declared.
    #[must_use]
    pub fn run_profile(&self, profile: &str) -> Option<&serde_yaml::Mapping> {
        self.run.get(profile)
    }

    fn validate(&self, path: &Path, dir_name: &str) -> Result<()> {
        if self.name != dir_name {
            return Err(config_err(
                path,
                format!(
                    "names do not match: expected '{dir_name}', got '{}'",
                    self.name
                ),
            ));
        }

        if let Some(service_type) = &self.service_type {
            if service_type.is_empty() {
                return Err(config_err(
                    path,
                    "field 'type' must be a non-empty string".to_owned(),
                ));
            }
        }

        for dep in &self.dependencies {
            if dep.target().is_empty() {
                return Err(config_err(
                    path,
                    "dependency entries must name a non-empty target".to_owned(),
                ));
            }
        }

        Ok(())
    }

    fn inject_base_image(&mut self) {
        if let Some(service_type) = &self.service_type {
            self.dependencies
                .push(Dependency::BaseImage(constants::base_image(service_type)));
        }
    }
}

fn config_err(path: &Path, message: String) -> BatonError {
    BatonError::Config {
        path: path.to_path_buf(),
        message,
    }
}
