//! The unit model: nodes of the dependency graph.
//!
//! A unit is either a standalone image or a service. Identity is by
//! (kind, name); a resolved graph holds at most one node per identity,
//! which is what lets diamond-shaped dependencies collapse to a single
//! node instead of duplicating work.

use std::fmt;

use baton_common::constants;

use crate::config::ServiceConfig;

/// The two kinds of buildable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// A standalone container image with an on-disk build context.
    Image,
    /// A service with a source tree and declared dependencies.
    Service,
}

impl UnitKind {
    /// Returns the kind's lowercase name as used in paths and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a unit within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitKey {
    /// Kind of the unit.
    pub kind: UnitKind,
    /// Name of the unit, unique within its kind.
    pub name: String,
}

impl UnitKey {
    /// Creates the key of an image unit.
    #[must_use]
    pub fn image(name: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Image,
            name: name.into(),
        }
    }

    /// Creates the key of a service unit.
    #[must_use]
    pub fn service(name: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Service,
            name: name.into(),
        }
    }
}

/// A node of the dependency graph.
#[derive(Debug, Clone)]
pub enum Unit {
    /// A standalone image unit.
    Image(ImageUnit),
    /// A service unit.
    Service(ServiceUnit),
}

/// A standalone image: a leaf with an external build context.
#[derive(Debug, Clone)]
pub struct ImageUnit {
    /// Image name, which is also its build tag.
    pub name: String,
    /// Whether the image appears in the projected topology.
    ///
    /// False only while the image exists to satisfy an implicit build
    /// requirement (the base image injected from a service's type).
    pub visible: bool,
}

/// A service: carries its validated description.
#[derive(Debug, Clone)]
pub struct ServiceUnit {
    /// Service name.
    pub name: String,
    /// Validated description loaded from `service.yml`.
    pub config: ServiceConfig,
}

impl Unit {
    /// Returns the unit's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Image(image) => &image.name,
            Self::Service(service) => &service.name,
        }
    }

    /// Returns the unit's kind.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        match self {
            Self::Image(_) => UnitKind::Image,
            Self::Service(_) => UnitKind::Service,
        }
    }

    /// Returns the unit's identity key.
    #[must_use]
    pub fn key(&self) -> UnitKey {
        UnitKey {
            kind: self.kind(),
            name: self.name().to_owned(),
        }
    }

    /// Returns whether the unit appears in the projected topology.
    ///
    /// Services are always visible; images are hidden while they exist
    /// only as a service's implicit base image.
    #[must_use]
    pub const fn visible(&self) -> bool {
        match self {
            Self::Image(image) => image.visible,
            Self::Service(_) => true,
        }
    }

    /// Returns the tag under which the unit's image is built.
    ///
    /// An image is tagged with its own name; a service's image is
    /// namespaced under the application prefix.
    #[must_use]
    pub fn image_tag(&self) -> String {
        match self {
            Self::Image(image) => image.name.clone(),
            Self::Service(service) => constants::service_image(&service.name),
        }
    }

    /// Returns the service unit, if this is one.
    #[must_use]
    pub const fn as_service(&self) -> Option<&ServiceUnit> {
        match self {
            Self::Service(service) => Some(service),
            Self::Image(_) => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind(), self.name())
    }
}
