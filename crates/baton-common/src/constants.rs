//! System-wide constants and derived image naming.

/// Binary name for the CLI.
pub const BIN_NAME: &str = "baton";

/// Directory under the project root holding standalone image build contexts.
pub const IMAGES_DIR: &str = "images";

/// Directory under the project root holding service source trees.
pub const SERVICES_DIR: &str = "services";

/// Scratch directory under the project root used to stage builds.
pub const BUILD_DIR: &str = "build";

/// File name of a service's description inside its directory.
pub const SERVICE_CONFIG_FILE: &str = "service.yml";

/// File name of the exported topology description.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Tag prefix for images built from service source trees.
pub const SERVICE_IMAGE_PREFIX: &str = "baton-s-";

/// Tag prefix for the base runtime image backing a typed service.
pub const BASE_IMAGE_PREFIX: &str = "baton-base-";

/// Returns the image tag under which a service's image is built.
#[must_use]
pub fn service_image(service: &str) -> String {
    format!("{SERVICE_IMAGE_PREFIX}{service}")
}

/// Returns the base runtime image tag for a service type.
#[must_use]
pub fn base_image(service_type: &str) -> String {
    format!("{BASE_IMAGE_PREFIX}{service_type}")
}
