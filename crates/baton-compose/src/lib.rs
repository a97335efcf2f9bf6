//! # baton-compose
//!
//! Projects a resolved dependency graph onto a `docker-compose`
//! topology and runs it.
//!
//! Visible units become compose entries wired together through links;
//! hidden base images are built but never appear in the topology. Run
//! profiles from `service.yml` extend the projected mapping, either in
//! place or as a linked clone of an existing entry.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod runner;
pub mod topology;
