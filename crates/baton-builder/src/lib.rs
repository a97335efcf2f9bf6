//! # baton-builder
//!
//! Dependency-first image building.
//!
//! Walks a resolved dependency graph in postorder and builds every
//! unit's image, dependencies before dependents, staging each build
//! context into a throwaway working directory under `build/`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod orchestrator;
