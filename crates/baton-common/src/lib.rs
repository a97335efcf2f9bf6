//! # baton-common
//!
//! Shared error definitions, constants, and workspace/filesystem helpers
//! used across the entire baton workspace.
//!
//! This crate is the leaf of the dependency graph; it depends on no other
//! internal crate and provides the foundational primitives that all other
//! crates build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod constants;
pub mod error;
pub mod fsutil;
pub mod workspace;
