//! # baton-core
//!
//! The dependency-resolution core of baton.
//!
//! Handles:
//! - **Units**: the image/service node model, identified by (kind, name).
//! - **Config**: `service.yml` loading, validation, and implicit
//!   base-image injection.
//! - **Graph**: the frozen, deduplicated dependency DAG.
//! - **Resolver**: recursive resolution with cycle detection.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod graph;
pub mod resolver;
pub mod unit;
