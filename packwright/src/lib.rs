//! packwright library.
//!
//! This crate provides the build pipeline behind the `packwright` CLI: it
//! derives a build version, merges compiled source sets into archives, runs
//! an external remapper, copies the final archive to fixed locations and
//! publishes it to mod-hosting platforms. It can be consumed programmatically
//! for testing or custom build drivers.
//!
//! # Modules
//!
//! - [`artefact`] - Archive naming, layout, assembly and remapping
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `packwright.toml` loading and validation
//! - [`error`] - Crate-level error type
//! - [`exec`] - External command execution with timeouts
//! - [`graph`] - Task graph ordering and execution
//! - [`logging`] - Stderr backend for the `log` facade
//! - [`organizer`] - Copies of the final archive
//! - [`output`] - Plan and run report formatting
//! - [`pipeline`] - Goals, tasks and the build context
//! - [`publish`] - CurseForge and Modrinth submission
//! - [`version`] - Build version derivation from git state

pub mod artefact;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod graph;
pub mod logging;
pub mod organizer;
pub mod output;
pub mod pipeline;
pub mod publish;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
