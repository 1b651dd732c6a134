//! Blueprint pieces: capture clusters of placed pieces as reusable text
//! templates, register them as single buildable pieces, preview them as a
//! translucent ghost and commit them back into the world.
//!
//! Everything is scoped to one Bevy `App`; two apps are two independent world
//! sessions (a host and a follower in tests).

pub mod aggregate;
pub mod build;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod distribution;
pub mod format;
pub mod ghost;
pub mod materialize;
pub mod plugin;
pub mod registry;
pub mod selection;
pub mod session;
pub mod settings;
pub mod types;

#[cfg(any(test, feature = "harness"))]
pub mod test_harness;

#[cfg(test)]
mod integration_tests;

pub use plugin::{BlueprintSet, BlueprintsPlugin};
pub use types::{Blueprint, PlanPiece, Requirement, SnapPoint, TerrainOp, TerrainShape};
