//! # TestWorld — headless test harness for the blueprint pipeline
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `BlueprintsPlugin` in a fluent
//! builder. Time does not advance on its own: throttled builds are driven with
//! `advance_builds(dt)` so tests are deterministic.

mod queries;
mod setup;

use std::time::Duration;

use bevy::app::App;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::build::{BlueprintCommitted, BuildFinished, PiecePlaced, TerrainEdit};
use crate::distribution::HostRole;
use crate::ghost::PlacementCursor;
use crate::types::Requirement;
use crate::BlueprintsPlugin;

/// One observed output of a commit, in observation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Committed { blueprint: String, cost: Vec<Requirement> },
    Terrain(Vec3),
    Piece { prefab: String, position: Vec3, effect: Option<String> },
    Finished { blueprint: String, placed: usize },
}

/// Every commit output seen so far.
#[derive(Resource, Debug, Default)]
pub struct ObservedLog(pub Vec<Observed>);

fn record_outputs(
    mut committed: EventReader<BlueprintCommitted>,
    mut terrain: EventReader<TerrainEdit>,
    mut pieces: EventReader<PiecePlaced>,
    mut finished: EventReader<BuildFinished>,
    transforms: Query<&Transform>,
    mut log: ResMut<ObservedLog>,
) {
    for commit in committed.read() {
        log.0.push(Observed::Committed {
            blueprint: commit.blueprint.clone(),
            cost: commit.cost.clone(),
        });
    }
    for edit in terrain.read() {
        log.0.push(Observed::Terrain(edit.op.position));
    }
    for placed in pieces.read() {
        let position = transforms
            .get(placed.entity)
            .map(|t| t.translation)
            .unwrap_or_default();
        log.0.push(Observed::Piece {
            prefab: placed.prefab.clone(),
            position,
            effect: placed.effect.clone(),
        });
    }
    for done in finished.read() {
        log.0.push(Observed::Finished {
            blueprint: done.blueprint.clone(),
            placed: done.placed,
        });
    }
}

/// A headless Bevy App wrapping `BlueprintsPlugin`.
pub struct TestWorld {
    app: App,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Authoritative host with an empty catalog and a cursor at the origin.
    pub fn new() -> Self {
        Self::with_role(HostRole::Authoritative)
    }

    /// Follower: synced settings are locked, blueprints arrive from a host.
    pub fn follower() -> Self {
        Self::with_role(HostRole::Follower)
    }

    fn with_role(role: HostRole) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_plugins(BlueprintsPlugin);
        app.insert_resource(role);
        app.init_resource::<ObservedLog>();
        app.add_systems(Last, record_outputs);

        app.world_mut()
            .spawn((PlacementCursor, Transform::default(), Name::new("cursor")));
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Raw access
    // -----------------------------------------------------------------------

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Run `n` frames.
    pub fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.app.update();
        }
    }
}
